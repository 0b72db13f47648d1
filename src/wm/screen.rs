//! Screen Module
//!
//! Physical outputs and the scale factor applied across them. Pure data:
//! topology discovery happens elsewhere and hands the results in here.

use tracing::{debug, warn};

use crate::shared::Geometry;

/// A physical output.
#[derive(Debug, Clone, PartialEq)]
pub struct Screen {
    /// Output name as reported by RandR
    pub name: String,
    /// Position in the model's screen list
    pub index: usize,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub scaled_x: i32,
    pub scaled_y: i32,
    pub scaled_width: u32,
    pub scaled_height: u32,
}

impl Screen {
    pub fn new(name: &str, index: usize, geometry: Geometry, scale: f32) -> Self {
        let Geometry { x, y, width, height } = geometry;
        let mut screen = Self {
            name: name.to_string(),
            index,
            x,
            y,
            width,
            height,
            scaled_x: x,
            scaled_y: y,
            scaled_width: width,
            scaled_height: height,
        };
        screen.rescale(scale);
        screen
    }

    pub fn geometry(&self) -> Geometry {
        Geometry::new(self.x, self.y, self.width, self.height)
    }

    fn rescale(&mut self, scale: f32) {
        let scale = f64::from(scale);
        self.scaled_x = (f64::from(self.x) / scale).round() as i32;
        self.scaled_y = (f64::from(self.y) / scale).round() as i32;
        self.scaled_width = (f64::from(self.width) / scale).round() as u32;
        self.scaled_height = (f64::from(self.height) / scale).round() as u32;
    }
}

/// All outputs, plus which one is active and which is primary.
#[derive(Debug, Clone)]
pub struct ScreenModel {
    screens: Vec<Screen>,
    active: usize,
    primary: usize,
    scale: f32,
}

impl Default for ScreenModel {
    fn default() -> Self {
        Self {
            screens: Vec::new(),
            active: 0,
            primary: 0,
            scale: 1.0,
        }
    }
}

fn valid_scale(scale: f32) -> bool {
    scale.is_finite() && scale > 0.0
}

impl ScreenModel {
    /// Build from `(name, geometry)` pairs in output order. The first output
    /// starts as both primary and active.
    pub fn new<S: AsRef<str>>(outputs: &[(S, Geometry)], scale: f32) -> Self {
        let scale = if valid_scale(scale) {
            scale
        } else {
            warn!("Ignoring invalid screen scale {}, using 1.0", scale);
            1.0
        };

        let screens = outputs
            .iter()
            .enumerate()
            .map(|(index, (name, geometry))| Screen::new(name.as_ref(), index, *geometry, scale))
            .collect::<Vec<_>>();
        debug!("Screen model with {} outputs at scale {}", screens.len(), scale);

        Self {
            screens,
            active: 0,
            primary: 0,
            scale,
        }
    }

    pub fn screens(&self) -> &[Screen] {
        &self.screens
    }

    pub fn active(&self) -> Option<&Screen> {
        self.screens.get(self.active)
    }

    pub fn primary(&self) -> Option<&Screen> {
        self.screens.get(self.primary)
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Returns false if `index` names no screen.
    pub fn set_active(&mut self, index: usize) -> bool {
        if index >= self.screens.len() {
            return false;
        }
        self.active = index;
        true
    }

    pub fn set_primary(&mut self, index: usize) -> bool {
        if index >= self.screens.len() {
            return false;
        }
        self.primary = index;
        true
    }

    /// Change the scale and recompute every scaled geometry.
    pub fn set_scale(&mut self, scale: f32) {
        if !valid_scale(scale) {
            warn!("Ignoring invalid screen scale {}", scale);
            return;
        }
        self.scale = scale;
        for screen in &mut self.screens {
            screen.rescale(scale);
        }
    }

    /// The output containing the point, in raw coordinates.
    pub fn screen_at(&self, x: i32, y: i32) -> Option<&Screen> {
        self.screens.iter().find(|s| s.geometry().contains(x, y))
    }

    /// The output sharing the most area with `window`. A window that touches
    /// no output belongs to the primary screen.
    pub fn screen_for_geometry(&self, window: &Geometry) -> Option<&Screen> {
        let mut best: Option<(&Screen, u64)> = None;
        for screen in &self.screens {
            let area = screen.geometry().overlap(window);
            if area > 0 && best.is_none_or(|(_, a)| area > a) {
                best = Some((screen, area));
            }
        }
        best.map(|(s, _)| s).or_else(|| self.primary())
    }
}
