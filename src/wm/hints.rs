//! Hints Module
//!
//! Decoding of the structured hint properties (WM_NORMAL_HINTS, WM_HINTS,
//! _MOTIF_WM_HINTS) and the pure size arithmetic built on them.

use bitflags::bitflags;
use tracing::debug;

use crate::wm::backend::{PropertyValue, WindowId};
use crate::wm::error::{Error, Result};

bitflags! {
    /// WM_SIZE_HINTS.flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SizeHintsFlags: u32 {
        const US_POSITION  = 1 << 0;
        const US_SIZE      = 1 << 1;
        const P_POSITION   = 1 << 2;
        const P_SIZE       = 1 << 3;
        const P_MIN_SIZE   = 1 << 4;
        const P_MAX_SIZE   = 1 << 5;
        const P_RESIZE_INC = 1 << 6;
        const P_ASPECT     = 1 << 7;
        const P_BASE_SIZE  = 1 << 8;
        const P_WIN_GRAVITY = 1 << 9;
    }
}

bitflags! {
    /// WM_HINTS.flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct WmHintsFlags: u32 {
        const INPUT         = 1 << 0;
        const STATE         = 1 << 1;
        const ICON_PIXMAP   = 1 << 2;
        const ICON_WINDOW   = 1 << 3;
        const ICON_POSITION = 1 << 4;
        const ICON_MASK     = 1 << 5;
        const WINDOW_GROUP  = 1 << 6;
        const URGENCY       = 1 << 8;
        /// Same bit as CWOverrideRedirect; some toolkits set it here.
        const OVERRIDE_REDIRECT = 1 << 9;
    }
}

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Size hints (XSizeHints equivalent), reduced to what the constraint
/// engine needs. Presence of each bound comes from the flag mask only.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SizeHints {
    pub flags: SizeHintsFlags,
    pub min_width: u32,
    pub min_height: u32,
    pub max_width: u32,
    pub max_height: u32,
    pub width_inc: u32,
    pub height_inc: u32,
    pub base_width: u32,
    pub base_height: u32,
}

/// Pre-ICCCM clients write 15 words (no base size, no gravity).
const SIZE_HINTS_MIN_WORDS: usize = 15;

impl SizeHints {
    pub fn from_property(value: &PropertyValue) -> Result<Self> {
        let words = value
            .words()
            .ok_or_else(|| Error::malformed("WM_NORMAL_HINTS", "not 32-bit data"))?;
        if words.len() < SIZE_HINTS_MIN_WORDS {
            return Err(Error::malformed(
                "WM_NORMAL_HINTS",
                format!("{} words, need {}", words.len(), SIZE_HINTS_MIN_WORDS),
            ));
        }

        // Fields are CARD32 on the wire but INT32 in Xlib; negative means unset.
        let field = |i: usize| words.get(i).map(|&v| (v as i32).max(0) as u32).unwrap_or(0);

        let mut hints = SizeHints {
            flags: SizeHintsFlags::from_bits_truncate(words[0]),
            min_width: field(5),
            min_height: field(6),
            max_width: field(7),
            max_height: field(8),
            width_inc: field(9),
            height_inc: field(10),
            base_width: field(15),
            base_height: field(16),
        };

        // Keep min <= max so clamping is well defined.
        if hints.flags.contains(SizeHintsFlags::P_MIN_SIZE | SizeHintsFlags::P_MAX_SIZE) {
            if hints.max_width < hints.min_width || hints.max_height < hints.min_height {
                debug!(
                    "Max size {}x{} below min size {}x{}, raising max",
                    hints.max_width, hints.max_height, hints.min_width, hints.min_height
                );
            }
            hints.max_width = hints.max_width.max(hints.min_width);
            hints.max_height = hints.max_height.max(hints.min_height);
        }

        Ok(hints)
    }

    pub fn to_property(&self) -> PropertyValue {
        let mut words = vec![0u32; 18];
        words[0] = self.flags.bits();
        words[5] = self.min_width;
        words[6] = self.min_height;
        words[7] = self.max_width;
        words[8] = self.max_height;
        words[9] = self.width_inc;
        words[10] = self.height_inc;
        words[15] = self.base_width;
        words[16] = self.base_height;
        PropertyValue::Cardinals(words)
    }

    /// Declared minimum, (0, 0) when PMinSize is unset.
    pub fn min(&self) -> Size {
        if self.flags.contains(SizeHintsFlags::P_MIN_SIZE) {
            Size::new(self.min_width, self.min_height)
        } else {
            Size::default()
        }
    }

    /// Declared maximum, `None` (unconstrained) when PMaxSize is unset.
    pub fn max(&self) -> Option<Size> {
        self.flags
            .contains(SizeHintsFlags::P_MAX_SIZE)
            .then(|| Size::new(self.max_width, self.max_height))
    }

    /// Grid origin: the declared base size when non-zero, otherwise the minimum.
    pub fn base(&self) -> Size {
        let min = self.min();
        let declared = self.flags.contains(SizeHintsFlags::P_BASE_SIZE);
        Size {
            width: if declared && self.base_width > 0 { self.base_width } else { min.width },
            height: if declared && self.base_height > 0 { self.base_height } else { min.height },
        }
    }

    /// Increment grid, `None` when PResizeInc is unset.
    pub fn increment(&self) -> Option<Size> {
        self.flags
            .contains(SizeHintsFlags::P_RESIZE_INC)
            .then(|| Size::new(self.width_inc, self.height_inc))
    }

    pub fn is_fixed(&self) -> bool {
        self.max() == Some(self.min())
    }

    /// Clamp into [min, max]; an unconstrained max clamps nothing.
    pub fn constrain(&self, size: Size) -> Size {
        let min = self.min();
        let mut out = Size::new(size.width.max(min.width), size.height.max(min.height));
        if let Some(max) = self.max() {
            out.width = out.width.min(max.width);
            out.height = out.height.min(max.height);
        }
        out
    }

    /// Snap to `base + n * increment`, rounding half away from zero.
    pub fn snap(&self, size: Size) -> Size {
        let Some(inc) = self.increment() else {
            return size;
        };
        let base = self.base();
        Size {
            width: snap_axis(size.width, base.width, inc.width),
            height: snap_axis(size.height, base.height, inc.height),
        }
    }

    /// Constrain, snap, then walk back onto the grid inside [min, max].
    /// When no grid point fits in the bounds the clamped size wins.
    pub fn fit(&self, size: Size) -> Size {
        let snapped = self.snap(self.constrain(size));
        let inc = self.increment().unwrap_or_default();
        let min = self.min();
        let max = self.max();

        Size {
            width: fit_axis(snapped.width, inc.width, min.width, max.map(|m| m.width)),
            height: fit_axis(snapped.height, inc.height, min.height, max.map(|m| m.height)),
        }
    }
}

fn snap_axis(value: u32, base: u32, inc: u32) -> u32 {
    if inc == 0 {
        return value;
    }
    let diff = i64::from(value) - i64::from(base);
    let inc = i64::from(inc);
    let steps = (diff.abs() + inc / 2) / inc * diff.signum();
    // Out-of-range results move one step back inside, staying on the grid.
    let mut snapped = i64::from(base) + steps * inc;
    if snapped < 0 {
        snapped += inc;
    } else if snapped > i64::from(u32::MAX) {
        snapped -= inc;
    }
    snapped as u32
}

fn fit_axis(value: u32, inc: u32, min: u32, max: Option<u32>) -> u32 {
    let max = max.unwrap_or(u32::MAX);
    let mut v = value;
    if inc > 0 {
        if v > max && v.checked_sub(inc).is_some_and(|down| down >= min) {
            v -= inc;
        } else if v < min && v.saturating_add(inc) <= max {
            v += inc;
        }
    }
    v.clamp(min, max)
}

/// WM hints (XWMHints equivalent)
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WmHints {
    pub flags: WmHintsFlags,
    pub input: bool,
    pub initial_state: u32,
    pub icon_pixmap: Option<u32>,
    pub icon_window: Option<WindowId>,
    pub icon_mask: Option<u32>,
    pub window_group: Option<WindowId>,
}

impl WmHints {
    pub fn from_property(value: &PropertyValue) -> Result<Self> {
        let words = value
            .words()
            .ok_or_else(|| Error::malformed("WM_HINTS", "not 32-bit data"))?;
        // Older clients omit the trailing window_group word.
        if words.len() < 8 {
            return Err(Error::malformed("WM_HINTS", format!("{} words", words.len())));
        }

        let flags = WmHintsFlags::from_bits_retain(words[0]);
        let gated = |flag: WmHintsFlags, v: u32| (flags.contains(flag) && v != 0).then_some(v);

        Ok(WmHints {
            flags,
            input: (words[1] & 1) != 0,
            initial_state: words[2],
            icon_pixmap: gated(WmHintsFlags::ICON_PIXMAP, words[3]),
            icon_window: gated(WmHintsFlags::ICON_WINDOW, words[4]),
            icon_mask: gated(WmHintsFlags::ICON_MASK, words[7]),
            window_group: words
                .get(8)
                .and_then(|&v| gated(WmHintsFlags::WINDOW_GROUP, v)),
        })
    }
}

/// MOTIF WM Hints structure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotifWmHints {
    pub flags: u32,
    pub functions: u32,
    pub decorations: u32,
}

impl MotifWmHints {
    pub const HINTS_FUNCTIONS: u32 = 1 << 0;
    pub const HINTS_DECORATIONS: u32 = 1 << 1;
    pub const DECOR_ALL: u32 = 1 << 0;
    pub const DECOR_BORDER: u32 = 1 << 1;
    pub const DECOR_RESIZEH: u32 = 1 << 2;
    pub const DECOR_TITLE: u32 = 1 << 3;

    pub fn from_property(value: &PropertyValue) -> Result<Self> {
        match value.words() {
            Some(&[flags, functions, decorations, ..]) => Ok(MotifWmHints {
                flags,
                functions,
                decorations,
            }),
            _ => Err(Error::malformed("_MOTIF_WM_HINTS", "fewer than 3 words")),
        }
    }

    /// Decorated unless the decorations field is present and asks for
    /// neither the full frame, a title nor resize handles.
    pub fn decorated(&self) -> bool {
        if self.flags & Self::HINTS_DECORATIONS == 0 {
            return true;
        }
        self.decorations & (Self::DECOR_ALL | Self::DECOR_TITLE | Self::DECOR_RESIZEH) != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hints(flags: SizeHintsFlags) -> SizeHints {
        SizeHints {
            flags,
            ..Default::default()
        }
    }

    #[test]
    fn test_unset_flags_give_defaults() {
        let h = SizeHints {
            min_width: 50,
            min_height: 50,
            max_width: 100,
            max_height: 100,
            ..Default::default()
        };
        assert_eq!(h.min(), Size::new(0, 0));
        assert_eq!(h.max(), None);
        assert!(!h.is_fixed());
    }

    #[test]
    fn test_fixed_size() {
        let h = SizeHints {
            min_width: 200,
            min_height: 100,
            max_width: 200,
            max_height: 100,
            ..hints(SizeHintsFlags::P_MIN_SIZE | SizeHintsFlags::P_MAX_SIZE)
        };
        assert!(h.is_fixed());
        assert_eq!(h.constrain(Size::new(50, 50)), Size::new(200, 100));
    }

    #[test]
    fn test_snap_to_nearest_increment() {
        let h = SizeHints {
            width_inc: 10,
            height_inc: 10,
            ..hints(SizeHintsFlags::P_RESIZE_INC)
        };
        assert_eq!(h.snap(Size::new(27, 24)), Size::new(30, 20));
        // Ties round away from zero.
        assert_eq!(h.snap(Size::new(25, 35)), Size::new(30, 40));
    }

    #[test]
    fn test_snap_uses_min_as_base() {
        let h = SizeHints {
            min_width: 5,
            min_height: 3,
            width_inc: 10,
            height_inc: 4,
            ..hints(SizeHintsFlags::P_MIN_SIZE | SizeHintsFlags::P_RESIZE_INC)
        };
        assert_eq!(h.snap(Size::new(27, 12)), Size::new(25, 11));
    }

    #[test]
    fn test_snap_below_base_stays_on_grid() {
        let h = SizeHints {
            min_width: 30,
            min_height: 30,
            width_inc: 40,
            height_inc: 40,
            ..hints(SizeHintsFlags::P_MIN_SIZE | SizeHintsFlags::P_RESIZE_INC)
        };
        assert_eq!(h.snap(Size::new(0, 12)), Size::new(30, 30));
        assert_eq!(h.snap(Size::new(5, 9)), Size::new(30, 30));
    }

    #[test]
    fn test_snap_prefers_declared_base() {
        let h = SizeHints {
            min_width: 5,
            base_width: 2,
            width_inc: 10,
            height_inc: 0,
            ..hints(
                SizeHintsFlags::P_MIN_SIZE | SizeHintsFlags::P_BASE_SIZE | SizeHintsFlags::P_RESIZE_INC,
            )
        };
        assert_eq!(h.snap(Size::new(27, 13)), Size::new(32, 13));
    }

    #[test]
    fn test_fit_stays_on_grid_inside_bounds() {
        let h = SizeHints {
            min_width: 10,
            min_height: 10,
            max_width: 104,
            max_height: 104,
            width_inc: 20,
            height_inc: 20,
            ..hints(
                SizeHintsFlags::P_MIN_SIZE | SizeHintsFlags::P_MAX_SIZE | SizeHintsFlags::P_RESIZE_INC,
            )
        };
        // 104 snaps to 110 (beyond max), stepping back gives 90.
        assert_eq!(h.fit(Size::new(500, 104)), Size::new(90, 90));
    }

    #[test]
    fn test_parse_normal_hints_raises_inverted_max() {
        let mut words = vec![0u32; 18];
        words[0] = (SizeHintsFlags::P_MIN_SIZE | SizeHintsFlags::P_MAX_SIZE).bits();
        words[5] = 300;
        words[6] = 200;
        words[7] = 100;
        words[8] = 250;
        let h = SizeHints::from_property(&PropertyValue::Cardinals(words)).unwrap();
        assert_eq!(h.max(), Some(Size::new(300, 250)));
    }

    #[test]
    fn test_parse_short_normal_hints_is_malformed() {
        let err = SizeHints::from_property(&PropertyValue::Cardinals(vec![0; 4])).unwrap_err();
        assert!(matches!(err, Error::Malformed { .. }));
    }

    #[test]
    fn test_size_hints_survive_property_encoding() {
        let h = SizeHints {
            min_width: 10,
            min_height: 20,
            base_width: 4,
            base_height: 6,
            ..hints(SizeHintsFlags::P_MIN_SIZE | SizeHintsFlags::P_BASE_SIZE)
        };
        assert_eq!(SizeHints::from_property(&h.to_property()).unwrap(), h);
    }

    #[test]
    fn test_wm_hints_window_group_requires_flag() {
        let words = vec![0, 1, 1, 0, 0, 0, 0, 0, 0x400001];
        let h = WmHints::from_property(&PropertyValue::Cardinals(words.clone())).unwrap();
        assert_eq!(h.window_group, None);

        let mut flagged = words;
        flagged[0] = WmHintsFlags::WINDOW_GROUP.bits();
        let h = WmHints::from_property(&PropertyValue::Cardinals(flagged)).unwrap();
        assert_eq!(h.window_group, Some(0x400001));
    }

    #[test]
    fn test_motif_decorations() {
        let no_decor = MotifWmHints {
            flags: MotifWmHints::HINTS_DECORATIONS,
            functions: 0,
            decorations: 0,
        };
        assert!(!no_decor.decorated());

        let border_only = MotifWmHints {
            decorations: MotifWmHints::DECOR_BORDER,
            ..no_decor
        };
        assert!(!border_only.decorated());

        let titled = MotifWmHints {
            decorations: MotifWmHints::DECOR_TITLE,
            ..no_decor
        };
        assert!(titled.decorated());

        let functions_only = MotifWmHints {
            flags: MotifWmHints::HINTS_FUNCTIONS,
            functions: 0,
            decorations: 0,
        };
        assert!(functions_only.decorated());
    }
}
