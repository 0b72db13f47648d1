//! Constraints Module
//!
//! Size legality checks for resize and maximize requests, driven by each
//! window's WM_NORMAL_HINTS. Hints are re-read on every call.

use tracing::{debug, warn};

use crate::wm::backend::{Backend, Prop, WindowId};
use crate::wm::error::Result;
use crate::wm::hints::{Size, SizeHints};
use crate::wm::properties::Properties;
use crate::wm::screen::Screen;

pub struct Constraints<'c, B: Backend + ?Sized> {
    props: Properties<'c, B>,
}

impl<'c, B: Backend + ?Sized> Constraints<'c, B> {
    pub fn new(conn: &'c B) -> Self {
        Self {
            props: Properties::new(conn),
        }
    }

    /// Hints for `window`; a window without WM_NORMAL_HINTS is unconstrained.
    pub fn hints(&self, window: WindowId) -> Result<SizeHints> {
        Ok(self.props.normal_hints(window)?.unwrap_or_default())
    }

    /// Declared minimum, (0, 0) when unset.
    pub fn size_min(&self, window: WindowId) -> Result<Size> {
        Ok(self.hints(window)?.min())
    }

    /// Declared maximum, `None` when unconstrained.
    pub fn size_max(&self, window: WindowId) -> Result<Option<Size>> {
        Ok(self.hints(window)?.max())
    }

    pub fn size_fixed(&self, window: WindowId) -> Result<bool> {
        Ok(self.hints(window)?.is_fixed())
    }

    /// Clamp into [min, max]. Apply before `size_with_increment`.
    pub fn size_constrain(&self, window: WindowId, width: u32, height: u32) -> Result<Size> {
        Ok(self.hints(window)?.constrain(Size::new(width, height)))
    }

    /// Snap to the resize increment grid. Without usable hints the request
    /// is returned unchanged.
    pub fn size_with_increment(&self, window: WindowId, width: u32, height: u32) -> Result<Size> {
        let requested = Size::new(width, height);
        match self.props.connection().get_property(window, Prop::WmNormalHints) {
            Ok(Some(value)) => match SizeHints::from_property(&value) {
                Ok(hints) => Ok(hints.snap(requested)),
                Err(e) => {
                    warn!("Could not apply increment for 0x{:x}: {}", window, e);
                    Ok(requested)
                }
            },
            Ok(None) => Ok(requested),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                warn!("Could not apply increment for 0x{:x}: {}", window, e);
                Ok(requested)
            }
        }
    }

    /// Constrain, snap and keep the result on the grid within the bounds.
    pub fn size_fit(&self, window: WindowId, width: u32, height: u32) -> Result<Size> {
        let fitted = self.hints(window)?.fit(Size::new(width, height));
        debug!("Fitted {}x{} to {}x{} for 0x{:x}", width, height, fitted.width, fitted.height, window);
        Ok(fitted)
    }

    /// Whether the declared maximum allows covering `screen`.
    pub fn size_can_maximize(&self, window: WindowId, screen: &Screen) -> Result<bool> {
        Ok(match self.size_max(window)? {
            None => true,
            Some(max) => max.width >= screen.width && max.height >= screen.height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wm::backend::PropertyValue;
    use crate::shared::Geometry;
    use crate::wm::hints::SizeHintsFlags;
    use crate::wm::testing::FakeBackend;
    use proptest::prelude::*;

    const WIN: WindowId = 0x1e00004;

    fn backend_with(hints: &SizeHints) -> FakeBackend {
        FakeBackend::new().with(WIN, Prop::WmNormalHints, hints.to_property())
    }

    fn bounded(min: (u32, u32), max: (u32, u32)) -> SizeHints {
        SizeHints {
            flags: SizeHintsFlags::P_MIN_SIZE | SizeHintsFlags::P_MAX_SIZE,
            min_width: min.0,
            min_height: min.1,
            max_width: max.0,
            max_height: max.1,
            ..Default::default()
        }
    }

    fn screen(width: u32, height: u32) -> Screen {
        Screen::new("DP-1", 0, Geometry::new(0, 0, width, height), 1.0)
    }

    #[test]
    fn test_no_max_is_unconstrained_and_maximizable() {
        let hints = SizeHints {
            flags: SizeHintsFlags::P_MIN_SIZE,
            min_width: 100,
            min_height: 100,
            ..Default::default()
        };
        let conn = backend_with(&hints);
        let c = Constraints::new(&conn);
        assert_eq!(c.size_max(WIN).unwrap(), None);
        assert!(c.size_can_maximize(WIN, &screen(7680, 4320)).unwrap());
    }

    #[test]
    fn test_maximize_needs_max_covering_screen() {
        let conn = backend_with(&bounded((0, 0), (1920, 1000)));
        let c = Constraints::new(&conn);
        assert!(!c.size_can_maximize(WIN, &screen(1920, 1080)).unwrap());
        assert!(c.size_can_maximize(WIN, &screen(1600, 900)).unwrap());
    }

    #[test]
    fn test_fixed_size_window() {
        let conn = backend_with(&bounded((200, 100), (200, 100)));
        let c = Constraints::new(&conn);
        assert!(c.size_fixed(WIN).unwrap());
        assert_eq!(c.size_constrain(WIN, 50, 50).unwrap(), Size::new(200, 100));
    }

    #[test]
    fn test_window_without_hints_is_not_fixed() {
        let conn = FakeBackend::new();
        let c = Constraints::new(&conn);
        assert!(!c.size_fixed(WIN).unwrap());
        assert_eq!(c.size_min(WIN).unwrap(), Size::new(0, 0));
        assert_eq!(c.size_constrain(WIN, 12, 34).unwrap(), Size::new(12, 34));
    }

    #[test]
    fn test_increment_snaps_to_nearest() {
        let hints = SizeHints {
            flags: SizeHintsFlags::P_RESIZE_INC,
            width_inc: 10,
            height_inc: 10,
            ..Default::default()
        };
        let conn = backend_with(&hints);
        assert_eq!(
            Constraints::new(&conn).size_with_increment(WIN, 27, 27).unwrap(),
            Size::new(30, 30)
        );
    }

    #[test]
    fn test_increment_ignores_unreadable_hints() {
        let conn = FakeBackend::new().with(WIN, Prop::WmNormalHints, PropertyValue::Cardinals(vec![64, 1]));
        let c = Constraints::new(&conn);
        assert_eq!(c.size_with_increment(WIN, 27, 27).unwrap(), Size::new(27, 27));

        conn.break_property(WIN, Prop::WmNormalHints);
        assert_eq!(c.size_with_increment(WIN, 27, 27).unwrap(), Size::new(27, 27));

        conn.disconnect();
        assert!(c.size_with_increment(WIN, 27, 27).unwrap_err().is_fatal());
    }

    #[test]
    fn test_size_fit_terminal_grid() {
        let hints = SizeHints {
            flags: SizeHintsFlags::P_MIN_SIZE
                | SizeHintsFlags::P_MAX_SIZE
                | SizeHintsFlags::P_RESIZE_INC
                | SizeHintsFlags::P_BASE_SIZE,
            min_width: 40,
            min_height: 40,
            max_width: 1000,
            max_height: 700,
            width_inc: 9,
            height_inc: 17,
            base_width: 22,
            base_height: 6,
        };
        let conn = backend_with(&hints);
        let fitted = Constraints::new(&conn).size_fit(WIN, 5000, 5000).unwrap();
        assert!(fitted.width <= 1000 && fitted.height <= 700);
        assert_eq!((fitted.width - 22) % 9, 0);
        assert_eq!((fitted.height - 6) % 17, 0);
    }

    fn arb_hints() -> impl Strategy<Value = SizeHints> {
        (0u32..500, 0u32..500, 0u32..1500, 0u32..1500, 0u32..40, 0u32..40, any::<bool>(), any::<bool>())
            .prop_map(|(min_w, min_h, extra_w, extra_h, inc_w, inc_h, has_max, has_inc)| {
                let mut flags = SizeHintsFlags::P_MIN_SIZE;
                if has_max {
                    flags |= SizeHintsFlags::P_MAX_SIZE;
                }
                if has_inc {
                    flags |= SizeHintsFlags::P_RESIZE_INC;
                }
                SizeHints {
                    flags,
                    min_width: min_w,
                    min_height: min_h,
                    max_width: min_w + extra_w,
                    max_height: min_h + extra_h,
                    width_inc: inc_w,
                    height_inc: inc_h,
                    ..Default::default()
                }
            })
    }

    proptest! {
        #[test]
        fn prop_constrain_is_identity_inside_bounds(hints in arb_hints(), fw in 0.0f64..=1.0, fh in 0.0f64..=1.0) {
            let min = hints.min();
            let max = hints.max().unwrap_or(Size::new(min.width + 3000, min.height + 3000));
            let w = min.width + ((max.width - min.width) as f64 * fw) as u32;
            let h = min.height + ((max.height - min.height) as f64 * fh) as u32;

            let conn = backend_with(&hints);
            prop_assert_eq!(Constraints::new(&conn).size_constrain(WIN, w, h).unwrap(), Size::new(w, h));
        }

        #[test]
        fn prop_constrain_clamps_outside_bounds(hints in arb_hints(), w in 0u32..5000, h in 0u32..5000) {
            let conn = backend_with(&hints);
            let out = Constraints::new(&conn).size_constrain(WIN, w, h).unwrap();
            let min = hints.min();
            if w < min.width {
                prop_assert_eq!(out.width, min.width);
            }
            if h < min.height {
                prop_assert_eq!(out.height, min.height);
            }
            if let Some(max) = hints.max() {
                if w > max.width {
                    prop_assert_eq!(out.width, max.width);
                }
                if h > max.height {
                    prop_assert_eq!(out.height, max.height);
                }
            }
        }

        #[test]
        fn prop_increment_lands_on_grid(hints in arb_hints(), w in 0u32..5000, h in 0u32..5000) {
            let conn = backend_with(&hints);
            let c = Constraints::new(&conn);
            let snapped = c.size_with_increment(WIN, w, h).unwrap();
            let base = hints.base();
            if hints.flags.contains(SizeHintsFlags::P_RESIZE_INC) {
                if hints.width_inc > 0 {
                    let offset = i64::from(snapped.width) - i64::from(base.width);
                    prop_assert_eq!(offset.rem_euclid(i64::from(hints.width_inc)), 0);
                }
                if hints.height_inc > 0 {
                    let offset = i64::from(snapped.height) - i64::from(base.height);
                    prop_assert_eq!(offset.rem_euclid(i64::from(hints.height_inc)), 0);
                }
            }

            let constrained = c.size_constrain(WIN, snapped.width, snapped.height).unwrap();
            prop_assert!(constrained.width >= hints.min().width);
            prop_assert!(constrained.height >= hints.min().height);
            if let Some(max) = hints.max() {
                prop_assert!(constrained.width <= max.width && constrained.height <= max.height);
            }
        }

        #[test]
        fn prop_fixed_iff_min_equals_max(min_w in 0u32..50, min_h in 0u32..50, max_w in 0u32..50, max_h in 0u32..50, has_min in any::<bool>(), has_max in any::<bool>()) {
            let mut flags = SizeHintsFlags::empty();
            if has_min {
                flags |= SizeHintsFlags::P_MIN_SIZE;
            }
            if has_max {
                flags |= SizeHintsFlags::P_MAX_SIZE;
            }
            let hints = SizeHints { flags, min_width: min_w, min_height: min_h, max_width: max_w, max_height: max_h, ..Default::default() };
            let conn = backend_with(&hints);
            let c = Constraints::new(&conn);

            let min = c.size_min(WIN).unwrap();
            let expected = c.size_max(WIN).unwrap() == Some(min);
            prop_assert_eq!(c.size_fixed(WIN).unwrap(), expected);
            if !has_max {
                prop_assert!(!c.size_fixed(WIN).unwrap());
            }
        }
    }
}
