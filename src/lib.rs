//! Area Hints
//!
//! ICCCM / EWMH property layer for the Area window manager: window metadata
//! with legacy/extended fallback, size-hint constraints, `_NET_WM_STATE`
//! tags, screen geometry and the published client lists.

pub mod config;
pub mod shared;
pub mod wm;

pub use wm::backend::{Backend, Prop, PropertyValue, WindowId};
pub use wm::client::ClientProperties;
pub use wm::constraints::Constraints;
pub use wm::error::{Error, Result};
pub use wm::ewmh::X11Backend;
pub use wm::hints::{Size, SizeHints};
pub use wm::properties::{Properties, WindowAction, WindowType, WmState};
pub use wm::screen::{Screen, ScreenModel};
pub use wm::stacking::ClientOrder;
pub use wm::state::ExtendedState;
