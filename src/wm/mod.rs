//! Window Manager Module
//!
//! ICCCM / EWMH protocol layer: property access, size constraints,
//! extended state, screens and the published client lists.

pub mod backend;
pub mod client;
pub mod constraints;
pub mod error;
pub mod ewmh;
pub mod hints;
pub mod icons;
pub mod properties;
pub mod screen;
pub mod stacking;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;
