//! Types shared between the property layer and its callers.

mod geometry;

pub use geometry::Geometry;
