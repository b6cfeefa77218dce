pub mod color;
pub mod geometry;
pub mod ids;

pub use color::{ColorTag, UnknownColorTag};
pub use geometry::{Rect, ScrollMetrics};
pub use ids::PoiId;
