//! # poi-outline
//!
//! Turns extracted chat messages into the outline: a flat, depth-annotated,
//! document-ordered sequence of points of interest (POIs).

mod builder;
mod code_label;
mod poi;
mod text;

pub use builder::{OutlineBuilder, TitleLimits};
pub use code_label::code_label;
pub use poi::{Anchor, Poi, PoiKind, PoiSummary};
pub use text::short_text;
