//! # poi-nav
//!
//! Builds a navigable outline ("points of interest") of a chat transcript rendered
//! by a third-party page and keeps it synchronized with the page's live DOM:
//! extraction, outline building, annotation merge and persistence, visibility
//! tracking, and debounced rebuilds that preserve the reader's scroll position.
//!
//! The engine runs against any [`poi_dom::DomDocument`]; hosts supply storage, a
//! scheduler and observers through the seams in [`poi_traits`].

pub mod config;
pub mod error;
pub mod navigator;

pub use config::NavConfig;
pub use error::{ConfigError, NavError};
pub use navigator::{
    Direction, Navigator, NavigatorBuilder, RebuildOutcome, RebuildState, ScrollCapture,
    StopButtonSignal, StreamingSignal,
};

pub use poi_dom::{DomDocument, DomNode, MemNode, MemoryDom};
pub use poi_extract::Extractor;
pub use poi_outline::{OutlineBuilder, Poi, PoiKind, PoiSummary, TitleLimits};
pub use poi_store::{Annotate, AnnotationStore, StateSnapshot};
pub use poi_types::{ColorTag, PoiId};

/// Builds the outline of a static page in one pass, without observers or
/// persistence.
pub fn outline_of<D: DomDocument>(document: &D, config: &NavConfig) -> Result<Vec<Poi<D::Node>>, NavError> {
    config.validate()?;
    let extractor = Extractor::new(
        &config.message_selector,
        &config.role_attribute,
        &config.fallback_container_selectors,
    )?;
    let messages = extractor.extract_messages(document);
    Ok(OutlineBuilder::new(config.title_limits())?.build(&messages))
}
