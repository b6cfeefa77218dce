//! # poi-dom
//!
//! The read side of the host page. Everything that extracts an outline is written
//! against [`DomNode`] and [`DomDocument`], so the same code runs on a live browser
//! DOM (see `poi-wasm`) and on [`MemoryDom`], an in-memory tree used natively and
//! in tests.
//!
//! - [`node`]: the node and document contracts
//! - [`order`]: document-order comparison and a stable document-order sort
//! - [`selector`]: a `nom` parser and matcher for the CSS subset the extractor needs
//! - [`memory`]: a mutable arena DOM that can be built from an XHTML snapshot

pub mod error;
pub mod memory;
pub mod node;
pub mod order;
pub mod selector;

pub use error::DomError;
pub use memory::{MemNode, MemoryDom};
pub use node::{DomDocument, DomNode, Overflow, ScrollBehavior};
pub use order::sort_in_document_order;
pub use selector::{SelectorList, parse_selector};
