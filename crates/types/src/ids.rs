//! Newtype wrapper for outline entry identifiers.
//!
//! POI ids are derived from document ordinals (`msg_3_response_h2_1`), so they are
//! cheap to recompute but only stable while the host page keeps its structure.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// The identifier of one outline entry.
#[derive(Debug, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoiId(Arc<str>);

impl PoiId {
    /// Creates a new PoiId from a string
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    /// Returns the string representation of this id
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The id of a message-level entry: `msg_<1-based index>_<prompt|response>`.
    pub fn for_message(index: usize, is_prompt: bool) -> Self {
        let suffix = if is_prompt { "prompt" } else { "response" };
        Self::new(format!("msg_{}_{}", index + 1, suffix))
    }

    /// The id of a sub-entry owned by this message entry, e.g. `<self>_code_2`.
    pub fn child(&self, segment: &str, ordinal: usize) -> Self {
        Self::new(format!("{}_{}_{}", self.0, segment, ordinal))
    }
}

impl From<String> for PoiId {
    fn from(s: String) -> Self {
        Self(s.into())
    }
}

impl From<&str> for PoiId {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl AsRef<str> for PoiId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for PoiId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PoiId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_ids_are_one_based() {
        assert_eq!(PoiId::for_message(0, true).as_str(), "msg_1_prompt");
        assert_eq!(PoiId::for_message(3, false).as_str(), "msg_4_response");
    }

    #[test]
    fn child_ids_extend_the_parent() {
        let parent = PoiId::for_message(1, false);
        assert_eq!(parent.child("h2", 3).as_str(), "msg_2_response_h2_3");
        assert_eq!(parent.child("table", 1).as_str(), "msg_2_response_table_1");
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = PoiId::from("msg_1_prompt");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"msg_1_prompt\"");
    }

    #[test]
    fn deserializes_from_plain_string() {
        let id: PoiId = serde_json::from_str("\"msg_2_response_code_1\"").unwrap();
        assert_eq!(id, PoiId::from("msg_2_response_code_1"));
    }
}
