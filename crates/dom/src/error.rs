use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomError {
    #[error("Node is no longer attached to the document: {0}")]
    Detached(String),

    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Failed to parse document snapshot: {0}")]
    Parse(String),

    #[error("Host DOM error: {0}")]
    Host(String),
}
