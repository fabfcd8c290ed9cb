//! Parse errors for the core name tables.

use thiserror::Error;

/// A string did not match any known name for the requested type.
#[derive(Debug, Error)]
#[error("unrecognized {kind} name: '{name}'")]
pub struct ParseError {
    kind: &'static str,
    name: String,
}

impl ParseError {
    pub(crate) fn new(kind: &'static str, name: &str) -> Self {
        Self {
            kind,
            name: name.to_string(),
        }
    }
}
