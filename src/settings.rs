use serde::{
    Deserialize,
    Serialize,
};

/// Options for running a compiled path against a document.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectSettings {
    /// Turn missing properties, out of range indexes and empty slices into
    /// errors instead of silently selecting nothing.
    pub error_when_no_match: bool,
}

impl SelectSettings {
    pub fn strict() -> Self {
        SelectSettings {
            error_when_no_match: true,
        }
    }

    pub fn with_error_when_no_match(mut self, error_when_no_match: bool) -> Self {
        self.error_when_no_match = error_when_no_match;
        self
    }
}
