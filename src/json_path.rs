use std::str::FromStr;

use log::debug;
use serde_json::Value;

use crate::error::{
    EvalError,
    ParseError,
};
use crate::path_filter::{
    self,
    PathFilter,
};
use crate::path_parser::PathParser;
use crate::settings::SelectSettings;

/// A compiled path. Immutable once parsed, so it can be shared between threads
/// and evaluated against any number of documents.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonPath {
    filters: Vec<PathFilter>,
}

impl JsonPath {
    pub fn parse(path_str: &str) -> Result<Self, ParseError> {
        let filters = PathParser::new(path_str).parse()?;
        debug!("compiled path {:?} into {} filter(s)", path_str, filters.len());

        Ok(JsonPath {
            filters,
        })
    }

    pub fn filters(&self) -> &[PathFilter] {
        &self.filters
    }

    /// Every node matched, in document order per filter stage. Duplicates are kept.
    pub fn select_with<'a>(&self, root: &'a Value, settings: &SelectSettings) -> Result<Vec<&'a Value>, EvalError> {
        let selected = path_filter::evaluate(&self.filters, root, root, settings.error_when_no_match)?;
        debug!("path with {} filter(s) selected {} node(s)", self.filters.len(), selected.len());

        Ok(selected)
    }

    pub fn select_all<'a>(&self, root: &'a Value, error_when_no_match: bool) -> Result<Vec<&'a Value>, EvalError> {
        self.select_with(root, &SelectSettings::default().with_error_when_no_match(error_when_no_match))
    }

    /// `None` when nothing matches; more than one match is an error whatever
    /// `error_when_no_match` says.
    pub fn select_one<'a>(&self, root: &'a Value, error_when_no_match: bool) -> Result<Option<&'a Value>, EvalError> {
        let mut selected = self.select_all(root, error_when_no_match)?;
        if selected.len() > 1 {
            return Err(EvalError::MultipleResults);
        }

        Ok(selected.pop())
    }
}

impl FromStr for JsonPath {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JsonPath::parse(s)
    }
}
