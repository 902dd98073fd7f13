use serde::{Deserialize, Serialize};

use crate::error::RepeaterError;

/// Cardinality options supplied by the host page.
///
/// Immutable once a controller has been built from them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<usize>,
}

impl Options {
    /// Parse the host's JSON options string. Missing keys fall back to defaults.
    pub fn from_json(json: &str) -> Result<Self, RepeaterError> {
        serde_json::from_str(json).map_err(|e| RepeaterError::InvalidOptions(e.to_string()))
    }

    /// Lowest block count the list may be reduced to.
    ///
    /// `min` when set, otherwise 1 for a required field.
    pub fn floor(&self) -> Option<usize> {
        self.min.or(self.required.then_some(1))
    }

    /// Number of blocks still missing to satisfy the floor.
    pub fn shortfall(&self, current: usize) -> usize {
        self.floor().map_or(0, |floor| floor.saturating_sub(current))
    }

    /// Number of blocks that can still be added before hitting `max`.
    pub fn capacity(&self, current: usize) -> Option<usize> {
        self.max.map(|max| max.saturating_sub(current))
    }

    pub fn at_max(&self, current: usize) -> bool {
        self.max.is_some_and(|max| current >= max)
    }

    pub fn at_floor(&self, current: usize) -> bool {
        self.floor().is_some_and(|floor| current <= floor)
    }

    pub fn validate(&self) -> Result<(), RepeaterError> {
        if let (Some(floor), Some(max)) = (self.floor(), self.max)
            && floor > max
        {
            return Err(RepeaterError::InvalidOptions(format!(
                "minimum of {floor} blocks exceeds maximum of {max}"
            )));
        }
        Ok(())
    }
}
