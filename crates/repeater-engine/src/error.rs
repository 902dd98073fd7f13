use crate::models::BlockId;
use crate::source::SourceError;
use crate::template::TemplateError;

/// A min/max bound that would be crossed by the requested operation.
///
/// The `Display` text is what the user sees; the operation is aborted with no
/// state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CardinalityViolation {
    #[error("Maximum number of blocks reached")]
    MaxReached { max: usize },
    #[error("Minimum number of blocks reached")]
    MinReached { min: usize },
    /// The source returned fewer blocks than the minimum required.
    #[error("Minimum number of blocks not reached ({len} of {min})")]
    BelowMinimum { min: usize, len: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum RepeaterError {
    #[error(transparent)]
    Cardinality(#[from] CardinalityViolation),
    #[error("Failed to fetch blocks: {0}")]
    Fetch(#[from] SourceError),
    #[error("Failed to render block: {0}")]
    Template(#[from] TemplateError),
    #[error("Unknown block: {0}")]
    UnknownBlock(BlockId),
    #[error("Invalid block order: {0}")]
    InvalidOrder(String),
    #[error("Invalid options: {0}")]
    InvalidOptions(String),
    #[error("Repeater is already populated")]
    AlreadyPopulated,
    #[error("Repeater has been disconnected")]
    Disconnected,
}

impl RepeaterError {
    /// Policy rejections are expected user feedback rather than faults.
    pub fn is_policy_violation(&self) -> bool {
        matches!(self, RepeaterError::Cardinality(_))
    }
}
