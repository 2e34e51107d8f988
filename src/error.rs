use thiserror::Error;

/// Failure while evaluating or naming an attribute filter.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    /// A diameter or hazard filter reached an approach with no linked NEO.
    #[error("close approach of '{designation}' has no linked NEO")]
    UnlinkedApproach { designation: String },

    #[error("unsupported filter criterion: {0}")]
    UnsupportedCriterion(String),
}

/// Errors surfaced by the data layer outside of loading.
#[derive(Debug, Error)]
pub enum NeoError {
    #[error(transparent)]
    Filter(#[from] FilterError),

    /// A result handed to a writer cannot be serialised without its NEO.
    #[error("close approach of '{designation}' has no linked NEO to export")]
    Unlinked { designation: String },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),
}
