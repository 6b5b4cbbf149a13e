use thiserror::Error;

use crate::io::ItemId;

/// Errors raised while building a rating index or scoring associations.
///
/// Every variant is a deterministic function of the input data. None of
/// them indicates a transient fault, so callers should not retry; a failure
/// for one reference item must not stop the processing of other items.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssociationError {
    /// Malformed or missing raw records, or a reference item absent from
    /// the index.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A lookup for an item never present in the index.
    #[error("unknown item {item}")]
    UnknownItem { item: ItemId },

    /// The dataset cannot support the requested computation, e.g. a
    /// reference item without raters.
    #[error("degenerate input: {0}")]
    DegenerateInput(String),
}
