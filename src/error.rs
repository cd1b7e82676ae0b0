use thiserror::Error;

/// Errors raised by the sort engine components.
///
/// Orchestration code wraps these in [anyhow::Error] with the failing stage as context, the
/// original kind stays reachable with `error.downcast_ref::<SortError>()`.
#[derive(Debug, Error)]
pub enum SortError {
    /// A value does not fit its declared fixed width or does not parse as the declared type
    #[error("encoding error: {0}")]
    Encoding(String),
    /// Input does not match the declared schema
    #[error("malformed input: {0}")]
    MalformedInput(String),
    /// Memory budget, widths, charsets or other settings that cannot work
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Underlying storage failure
    #[error("io failure: {0}")]
    Io(#[from] std::io::Error),
    /// An internal consistency check failed, not caused by bad input
    #[error("internal invariant violated: {0}")]
    InternalInvariant(String),
}
