use thiserror::Error;

/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur when loading or resolving a template.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A state id was looked up that does not exist in the template.
    ///
    /// On a validated template this indicates an internal consistency bug
    /// or corrupted data, never a steady-state runtime condition.
    #[error("unknown state: \"{0}\"")]
    UnknownState(String),

    /// The template document could not be parsed.
    #[error("malformed template document: {0}")]
    Parse(#[from] serde_json::Error),
}
