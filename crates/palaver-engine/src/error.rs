use thiserror::Error;

use crate::eval::PredicateError;

/// Alias for `Result<T, EngineError>`.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur while driving a dialogue session.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A state id was selected that does not exist in the template.
    ///
    /// Always a programmer or data-integrity error; never expected from
    /// untrusted input and never recovered from.
    #[error("unknown state: \"{0}\"")]
    UnknownState(String),

    /// A choice index was out of range or currently unavailable.
    ///
    /// Expected from a stale or adversarial mirror. Hosts must catch this
    /// at the boundary and answer with a state resync instead of
    /// propagating it; see [`crate::sync::handle_selection`].
    #[error("invalid choice: {0}")]
    InvalidChoice(usize),

    /// A guard predicate could not be evaluated.
    ///
    /// The availability update that hit this aborts without touching the
    /// previous snapshot.
    #[error(transparent)]
    Predicate(#[from] PredicateError),
}
