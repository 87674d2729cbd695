//! Predicate evaluation for choice guards.
//!
//! Guards are opaque named predicates; the engine never interprets them.
//! The embedder supplies an evaluator that closes over whatever context the
//! predicates need (game flags, quest state, inventory).

use std::collections::HashMap;

use thiserror::Error;

/// Errors raised by a predicate evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PredicateError {
    /// The named predicate is not known to the evaluator.
    #[error("unknown predicate: \"{0}\"")]
    UnknownPredicate(String),
}

/// Resolves named guard predicates against the embedder's context.
///
/// Evaluation is synchronous and must not block; an embedder with
/// asynchronous sources should snapshot results up front and answer from
/// the snapshot here.
pub trait PredicateEvaluator {
    /// Evaluate the predicate with the given id.
    fn evaluate(&self, predicate: &str) -> Result<bool, PredicateError>;
}

/// A flag-table evaluator backed by a plain map.
///
/// Useful for tests and the CLI driver. A predicate without an entry is an
/// error, not `false`, so typos in templates surface instead of silently
/// locking choices.
#[derive(Debug, Clone, Default)]
pub struct FlagEvaluator {
    flags: HashMap<String, bool>,
}

impl FlagEvaluator {
    /// Create an evaluator with no flags defined.
    pub fn new() -> Self {
        Self::default()
    }

    /// Define or overwrite a flag.
    pub fn set(&mut self, predicate: impl Into<String>, value: bool) {
        self.flags.insert(predicate.into(), value);
    }

    /// Remove a flag, making the predicate unknown again.
    pub fn unset(&mut self, predicate: &str) {
        self.flags.remove(predicate);
    }

    /// Look up a flag without going through the trait.
    pub fn get(&self, predicate: &str) -> Option<bool> {
        self.flags.get(predicate).copied()
    }
}

impl PredicateEvaluator for FlagEvaluator {
    fn evaluate(&self, predicate: &str) -> Result<bool, PredicateError> {
        self.flags
            .get(predicate)
            .copied()
            .ok_or_else(|| PredicateError::UnknownPredicate(predicate.to_string()))
    }
}
