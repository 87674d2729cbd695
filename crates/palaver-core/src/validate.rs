//! Static soft-lock analysis over a dialogue template.
//!
//! Run once at load time. The check proves, by backward reachability from
//! the terminal states, that every reachable state can still reach a
//! terminal. States that can only get there through guarded choices are
//! flagged as warnings, since a guard that never evaluates true at runtime
//! would strand the session in a way no static pass can rule out.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;

use thiserror::Error;

use crate::template::Template;

/// Outcome of a successful validation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validation {
    /// The template is well-formed with nothing to report.
    Success,
    /// The template is accepted, with diagnostics worth surfacing to the
    /// author.
    Warnings(Vec<ValidateWarning>),
}

impl Validation {
    /// The collected warnings, empty on [`Validation::Success`].
    pub fn warnings(&self) -> &[ValidateWarning] {
        match self {
            Validation::Success => &[],
            Validation::Warnings(warnings) => warnings,
        }
    }
}

/// A hard template defect. The template is rejected wholesale; it is never
/// partially accepted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidateError {
    /// The `start_at` id is not a key of the state map.
    #[error("start state \"{0}\" is not defined")]
    MissingStart(String),

    /// A non-terminal state has no choices, so the player can never leave.
    #[error("state \"{0}\" is not terminal and has no choices")]
    NoChoice(String),

    /// A choice points at a state id that does not exist.
    #[error("state \"{state}\" choice {choice} leads to undefined state \"{next}\"")]
    DanglingNext {
        /// The state holding the broken choice.
        state: String,
        /// Index of the broken choice within the state.
        choice: usize,
        /// The unresolved target id.
        next: String,
    },

    /// The state structurally cannot reach any terminal state.
    #[error("state \"{0}\" has no path to any terminal state")]
    SoftLock(String),
}

/// A template flaw the author should know about, but which does not prevent
/// loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidateWarning {
    /// The state has no incoming choices and is not the start state.
    Unreachable(String),
    /// Every path from the state to a terminal passes through at least one
    /// guarded choice.
    ConditionalSoftLock(String),
}

impl fmt::Display for ValidateWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidateWarning::Unreachable(state) => {
                write!(f, "state \"{state}\" is unreachable from the start state")
            }
            ValidateWarning::ConditionalSoftLock(state) => write!(
                f,
                "state \"{state}\" reaches a terminal state only through guarded choices"
            ),
        }
    }
}

/// Tag tracking how close a state is to being proven terminal-reachable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    /// Not yet touched by the backward pass.
    None,
    /// Reachable-from-terminal only via guarded choices so far.
    Conditional,
}

/// Validate a template, returning warnings or the first hard error.
///
/// The pass short-circuits on the first error in state-iteration order;
/// warnings collected up to that point are discarded with the rejected
/// template.
pub fn validate(template: &Template) -> Result<Validation, ValidateError> {
    if !template.contains(template.start()) {
        return Err(ValidateError::MissingStart(template.start().to_string()));
    }

    // Seed the queue with terminal states; a non-terminal state with no
    // choices is already a dead end.
    let mut queue: VecDeque<&str> = VecDeque::new();
    let mut unvalidated: HashMap<&str, Tag> = HashMap::new();
    for (key, state) in template.states() {
        if state.is_terminal() {
            queue.push_back(key.as_str());
        } else if state.choices.is_empty() {
            return Err(ValidateError::NoChoice(key.clone()));
        } else {
            unvalidated.insert(key.as_str(), Tag::None);
        }
    }

    // Reverse adjacency: target -> (source, guarded edge?).
    let mut parents: HashMap<&str, Vec<(&str, bool)>> = HashMap::new();
    for (key, state) in template.states() {
        for (index, choice) in state.choices.iter().enumerate() {
            if !template.contains(&choice.next) {
                return Err(ValidateError::DanglingNext {
                    state: key.clone(),
                    choice: index,
                    next: choice.next.clone(),
                });
            }
            parents
                .entry(choice.next.as_str())
                .or_default()
                .push((key.as_str(), choice.only_if.is_some()));
        }
    }

    // Backward fixpoint. Each state is enqueued at most once, the first
    // time the pass touches it; an unguarded edge to a validated child
    // proves the parent outright, a guarded edge only upgrades its tag.
    let mut touched: HashSet<&str> = HashSet::new();
    while let Some(node) = queue.pop_front() {
        let Some(edges) = parents.get(node) else {
            continue;
        };
        for &(parent, guarded) in edges {
            if !unvalidated.contains_key(parent) {
                continue;
            }
            if touched.insert(parent) {
                queue.push_back(parent);
            }
            if guarded {
                unvalidated.insert(parent, Tag::Conditional);
            } else {
                unvalidated.remove(parent);
            }
        }
    }

    // Whatever the fixpoint could not clear is unreachable, conditionally
    // soft-locked, or hard soft-locked.
    let mut warnings = Vec::new();
    for (key, _) in template.states() {
        let Some(tag) = unvalidated.get(key.as_str()) else {
            continue;
        };
        if !parents.contains_key(key.as_str()) && key != template.start() {
            warnings.push(ValidateWarning::Unreachable(key.clone()));
            continue;
        }
        match tag {
            Tag::Conditional => warnings.push(ValidateWarning::ConditionalSoftLock(key.clone())),
            Tag::None => return Err(ValidateError::SoftLock(key.clone())),
        }
    }

    if warnings.is_empty() {
        Ok(Validation::Success)
    } else {
        Ok(Validation::Warnings(warnings))
    }
}
