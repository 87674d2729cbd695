//! Wire messages carrying availability changes between host and mirrors.
//!
//! The authoritative machine owns guard evaluation; mirrors only ever learn
//! about availability through a full snapshot at session open and minimal
//! deltas afterwards. Selections flow the other way and are validated on
//! the host, which answers a bad one with a resync instead of an error.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use palaver_core::Template;

use crate::error::{EngineError, EngineResult};
use crate::machine::{DialogueMachine, Outcome};

/// A minimal set of `(state, choice) -> bool` availability changes.
///
/// Sorted maps keep the serialized form deterministic. The same type
/// doubles as the full snapshot carried by [`SyncMessage::Open`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AvailabilityDelta(BTreeMap<String, BTreeMap<usize, bool>>);

impl AvailabilityDelta {
    /// Create an empty delta.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an availability value for a choice.
    pub fn insert(&mut self, state: impl Into<String>, choice: usize, available: bool) {
        self.0.entry(state.into()).or_default().insert(choice, available);
    }

    /// Look up the recorded value for a choice, if any.
    pub fn get(&self, state: &str, choice: usize) -> Option<bool> {
        self.0.get(state).and_then(|entries| entries.get(&choice)).copied()
    }

    /// Whether the delta carries no changes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of `(state, choice)` entries carried.
    pub fn len(&self) -> usize {
        self.0.values().map(BTreeMap::len).sum()
    }

    /// Whether the delta touches the given state.
    pub fn touches(&self, state: &str) -> bool {
        self.0.contains_key(state)
    }

    /// Iterate over `(state, entries)` pairs in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeMap<usize, bool>)> {
        self.0.iter()
    }
}

/// A message exchanged between the authoritative machine and a mirror.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SyncMessage {
    /// Host → mirror at session open: the template, the current state, and
    /// a full snapshot of every tracked guard's value.
    Open {
        /// The dialogue template the session runs over.
        template: Template,
        /// The current state key.
        state: String,
        /// Full availability snapshot for all guarded choices.
        availability: AvailabilityDelta,
    },
    /// Mirror → host: the player picked a choice by visible index.
    ChoiceSelection {
        /// Index into the current state's choice list.
        index: usize,
    },
    /// Host → mirror: guard values that changed since the last message.
    AvailabilityDelta {
        /// The changed entries only.
        changes: AvailabilityDelta,
    },
    /// Host → mirror: the mirror's selection was rejected; snap back to
    /// this state.
    StateResync {
        /// The authoritative current state key.
        state: String,
    },
}

/// Result of handling a mirror's choice selection on the host.
#[derive(Debug)]
pub enum SelectionOutcome {
    /// The selection was valid; the machine advanced.
    Accepted(Outcome),
    /// The selection was stale or out of range; send this resync to the
    /// mirror. The machine did not move.
    Resync(SyncMessage),
}

/// Apply a mirror's selection to the authoritative machine.
///
/// An invalid choice here is an expected condition (the mirror may not have
/// seen the latest delta yet), so it is converted into a
/// [`SyncMessage::StateResync`] rather than propagated. Anything else is a
/// real fault and bubbles up.
pub fn handle_selection(
    machine: &mut DialogueMachine,
    index: usize,
) -> EngineResult<SelectionOutcome> {
    match machine.choose(index) {
        Ok(outcome) => Ok(SelectionOutcome::Accepted(outcome)),
        Err(EngineError::InvalidChoice(rejected)) => {
            log::warn!(
                "rejected choice {rejected} in state \"{}\"; resyncing mirror",
                machine.current_key()
            );
            Ok(SelectionOutcome::Resync(SyncMessage::StateResync {
                state: machine.current_key().to_string(),
            }))
        }
        Err(other) => Err(other),
    }
}

impl DialogueMachine {
    /// Build the session-open message for a new mirror.
    pub fn open_message(&self) -> SyncMessage {
        SyncMessage::Open {
            template: self.template().as_ref().clone(),
            state: self.current_key().to_string(),
            availability: self.availability_snapshot(),
        }
    }

    /// Reconstruct a mirror machine from the parts of an open message.
    pub fn from_open(
        template: Template,
        state: &str,
        availability: &AvailabilityDelta,
    ) -> EngineResult<Self> {
        let mut machine = Self::at_state(std::sync::Arc::new(template), state)?;
        machine.apply_availability_update(availability);
        Ok(machine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palaver_core::{Choice, State, StateKind};
    use std::sync::Arc;

    fn host() -> DialogueMachine {
        let template = Arc::new(
            Template::new("a")
                .with_state(
                    "a",
                    State::new("hi")
                        .with_choice(Choice::new("on", "b"))
                        .with_choice(Choice::new("bye", "end")),
                )
                .with_state("b", State::new("there").with_choice(Choice::new("bye", "end")))
                .with_state("end", State::end("done")),
        );
        DialogueMachine::new(template).unwrap()
    }

    #[test]
    fn valid_selection_is_accepted() {
        let mut machine = host();
        let outcome = handle_selection(&mut machine, 0).unwrap();
        let SelectionOutcome::Accepted(outcome) = outcome else {
            panic!("expected acceptance, got {outcome:?}");
        };
        assert_eq!(outcome.kind, StateKind::Default);
        assert_eq!(machine.current_key(), "b");
    }

    #[test]
    fn stale_selection_becomes_a_resync() {
        let mut machine = host();
        let outcome = handle_selection(&mut machine, 7).unwrap();
        let SelectionOutcome::Resync(message) = outcome else {
            panic!("expected resync, got {outcome:?}");
        };
        assert_eq!(
            message,
            SyncMessage::StateResync {
                state: "a".to_string()
            }
        );
        // The machine did not move.
        assert_eq!(machine.current_key(), "a");
    }

    #[test]
    fn delta_records_and_reports() {
        let mut delta = AvailabilityDelta::new();
        assert!(delta.is_empty());

        delta.insert("gate", 1, false);
        delta.insert("gate", 2, true);
        delta.insert("cellar", 0, false);

        assert!(!delta.is_empty());
        assert_eq!(delta.len(), 3);
        assert_eq!(delta.get("gate", 1), Some(false));
        assert_eq!(delta.get("gate", 0), None);
        assert!(delta.touches("cellar"));
        assert!(!delta.touches("attic"));
    }

    #[test]
    fn delta_serializes_deterministically() {
        let mut delta = AvailabilityDelta::new();
        delta.insert("gate", 1, false);
        delta.insert("cellar", 0, true);

        let json = serde_json::to_string(&delta).unwrap();
        assert_eq!(json, r#"{"cellar":{"0":true},"gate":{"1":false}}"#);
        let back: AvailabilityDelta = serde_json::from_str(&json).unwrap();
        assert_eq!(back, delta);
    }

    #[test]
    fn messages_round_trip_with_type_tag() {
        let message = SyncMessage::ChoiceSelection { index: 2 };
        let json = serde_json::to_string(&message).unwrap();
        assert!(json.contains(r#""type":"ChoiceSelection""#));
        let back: SyncMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, message);

        let message = SyncMessage::StateResync {
            state: "gate".to_string(),
        };
        let back: SyncMessage =
            serde_json::from_str(&serde_json::to_string(&message).unwrap()).unwrap();
        assert_eq!(back, message);
    }
}
