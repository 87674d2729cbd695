//! Choice edges and the conditions that guard them.

use serde::{Deserialize, Serialize};

/// A single choice in a state: one directed edge of the dialogue graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    /// The text shown to the player.
    pub text: String,
    /// Illustration reference ids displayed alongside the text.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub illustrations: Vec<String>,
    /// The state this choice leads to. Must resolve within the same template.
    pub next: String,
    /// Guard condition; a choice without one is always available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub only_if: Option<Condition>,
}

impl Choice {
    /// Create an unguarded choice leading to `next`.
    pub fn new(text: impl Into<String>, next: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            illustrations: Vec::new(),
            next: next.into(),
            only_if: None,
        }
    }

    /// Add an illustration reference.
    pub fn with_illustration(mut self, id: impl Into<String>) -> Self {
        self.illustrations.push(id.into());
        self
    }

    /// Guard this choice with a condition.
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.only_if = Some(condition);
        self
    }
}

/// A guard on a choice: an opaque predicate id resolved by an external
/// evaluator, plus the display policy for when the predicate is false.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Predicate id. The engine never interprets this; it hands it to a
    /// pluggable evaluator.
    pub predicate: String,
    /// How to present the choice while the predicate is false.
    #[serde(default)]
    pub when_unavailable: UnavailableDisplay,
}

impl Condition {
    /// Create a condition on the given predicate, grayed out when false.
    pub fn new(predicate: impl Into<String>) -> Self {
        Self {
            predicate: predicate.into(),
            when_unavailable: UnavailableDisplay::default(),
        }
    }

    /// Hide the choice entirely while unavailable.
    pub fn hidden(mut self) -> Self {
        self.when_unavailable.display = DisplayPolicy::Hidden;
        self
    }

    /// Override the text shown on the grayed-out entry.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.when_unavailable.message = Some(message.into());
        self
    }
}

/// Presentation of a choice whose guard is currently false.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UnavailableDisplay {
    /// Whether the choice is shown grayed out or hidden.
    #[serde(default)]
    pub display: DisplayPolicy,
    /// Override for the locked-choice text; `None` uses the engine default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Display policy for unavailable choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayPolicy {
    /// Show the choice but mark it as locked.
    #[default]
    GrayedOut,
    /// Omit the choice from the visible list entirely.
    Hidden,
}
