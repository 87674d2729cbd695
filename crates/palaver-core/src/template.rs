//! The dialogue template graph: named states with guarded outgoing choices.
//!
//! A [`Template`] is loaded once and never mutated afterwards. Sessions and
//! mirrors share it read-only; all mutable cursor state lives in the engine.

use std::collections::BTreeMap;
use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::choice::Choice;
use crate::error::{CoreError, CoreResult};

/// An immutable branching-dialogue graph.
///
/// States are keyed by string ids; `start` names the entry state. The state
/// map is sorted by key, which fixes the iteration order used for validator
/// diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    #[serde(rename = "start_at")]
    start: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    unskippable: bool,
    states: BTreeMap<String, State>,
}

impl Template {
    /// Create an empty template starting at `start`.
    ///
    /// An empty template never passes validation; add states with
    /// [`Template::with_state`] before handing it to a session.
    pub fn new(start: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            unskippable: false,
            states: BTreeMap::new(),
        }
    }

    /// Add a state under the given key, replacing any previous entry.
    pub fn with_state(mut self, key: impl Into<String>, state: State) -> Self {
        self.states.insert(key.into(), state);
        self
    }

    /// Mark the dialogue as unskippable for the driver.
    pub fn with_unskippable(mut self, unskippable: bool) -> Self {
        self.unskippable = unskippable;
        self
    }

    /// Parse a template from a JSON document.
    pub fn from_json(document: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(document)?)
    }

    /// Parse a template from a reader of a JSON document.
    pub fn from_reader(reader: impl Read) -> CoreResult<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// The id of the entry state.
    pub fn start(&self) -> &str {
        &self.start
    }

    /// Whether the driver must prevent skipping this dialogue.
    pub fn unskippable(&self) -> bool {
        self.unskippable
    }

    /// Look up a state by id.
    pub fn state(&self, key: &str) -> Option<&State> {
        self.states.get(key)
    }

    /// Whether a state with the given id exists.
    pub fn contains(&self, key: &str) -> bool {
        self.states.contains_key(key)
    }

    /// Number of states in the graph.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether the template has no states.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Iterate over `(key, state)` pairs in sorted key order.
    pub fn states(&self) -> impl Iterator<Item = (&String, &State)> {
        self.states.iter()
    }

    /// Resolve a choice's `next` id to its state.
    ///
    /// Fails with [`CoreError::UnknownState`]; on a validated template this
    /// is an internal consistency error, not an expected runtime condition.
    pub fn resolve(&self, next: &str) -> CoreResult<&State> {
        self.states
            .get(next)
            .ok_or_else(|| CoreError::UnknownState(next.to_string()))
    }

    /// Resolve the entry state.
    pub fn start_state(&self) -> CoreResult<&State> {
        self.resolve(&self.start)
    }
}

/// One dialogue-graph node: display text plus ordered outgoing choices.
///
/// Choice order is the player-visible order and determines index-based
/// addressing everywhere in the engine and on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// The text displayed when this state is entered.
    #[serde(default)]
    pub text: String,
    /// Illustration reference ids for the presentation layer.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub illustrations: Vec<String>,
    /// Outgoing choices, in player-visible order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
    /// Opaque action payload, executed once by the driver on entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<serde_json::Value>,
    /// How the driver interprets this state.
    #[serde(rename = "type", default, skip_serializing_if = "StateKind::is_default")]
    pub kind: StateKind,
}

impl State {
    /// Create a default-kind state with the given text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            illustrations: Vec::new(),
            choices: Vec::new(),
            action: None,
            kind: StateKind::Default,
        }
    }

    /// Create a terminal state that ends the dialogue.
    pub fn end(text: impl Into<String>) -> Self {
        Self {
            kind: StateKind::EndDialogue,
            ..Self::new(text)
        }
    }

    /// Add a choice.
    pub fn with_choice(mut self, choice: Choice) -> Self {
        self.choices.push(choice);
        self
    }

    /// Add an illustration reference.
    pub fn with_illustration(mut self, id: impl Into<String>) -> Self {
        self.illustrations.push(id.into());
        self
    }

    /// Attach an opaque action payload.
    pub fn with_action(mut self, action: serde_json::Value) -> Self {
        self.action = Some(action);
        self
    }

    /// Set the state kind.
    pub fn with_kind(mut self, kind: StateKind) -> Self {
        self.kind = kind;
        self
    }

    /// Whether this state terminates the dialogue.
    pub fn is_terminal(&self) -> bool {
        self.kind == StateKind::EndDialogue
    }
}

/// How the driver interprets a state. A closed set, matched exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StateKind {
    /// Normal state: further navigation and illustrations allowed.
    #[default]
    Default,
    /// Terminal state: the session ends on entry.
    EndDialogue,
    /// The driver must present the choices as a yes/no confirmation.
    AskConfirmation,
}

impl StateKind {
    fn is_default(&self) -> bool {
        *self == StateKind::Default
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::choice::Condition;

    fn two_state_template() -> Template {
        Template::new("greeting")
            .with_state(
                "greeting",
                State::new("Well met, stranger.")
                    .with_choice(Choice::new("Farewell.", "farewell"))
                    .with_choice(
                        Choice::new("About that key...", "key_talk")
                            .with_condition(Condition::new("has_gate_key")),
                    ),
            )
            .with_state("key_talk", State::new("Ah, you found it!").with_choice(Choice::new("Goodbye.", "farewell")))
            .with_state("farewell", State::end("Safe travels."))
    }

    #[test]
    fn resolve_known_and_unknown() {
        let template = two_state_template();
        assert!(template.resolve("farewell").is_ok());
        let err = template.resolve("nowhere").unwrap_err();
        assert!(matches!(err, CoreError::UnknownState(id) if id == "nowhere"));
    }

    #[test]
    fn start_state_resolves() {
        let template = two_state_template();
        assert_eq!(template.start(), "greeting");
        assert_eq!(template.start_state().unwrap().choices.len(), 2);
    }

    #[test]
    fn parses_document_format() {
        let template = Template::from_json(
            r#"{
                "start_at": "a",
                "states": {
                    "a": {
                        "text": "hi",
                        "choices": [
                            { "text": "bye", "next": "b",
                              "only_if": { "predicate": "polite",
                                           "when_unavailable": { "display": "hidden" } } }
                        ]
                    },
                    "b": { "type": "END_DIALOGUE" }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(template.start(), "a");
        assert!(!template.unskippable());
        let a = template.state("a").unwrap();
        assert_eq!(a.kind, StateKind::Default);
        assert_eq!(a.choices[0].only_if.as_ref().unwrap().predicate, "polite");
        assert!(template.state("b").unwrap().is_terminal());
    }

    #[test]
    fn rejects_malformed_document() {
        let err = Template::from_json("{ not json").unwrap_err();
        assert!(matches!(err, CoreError::Parse(_)));
    }

    #[test]
    fn serialization_round_trips() {
        let template = two_state_template().with_unskippable(true);
        let json = serde_json::to_string(&template).unwrap();
        let back = Template::from_json(&json).unwrap();
        assert_eq!(back, template);
        assert!(back.unskippable());
    }

    #[test]
    fn states_iterate_in_sorted_order() {
        let template = two_state_template();
        let keys: Vec<&str> = template.states().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["farewell", "greeting", "key_talk"]);
    }
}
