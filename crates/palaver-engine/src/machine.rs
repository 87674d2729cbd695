//! The live dialogue cursor: one mutable machine per session.
//!
//! The machine never stores anything derivable: `visible` is recomputed
//! from the template, the cursor, and the availability cache whenever one
//! of them changes, and the cache itself holds entries only for choices
//! that declare a guard. Absent entries mean "available".

use std::collections::HashMap;
use std::sync::Arc;

use palaver_core::{DisplayPolicy, State, StateKind, Template};

use crate::error::{EngineError, EngineResult};
use crate::eval::PredicateEvaluator;
use crate::sync::AvailabilityDelta;

/// Reserved sentinel index for the synthetic escape-hatch choice.
pub const ESCAPE_CHOICE: usize = usize::MAX;

/// Default text for a grayed-out choice without an override message.
pub const LOCKED_TEXT: &str = "(not available yet)";

/// Text of the synthetic escape-hatch choice.
const ESCAPE_TEXT: &str = "(end the conversation)";

/// One entry of the player-visible choice list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleChoice {
    /// Original index into the state's choice list. [`ESCAPE_CHOICE`] marks
    /// the synthetic escape-hatch entry.
    pub index: usize,
    /// The choice text.
    pub text: String,
    /// Illustration reference ids.
    pub illustrations: Vec<String>,
    /// `Some(message)` when the choice is shown grayed out; `None` when it
    /// is selectable.
    pub locked: Option<String>,
}

/// What `choose` landed on: the driver dispatches on the kind and executes
/// the action exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// Kind of the landed state.
    pub kind: StateKind,
    /// The landed state's opaque action payload, if any.
    pub action: Option<serde_json::Value>,
}

impl Outcome {
    fn forced_end() -> Self {
        Self {
            kind: StateKind::EndDialogue,
            action: None,
        }
    }
}

/// A live cursor over an immutable dialogue template.
///
/// One instance per session. The template is shared read-only between the
/// authority and any mirrors; everything mutable here belongs to exactly
/// one owner, which must serialize all calls.
#[derive(Debug, Clone)]
pub struct DialogueMachine {
    template: Arc<Template>,
    current: String,
    /// Guard results per `(state, choice)`; tracked only for guarded
    /// choices, seeded `true` until first evaluation.
    availability: HashMap<String, HashMap<usize, bool>>,
    visible: Vec<VisibleChoice>,
}

impl DialogueMachine {
    /// Create a machine with the cursor at the template's start state.
    pub fn new(template: Arc<Template>) -> EngineResult<Self> {
        let start = template.start().to_string();
        Self::at_state(template, &start)
    }

    /// Create a machine with the cursor at an arbitrary state.
    ///
    /// This is how a mirror reconstructs a session from `(template, key)`.
    pub fn at_state(template: Arc<Template>, key: &str) -> EngineResult<Self> {
        let mut availability: HashMap<String, HashMap<usize, bool>> = HashMap::new();
        for (state_key, state) in template.states() {
            for (index, choice) in state.choices.iter().enumerate() {
                if choice.only_if.is_some() {
                    availability
                        .entry(state_key.clone())
                        .or_default()
                        .insert(index, true);
                }
            }
        }

        let mut machine = Self {
            template,
            current: String::new(),
            availability,
            visible: Vec::new(),
        };
        machine.select_state(key)?;
        Ok(machine)
    }

    /// The template this session runs over.
    pub fn template(&self) -> &Arc<Template> {
        &self.template
    }

    /// The current state key.
    pub fn current_key(&self) -> &str {
        &self.current
    }

    /// The current state.
    pub fn current_state(&self) -> EngineResult<&State> {
        self.template
            .state(&self.current)
            .ok_or_else(|| EngineError::UnknownState(self.current.clone()))
    }

    /// The current state's display text.
    pub fn current_text(&self) -> &str {
        self.template
            .state(&self.current)
            .map(|state| state.text.as_str())
            .unwrap_or_default()
    }

    /// Move the cursor to `key` and recompute the visible choices.
    ///
    /// Fails with [`EngineError::UnknownState`] if the key is not in the
    /// template; that is always a programmer or data error, never expected
    /// from untrusted input.
    pub fn select_state(&mut self, key: &str) -> EngineResult<()> {
        if !self.template.contains(key) {
            return Err(EngineError::UnknownState(key.to_string()));
        }
        self.current = key.to_string();
        self.refresh_visible();
        Ok(())
    }

    /// Whether the choice at `index` in the current state is available.
    ///
    /// Defaults to `true` for unguarded choices and guards that have never
    /// been evaluated.
    pub fn is_available(&self, index: usize) -> bool {
        self.availability
            .get(self.current.as_str())
            .and_then(|entries| entries.get(&index))
            .copied()
            .unwrap_or(true)
    }

    /// The player-visible choice list for the current state.
    ///
    /// A pure projection of `(current state, availability)`: available
    /// choices appear plain, grayed-out ones carry their lock message, and
    /// hidden ones are omitted. When every real choice drops out, the list
    /// holds exactly one synthetic escape-hatch entry instead.
    pub fn visible_choices(&self) -> &[VisibleChoice] {
        &self.visible
    }

    /// Select the choice at `index` and advance to its target state.
    ///
    /// Returns the landed state's kind and action for the driver. An
    /// out-of-range or unavailable index fails with
    /// [`EngineError::InvalidChoice`], which hosts must treat as
    /// recoverable. Passing [`ESCAPE_CHOICE`] while every real choice is
    /// unavailable forces an end-of-dialogue outcome without moving the
    /// cursor, so a state whose guards all evaluated false can never strand
    /// the session.
    pub fn choose(&mut self, index: usize) -> EngineResult<Outcome> {
        let state = self.current_state()?;

        if index == ESCAPE_CHOICE && !state.choices.is_empty() && self.none_available(state) {
            log::warn!(
                "every choice in state \"{}\" is unavailable; forcing end of dialogue",
                self.current
            );
            return Ok(Outcome::forced_end());
        }

        if index >= state.choices.len() || !self.is_available(index) {
            return Err(EngineError::InvalidChoice(index));
        }

        let next = state.choices[index].next.clone();
        self.select_state(&next)?;

        let landed = self.current_state()?;
        Ok(Outcome {
            kind: landed.kind,
            action: landed.action.clone(),
        })
    }

    /// Re-evaluate every tracked guard and return the minimal delta.
    ///
    /// Authoritative side only. All predicates are evaluated before
    /// anything is applied, so a [`PredicateError`] leaves the previous
    /// snapshot fully intact. Calling twice with unchanged context yields
    /// an empty delta the second time.
    ///
    /// [`PredicateError`]: crate::eval::PredicateError
    pub fn update_conditions(
        &mut self,
        evaluator: &dyn PredicateEvaluator,
    ) -> EngineResult<AvailabilityDelta> {
        let mut changed: Vec<(String, usize, bool)> = Vec::new();
        for (state_key, entries) in &self.availability {
            let Some(state) = self.template.state(state_key) else {
                continue;
            };
            for (&index, &cached) in entries {
                let Some(condition) = state.choices.get(index).and_then(|c| c.only_if.as_ref())
                else {
                    continue;
                };
                let value = evaluator.evaluate(&condition.predicate)?;
                if value != cached {
                    changed.push((state_key.clone(), index, value));
                }
            }
        }

        let mut delta = AvailabilityDelta::new();
        let mut touched_current = false;
        for (state_key, index, value) in changed {
            touched_current |= state_key == self.current;
            if let Some(entries) = self.availability.get_mut(&state_key) {
                entries.insert(index, value);
            }
            delta.insert(state_key, index, value);
        }

        if touched_current {
            self.refresh_visible();
        }
        Ok(delta)
    }

    /// Merge an availability delta from the authority.
    ///
    /// Mirror side only. Recomputes the visible choices when the delta
    /// touches the current state.
    pub fn apply_availability_update(&mut self, delta: &AvailabilityDelta) {
        for (state_key, entries) in delta.iter() {
            let slot = self.availability.entry(state_key.clone()).or_default();
            for (&index, &value) in entries {
                slot.insert(index, value);
            }
        }
        if delta.touches(&self.current) {
            self.refresh_visible();
        }
    }

    /// Full snapshot of every tracked guard value, for session open.
    pub fn availability_snapshot(&self) -> AvailabilityDelta {
        let mut snapshot = AvailabilityDelta::new();
        for (state_key, entries) in &self.availability {
            for (&index, &value) in entries {
                snapshot.insert(state_key.clone(), index, value);
            }
        }
        snapshot
    }

    fn none_available(&self, state: &State) -> bool {
        (0..state.choices.len()).all(|index| !self.is_available(index))
    }

    fn refresh_visible(&mut self) {
        let Some(state) = self.template.state(&self.current) else {
            self.visible.clear();
            return;
        };

        let mut visible = Vec::new();
        for (index, choice) in state.choices.iter().enumerate() {
            match &choice.only_if {
                Some(condition) if !self.is_available(index) => {
                    match condition.when_unavailable.display {
                        DisplayPolicy::Hidden => {}
                        DisplayPolicy::GrayedOut => visible.push(VisibleChoice {
                            index,
                            text: choice.text.clone(),
                            illustrations: choice.illustrations.clone(),
                            locked: Some(
                                condition
                                    .when_unavailable
                                    .message
                                    .clone()
                                    .unwrap_or_else(|| LOCKED_TEXT.to_string()),
                            ),
                        }),
                    }
                }
                _ => visible.push(VisibleChoice {
                    index,
                    text: choice.text.clone(),
                    illustrations: choice.illustrations.clone(),
                    locked: None,
                }),
            }
        }

        if visible.is_empty() && !state.choices.is_empty() {
            log::warn!(
                "every choice in state \"{}\" is hidden or unavailable; showing escape hatch",
                self.current
            );
            visible.push(VisibleChoice {
                index: ESCAPE_CHOICE,
                text: ESCAPE_TEXT.to_string(),
                illustrations: Vec::new(),
                locked: None,
            });
        }

        self.visible = visible;
    }
}
