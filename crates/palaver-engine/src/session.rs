//! Persisted session state: what survives a save/load cycle.
//!
//! Only the cursor is worth persisting; availability is re-derived by the
//! next `update_conditions` pass and the template itself is loaded from its
//! own document.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use palaver_core::Template;

use crate::error::EngineResult;
use crate::machine::DialogueMachine;

/// A saved dialogue session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Id of the dialogue/template this session belongs to.
    pub dialogue: String,
    /// The state key the cursor was on when saved.
    pub state: String,
    /// Optional collaborator reference, e.g. the interlocutor entity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interlocutor: Option<String>,
}

impl SessionRecord {
    /// Capture the current cursor of a machine.
    pub fn capture(dialogue: impl Into<String>, machine: &DialogueMachine) -> Self {
        Self {
            dialogue: dialogue.into(),
            state: machine.current_key().to_string(),
            interlocutor: None,
        }
    }

    /// Attach a collaborator reference.
    pub fn with_interlocutor(mut self, interlocutor: impl Into<String>) -> Self {
        self.interlocutor = Some(interlocutor.into());
        self
    }

    /// Rebuild a machine from this record against the live template.
    ///
    /// If the saved state no longer exists (the template changed between
    /// save and resume), the record is discarded with a warning and the
    /// session restarts from the template's start state.
    pub fn resume(&self, template: Arc<Template>) -> EngineResult<DialogueMachine> {
        if template.contains(&self.state) {
            DialogueMachine::at_state(template, &self.state)
        } else {
            log::warn!(
                "saved state \"{}\" no longer exists in dialogue \"{}\"; restarting from \"{}\"",
                self.state,
                self.dialogue,
                template.start()
            );
            DialogueMachine::new(template)
        }
    }
}
