//! Conversation state for multi-turn consultations.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::catalog::SymptomId;

/// Consultation stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Fresh session, welcome message shown
    Greeting,
    /// Accepting symptom mentions
    Collecting,
    /// A diagnosis has been produced for the current symptom set
    Diagnosing,
}

/// Who produced a transcript turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One append-only transcript record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// State owned by a single consultation session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationState {
    /// Unique session ID
    pub session_id: String,
    /// Accumulated symptoms used for the next diagnosis
    pub selected_symptoms: BTreeSet<SymptomId>,
    /// Transcript, oldest first
    pub history: Vec<Turn>,
    pub stage: Stage,
    /// Start of the current consultation
    pub started_at: String,
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationState {
    /// Create a new, empty conversation.
    pub fn new() -> Self {
        Self {
            session_id: uuid::Uuid::new_v4().to_string(),
            selected_symptoms: BTreeSet::new(),
            history: Vec::new(),
            stage: Stage::Greeting,
            started_at: Utc::now().to_rfc3339(),
        }
    }

    /// Union symptoms into the selection. Returns the ones not already present.
    pub fn add_symptoms<'a, I>(&mut self, symptoms: I) -> Vec<SymptomId>
    where
        I: IntoIterator<Item = &'a SymptomId>,
    {
        symptoms
            .into_iter()
            .filter(|s| self.selected_symptoms.insert((*s).clone()))
            .cloned()
            .collect()
    }

    /// Drop a symptom from the selection. History is left alone.
    pub fn remove_symptom(&mut self, symptom: &SymptomId) -> bool {
        self.selected_symptoms.remove(symptom)
    }

    /// Append a transcript turn.
    pub fn record(&mut self, role: Role, text: impl Into<String>) {
        self.history.push(Turn {
            role,
            text: text.into(),
            timestamp: Utc::now(),
        });
    }

    /// Start over: clear symptoms and history, back to greeting.
    ///
    /// The session ID is kept; it identifies the session, not the consultation.
    pub fn reset(&mut self) {
        self.selected_symptoms.clear();
        self.history.clear();
        self.stage = Stage::Greeting;
        self.started_at = Utc::now().to_rfc3339();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_symptoms_is_set_union() {
        let mut state = ConversationState::new();
        let fever = SymptomId::new("fever");
        let cough = SymptomId::new("cough");

        let added = state.add_symptoms([&fever, &cough]);
        assert_eq!(added.len(), 2);

        let added_again = state.add_symptoms([&fever]);
        assert!(added_again.is_empty());
        assert_eq!(state.selected_symptoms.len(), 2);
    }

    #[test]
    fn test_remove_symptom_keeps_history() {
        let mut state = ConversationState::new();
        let fever = SymptomId::new("fever");
        state.add_symptoms([&fever]);
        state.record(Role::User, "fever");

        assert!(state.remove_symptom(&fever));
        assert!(!state.remove_symptom(&fever));
        assert!(state.selected_symptoms.is_empty());
        assert_eq!(state.history.len(), 1);
        assert_eq!(state.history[0].text, "fever");
    }

    #[test]
    fn test_reset_clears_everything_but_session_id() {
        let mut state = ConversationState::new();
        let session_id = state.session_id.clone();
        state.add_symptoms([&SymptomId::new("cough")]);
        state.record(Role::User, "cough");
        state.stage = Stage::Diagnosing;

        state.reset();

        assert!(state.selected_symptoms.is_empty());
        assert!(state.history.is_empty());
        assert_eq!(state.stage, Stage::Greeting);
        assert_eq!(state.session_id, session_id);
    }
}
