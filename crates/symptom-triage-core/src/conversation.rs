//! Multi-turn consultation.
//!
//! ```text
//!   Greeting ──submit──► Collecting ──request_diagnosis──► Diagnosing
//!      ▲                    ▲    │                             │
//!      │                    │    └──── remove / submit ◄───────┘
//!      └─────────── reset (clears symptoms and history) ───────┘
//! ```
//!
//! Symptoms accumulate by set union. Diagnosis never clears them, so a user
//! can keep adding symptoms and diagnose again. Failures leave symptoms and
//! history untouched.

use std::sync::Arc;

use tracing::{debug, info};

use crate::matcher::split_symptom_list;
use crate::models::{
    ConversationState, DiagnosisResult, MatchOutcome, Role, Stage, SymptomId, SymptomInput,
};
use crate::pipeline::{DiagnosisError, TriagePipeline};

/// One user's consultation over a shared pipeline.
pub struct Consultation {
    pipeline: Arc<TriagePipeline>,
    state: ConversationState,
}

impl Consultation {
    /// Start a consultation in the greeting stage.
    pub fn new(pipeline: Arc<TriagePipeline>) -> Self {
        Self {
            pipeline,
            state: ConversationState::new(),
        }
    }

    /// The fixed welcome message.
    pub fn welcome(&self) -> &str {
        &self.pipeline.settings().welcome_message
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn stage(&self) -> Stage {
        self.state.stage
    }

    pub fn pipeline(&self) -> &TriagePipeline {
        &self.pipeline
    }

    /// Accumulated symptoms, in catalog order.
    pub fn selected_symptoms(&self) -> Vec<SymptomId> {
        self.pipeline
            .catalog()
            .iter()
            .filter(|id| self.state.selected_symptoms.contains(*id))
            .cloned()
            .collect()
    }

    /// Match a submission and add what was recognized.
    ///
    /// Blank input is ignored: no turn is recorded and the stage is kept.
    pub fn submit(&mut self, input: SymptomInput) -> MatchOutcome {
        if input.is_blank() {
            debug!(session = %self.state.session_id, "blank submission ignored");
            return MatchOutcome::default();
        }

        self.state.record(Role::User, input.transcript_text());

        let outcome = self.pipeline.match_input(&input);
        let added = self.state.add_symptoms(&outcome.recognized);
        self.state.stage = Stage::Collecting;

        info!(
            session = %self.state.session_id,
            added = added.len(),
            total = self.state.selected_symptoms.len(),
            unmatched = outcome.unmatched.len(),
            "symptoms submitted"
        );

        self.state
            .record(Role::Assistant, describe_outcome(&outcome, self.state.selected_symptoms.len()));
        outcome
    }

    /// Free-text submission.
    pub fn submit_text(&mut self, text: &str) -> MatchOutcome {
        self.submit(SymptomInput::Text(text.to_string()))
    }

    /// Comma-separated list submission.
    pub fn submit_list(&mut self, text: &str) -> MatchOutcome {
        self.submit(SymptomInput::List(split_symptom_list(text)))
    }

    /// Diagnose the accumulated symptoms.
    pub fn request_diagnosis(&mut self) -> Result<DiagnosisResult, DiagnosisError> {
        self.state.record(Role::User, "Get diagnosis");

        match self.pipeline.diagnose(&self.state.selected_symptoms) {
            Ok(result) => {
                self.state.stage = Stage::Diagnosing;
                self.state.record(Role::Assistant, describe_diagnosis(&result));
                Ok(result)
            }
            Err(e) => {
                self.state.record(Role::Assistant, describe_error(&e));
                Err(e)
            }
        }
    }

    /// Remove one accumulated symptom. Returns whether it was present.
    pub fn remove_symptom(&mut self, symptom: &str) -> bool {
        let removed = match self.pipeline.catalog().lookup(symptom) {
            Some(id) => self.state.remove_symptom(id),
            None => false,
        };
        if removed && self.state.stage == Stage::Diagnosing {
            self.state.stage = Stage::Collecting;
        }
        removed
    }

    /// Start a new consultation in the same session.
    pub fn reset(&mut self) -> &str {
        info!(session = %self.state.session_id, "consultation reset");
        self.state.reset();
        self.welcome()
    }
}

fn describe_outcome(outcome: &MatchOutcome, total: usize) -> String {
    let mut parts = Vec::new();

    if outcome.recognized.is_empty() {
        parts.push("I couldn't recognize any symptoms in that.".to_string());
    } else {
        let names: Vec<&str> = outcome.recognized.iter().map(|s| s.as_str()).collect();
        parts.push(format!("Recognized: {}.", names.join(", ")));
    }

    for unmatched in &outcome.unmatched {
        match &unmatched.suggestion {
            Some(s) => parts.push(format!(
                "'{}' is not a known symptom (did you mean '{}'?).",
                unmatched.token, s
            )),
            None => parts.push(format!("'{}' is not a known symptom.", unmatched.token)),
        }
    }

    parts.push(format!("{} symptom(s) noted so far.", total));
    parts.join(" ")
}

fn describe_diagnosis(result: &DiagnosisResult) -> String {
    let mut text = format!(
        "Based on your symptoms, you may have: {} ({} confidence, severity {}). {} {}",
        result.disease,
        result.confidence_display(),
        result.severity,
        result.urgency,
        result.action
    );
    let others: Vec<String> = result
        .other_candidates()
        .iter()
        .take(2)
        .map(|c| format!("{} ({:.1}%)", c.label, c.probability * 100.0))
        .collect();
    if !others.is_empty() {
        text.push_str(&format!(" Other possibilities: {}.", others.join(", ")));
    }
    if result.needs_more_info {
        text.push_str(" I'm not very confident; adding more symptoms would help.");
    }
    text
}

fn describe_error(error: &DiagnosisError) -> String {
    match error {
        DiagnosisError::InsufficientInput => {
            "Please enter at least one symptom before asking for a diagnosis.".to_string()
        }
        DiagnosisError::ModelUnavailable(_) => {
            "Diagnosis is unavailable right now. Please try again later.".to_string()
        }
        DiagnosisError::Encoding(_) => {
            "The symptom list and model are out of sync; the service needs reconfiguring."
                .to_string()
        }
    }
}
