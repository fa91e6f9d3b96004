use serde::Serialize;

use crate::vision::RecognizedText;

/// The text that ended polling
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TriggerEvent {
    pub triggered: bool,
    pub text: RecognizedText,
}

/// Decides whether recognized text satisfies the trigger condition.
pub struct DecisionEngine;

impl DecisionEngine {
    /// Case sensitive substring test; an empty phrase matches anything.
    pub fn matches(text: &RecognizedText, target_phrase: &str) -> bool {
        text.text.contains(target_phrase)
    }

    /// `Some` when `text` triggers
    pub fn evaluate(text: RecognizedText, target_phrase: &str) -> Option<TriggerEvent> {
        Self::matches(&text, target_phrase).then_some(TriggerEvent {
            triggered: true,
            text,
        })
    }
}
