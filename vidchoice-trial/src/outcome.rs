use vidchoice_core::{ControlId, Outcome};

/// Scores a response against the configured expected answer
#[derive(Debug, Clone, Default)]
pub struct OutcomeEvaluator {
    expected: Option<String>,
}

impl OutcomeEvaluator {
    pub fn new(expected: Option<String>) -> Self {
        Self { expected }
    }

    pub fn has_ground_truth(&self) -> bool {
        self.expected.is_some()
    }

    pub fn evaluate(&self, response: ControlId, labels: &[String; 2]) -> Outcome {
        match &self.expected {
            None => Outcome::Undetermined,
            Some(expected) if *expected == labels[response.index()] => Outcome::Correct,
            Some(_) => Outcome::Incorrect,
        }
    }
}
