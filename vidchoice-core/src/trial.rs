use crate::control::{Cue, FeedbackTone};
use serde::{Deserialize, Serialize};

/// Tag written into every result record
pub const TRIAL_TYPE: &str = "video-button-response";

/// Playback progress as seen by the monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Loading,
    Playing,
    Completed,
}

/// Response window; `Captured` is terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowState {
    #[default]
    Closed,
    Open,
    Captured,
}

/// Correctness of a response. `Undetermined` means no expected answer was
/// configured, which is not the same as `Incorrect`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Correct,
    Incorrect,
    Undetermined,
}

impl Outcome {
    pub fn correct(&self) -> Option<bool> {
        match self {
            Outcome::Correct => Some(true),
            Outcome::Incorrect => Some(false),
            Outcome::Undetermined => None,
        }
    }

    /// Only a confirmed correct answer gets the positive treatment
    pub fn tone(&self) -> FeedbackTone {
        match self {
            Outcome::Correct => FeedbackTone::Positive,
            Outcome::Incorrect | Outcome::Undetermined => FeedbackTone::Negative,
        }
    }

    pub fn cue(&self) -> Cue {
        self.tone().into()
    }
}

/// Recorded result per trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialResult {
    pub stimulus: Vec<String>,
    pub response: usize,
    /// Milliseconds from response window opening to the response
    #[serde(rename = "rt")]
    pub reaction_time_ms: Option<f64>,
    pub correct: Option<bool>,
    pub trial_type: String,
}
