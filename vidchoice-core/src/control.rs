use serde::{Deserialize, Serialize};

/// The two response controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlId {
    Left,
    Right,
}

impl ControlId {
    pub const ALL: [ControlId; 2] = [ControlId::Left, ControlId::Right];

    /// Response index recorded in the result
    pub fn index(self) -> usize {
        match self {
            ControlId::Left => 0,
            ControlId::Right => 1,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Label used when none is configured
    pub fn default_label(self) -> &'static str {
        match self {
            ControlId::Left => "left",
            ControlId::Right => "right",
        }
    }
}

/// Visual treatment applied to the clicked control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackTone {
    Positive,
    Negative,
}

/// Audio cue triggered once per response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Bleep,
    Buzz,
}

impl From<FeedbackTone> for Cue {
    fn from(tone: FeedbackTone) -> Self {
        match tone {
            FeedbackTone::Positive => Cue::Bleep,
            FeedbackTone::Negative => Cue::Buzz,
        }
    }
}
