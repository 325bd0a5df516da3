/// Trial controller states, in the order a trial moves through them
#[derive(Copy, Debug, Clone, PartialEq, Eq)]
pub enum TrialPhase {
    Initializing,
    AwaitingCompletion,
    ResponseOpen,
    Captured,
    Feedback,
    Done,
}

impl Default for TrialPhase {
    fn default() -> Self {
        TrialPhase::Initializing
    }
}

impl TrialPhase {
    /// Only an open response window accepts input
    pub fn allows_input(&self) -> bool {
        matches!(self, Self::ResponseOpen)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// True while playback events still matter to the trial
    pub fn is_running(&self) -> bool {
        !matches!(self, Self::Initializing | Self::Done)
    }
}
