use std::time::Duration;
use vidchoice_core::{ControlId, Outcome, TimerId};

/// Everything the host forwards into a running trial
#[derive(Debug, Clone, PartialEq)]
pub enum TrialEvent {
    /// Media metadata arrived; `None` when the format reports no duration
    MetadataLoaded { duration: Option<f64> },
    /// Playback position in seconds
    TimeUpdate { position: f64 },
    Ended,
    Response(ControlId),
    TimerElapsed(TimerId),
}

/// The accepted response, held until the result record is built
#[derive(Debug, Clone, PartialEq)]
pub struct Capture {
    pub control: ControlId,
    pub reaction_time: Option<Duration>,
    pub outcome: Outcome,
}
