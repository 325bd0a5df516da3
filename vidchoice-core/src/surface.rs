//! Host capabilities that do not depend on the stimulus: one-shot timers
//! and audio cues. Timer expiries come back to the controller as events.

use crate::control::Cue;
use std::time::Duration;
use thiserror::Error;

/// Timers the controller may have pending at the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerId {
    /// Delay between first-completion and the window opening
    Grace,
    /// Feedback display duration
    Feedback,
}

/// One-shot timers delivered back as `TimerElapsed`
pub trait Scheduler {
    /// Arms `id`; re-arming replaces the earlier deadline.
    fn schedule(&mut self, id: TimerId, delay: Duration);
    fn cancel(&mut self, id: TimerId);
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CueError {
    #[error("cue {0:?} rejected by the playback environment")]
    Rejected(Cue),
    #[error("cue asset unavailable: {0}")]
    Unavailable(String),
}

pub trait CuePlayer {
    fn play(&mut self, cue: Cue) -> Result<(), CueError>;
}

/// Cue player that plays nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentCues;

impl CuePlayer for SilentCues {
    fn play(&mut self, _cue: Cue) -> Result<(), CueError> {
        Ok(())
    }
}
