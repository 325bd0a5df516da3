pub mod control;
pub mod phase;
pub mod surface;
pub mod trial;

pub use control::{ControlId, Cue, FeedbackTone};
pub use phase::TrialPhase;
pub use surface::{CueError, CuePlayer, Scheduler, SilentCues, TimerId};
pub use trial::{Outcome, PlaybackState, TrialResult, WindowState, TRIAL_TYPE};
