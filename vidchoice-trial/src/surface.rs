//! The view a trial renders into.
//!
//! The host owns the view and the event loop. It renders what the controller
//! asks for, flips control state, and forwards media events, clicks and timer
//! expiries back to the controller as `TrialEvent`s. Releasing its listeners
//! and pending work happens in `teardown`.

use vidchoice_core::{ControlId, FeedbackTone};
use vidchoice_media::ResolvedStimulus;

/// Everything a surface needs to lay out one trial
#[derive(Debug, Clone)]
pub struct TrialLayout {
    pub stimulus: ResolvedStimulus,
    pub labels: [String; 2],
    pub prompt: Option<String>,
    pub width: u32,
    pub height: u32,
    pub autoplay: bool,
    pub loop_playback: bool,
    pub controls: bool,
}

impl TrialLayout {
    pub fn label(&self, control: ControlId) -> &str {
        &self.labels[control.index()]
    }
}

pub trait TrialSurface {
    /// Lay out the stimulus and both controls
    fn render(&mut self, layout: &TrialLayout);

    fn set_control_enabled(&mut self, control: ControlId, enabled: bool);

    /// Sets both controls within the same turn.
    fn set_controls_enabled(&mut self, enabled: bool) {
        for control in ControlId::ALL {
            self.set_control_enabled(control, enabled);
        }
    }

    fn show_feedback(&mut self, control: ControlId, tone: FeedbackTone);

    /// Clear the view and drop every listener. Called at most once per trial.
    fn teardown(&mut self);
}
