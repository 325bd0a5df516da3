use crate::surface::TrialSurface;
use std::time::Duration;
use tracing::{debug, warn};
use vidchoice_core::{ControlId, CuePlayer, Outcome, Scheduler, TimerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Idle,
    Showing,
    Ready,
}

/// Shows the outcome on the clicked control, plays one cue, and reports ready
/// once the feedback timer fires.
#[derive(Debug)]
pub struct FeedbackPresenter {
    duration: Duration,
    stage: Stage,
}

impl FeedbackPresenter {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            stage: Stage::Idle,
        }
    }

    /// Applies the treatment and arms the feedback timer. A failing cue is
    /// logged and otherwise ignored.
    pub fn present<V, A>(&mut self, control: ControlId, outcome: Outcome, surface: &mut V, cues: &mut A) -> bool
    where
        V: TrialSurface + Scheduler + ?Sized,
        A: CuePlayer + ?Sized,
    {
        if self.stage != Stage::Idle {
            return false;
        }
        let tone = outcome.tone();
        surface.show_feedback(control, tone);
        if let Err(e) = cues.play(outcome.cue()) {
            warn!(error = %e, "feedback cue failed");
        }
        surface.schedule(TimerId::Feedback, self.duration);
        self.stage = Stage::Showing;
        debug!(?control, ?tone, "feedback shown for {:?}", self.duration);
        true
    }

    /// Returns true when `id` is the feedback timer ending the display
    pub fn on_timer(&mut self, id: TimerId) -> bool {
        if id != TimerId::Feedback || self.stage != Stage::Showing {
            return false;
        }
        self.stage = Stage::Ready;
        true
    }

    pub fn cancel<K: Scheduler + ?Sized>(&mut self, scheduler: &mut K) {
        if self.stage == Stage::Showing {
            scheduler.cancel(TimerId::Feedback);
            self.stage = Stage::Idle;
        }
    }
}
