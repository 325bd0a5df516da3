use crate::config::TrialConfig;
use crate::error::TrialError;
use crate::feedback::FeedbackPresenter;
use crate::gate::ResponseGate;
use crate::outcome::OutcomeEvaluator;
use crate::playback::{CompletionSource, PlaybackMonitor};
use crate::surface::TrialSurface;
use crate::trial::{Capture, TrialEvent};
use tracing::{debug, info};
use vidchoice_core::{
    ControlId, CuePlayer, PlaybackState, Scheduler, TimerId, TrialPhase, TrialResult,
    WindowState, TRIAL_TYPE,
};
use vidchoice_media::SourceResolver;
use vidchoice_timing::{ReactionClock, Timer};

/// Receives the result record exactly once
pub type FinishCallback = Box<dyn FnOnce(TrialResult)>;

/// Runs one trial from stimulus loading to the result record.
///
/// All transitions happen inside `handle_event`, one event at a time. Events
/// that do not fit the current phase are dropped without changing state.
pub struct TrialController<T, V, A>
where
    T: Timer,
    V: TrialSurface + Scheduler,
    A: CuePlayer,
{
    config: TrialConfig,
    labels: [String; 2],
    phase: TrialPhase,
    surface: V,
    cues: A,
    monitor: PlaybackMonitor,
    gate: ResponseGate,
    clock: ReactionClock<T>,
    evaluator: OutcomeEvaluator,
    feedback: FeedbackPresenter,
    capture: Option<Capture>,
    grace_pending: bool,
    on_finish: Option<FinishCallback>,
    released: bool,
}

impl<T, V, A> TrialController<T, V, A>
where
    T: Timer,
    V: TrialSurface + Scheduler,
    A: CuePlayer,
{
    /// Validates the configuration; nothing is rendered yet.
    pub fn new(config: TrialConfig, timer: T, surface: V, cues: A) -> Result<Self, TrialError> {
        config.validate()?;
        Ok(Self {
            labels: config.labels(),
            phase: TrialPhase::Initializing,
            surface,
            cues,
            monitor: PlaybackMonitor::new(config.completion_threshold_s),
            gate: ResponseGate::new(),
            clock: ReactionClock::new(timer),
            evaluator: OutcomeEvaluator::new(config.expected_answer.clone()),
            feedback: FeedbackPresenter::new(config.feedback_duration()),
            capture: None,
            grace_pending: false,
            on_finish: None,
            released: false,
            config,
        })
    }

    /// Resolves the stimulus, renders it with both controls disabled and
    /// starts waiting for playback to complete.
    pub fn start<R, F>(&mut self, resolver: &R, on_finish: F) -> Result<(), TrialError>
    where
        R: SourceResolver + ?Sized,
        F: FnOnce(TrialResult) + 'static,
    {
        if self.phase != TrialPhase::Initializing || self.released {
            return Err(TrialError::AlreadyStarted);
        }
        let stimulus = resolver.resolve(&self.config.stimulus)?;
        let layout = self.config.layout(stimulus);

        self.surface.render(&layout);
        self.gate.reset_view(&mut self.surface);
        self.on_finish = Some(Box::new(on_finish));
        self.phase = TrialPhase::AwaitingCompletion;

        info!(
            "Trial started at {:?} ns, stimulus {:?}",
            self.clock.timer().now(),
            layout.stimulus.primary_uri()
        );
        Ok(())
    }

    /// Feeds one event into the state machine. Returns true only when the
    /// event changed what the trial knows or does: a newly known duration,
    /// first-completion, an accepted response or an expired timer.
    pub fn handle_event(&mut self, event: TrialEvent) -> bool {
        if !self.phase.is_running() {
            debug!(?event, phase = ?self.phase, "event outside a running trial");
            return false;
        }

        match (self.phase, event) {
            (_, TrialEvent::MetadataLoaded { duration }) => self.monitor.on_metadata(duration),
            (_, TrialEvent::TimeUpdate { position }) => {
                let completed = self.monitor.on_time_update(position);
                self.complete_with(completed)
            }
            (_, TrialEvent::Ended) => {
                let completed = self.monitor.on_ended();
                self.complete_with(completed)
            }

            (phase, TrialEvent::Response(control)) if phase.allows_input() => {
                self.record_response(control)
            }
            (phase, TrialEvent::Response(control)) => {
                debug!(?control, ?phase, "response outside the response window ignored");
                false
            }

            (TrialPhase::AwaitingCompletion, TrialEvent::TimerElapsed(TimerId::Grace))
                if self.grace_pending =>
            {
                self.grace_pending = false;
                self.open_window();
                true
            }
            (TrialPhase::Feedback, TrialEvent::TimerElapsed(id)) => {
                if !self.feedback.on_timer(id) {
                    debug!(?id, "timer ignored while feedback is showing");
                    return false;
                }
                self.finish();
                true
            }
            (phase, TrialEvent::TimerElapsed(id)) => {
                debug!(?id, ?phase, "stale timer ignored");
                false
            }
        }
    }

    fn complete_with(&mut self, completed: Option<CompletionSource>) -> bool {
        match completed {
            Some(source) => {
                self.on_first_completion(source);
                true
            }
            None => false,
        }
    }

    fn on_first_completion(&mut self, source: CompletionSource) {
        if self.phase != TrialPhase::AwaitingCompletion {
            return;
        }
        let grace = self.config.grace_period();
        if grace.is_zero() {
            self.open_window();
        } else {
            debug!(?source, "holding response window for {:?}", grace);
            self.grace_pending = true;
            self.surface.schedule(TimerId::Grace, grace);
        }
    }

    /// Opens the gate and starts the reaction clock in the same turn
    fn open_window(&mut self) {
        if !self.gate.open(&mut self.surface) {
            return;
        }
        self.clock.mark_start();
        self.phase = TrialPhase::ResponseOpen;
        info!("Response window opened at {:?}", self.clock.started_at());
    }

    fn record_response(&mut self, control: ControlId) -> bool {
        if !self.gate.capture(control, &mut self.surface) {
            return false;
        }
        let reaction_time = self.clock.capture();
        self.phase = TrialPhase::Captured;

        let outcome = self.evaluator.evaluate(control, &self.labels);
        info!(
            "Response recorded at {:?}, RT = {:.3} ms, {:?}",
            self.clock.responded_at(),
            reaction_time.map_or(f64::NAN, |rt| rt.as_secs_f64() * 1e3),
            outcome
        );
        self.capture = Some(Capture {
            control,
            reaction_time,
            outcome,
        });

        self.phase = TrialPhase::Feedback;
        self.feedback
            .present(control, outcome, &mut self.surface, &mut self.cues);
        true
    }

    /// Builds the result, clears the view, then hands the result over
    fn finish(&mut self) {
        let Some(capture) = self.capture.take() else {
            return;
        };
        let result = TrialResult {
            stimulus: self.config.stimulus.clone(),
            response: capture.control.index(),
            reaction_time_ms: capture.reaction_time.map(|rt| rt.as_secs_f64() * 1e3),
            correct: capture.outcome.correct(),
            trial_type: TRIAL_TYPE.to_string(),
        };

        self.release();
        self.phase = TrialPhase::Done;
        info!("Trial finished with response {}", result.response);
        if let Some(on_finish) = self.on_finish.take() {
            on_finish(result);
        }
    }

    /// Stops the trial from any phase without producing a result. Pending
    /// timers are cancelled and the view is torn down once; repeated calls
    /// do nothing.
    pub fn teardown(&mut self) {
        if self.phase.is_terminal() && self.released {
            return;
        }
        if self.phase != TrialPhase::Initializing {
            info!(phase = ?self.phase, "trial torn down before completion");
        }
        self.release();
        self.on_finish = None;
        self.capture = None;
        self.phase = TrialPhase::Done;
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        if self.grace_pending {
            self.surface.cancel(TimerId::Grace);
            self.grace_pending = false;
        }
        self.feedback.cancel(&mut self.surface);
        if self.phase != TrialPhase::Initializing {
            self.surface.teardown();
        }
        self.released = true;
    }

    pub fn phase(&self) -> TrialPhase {
        self.phase
    }

    pub fn is_done(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.monitor.state()
    }

    pub fn playback(&self) -> &PlaybackMonitor {
        &self.monitor
    }

    pub fn window_state(&self) -> WindowState {
        self.gate.state()
    }

    pub fn reaction_clock(&self) -> &ReactionClock<T> {
        &self.clock
    }

    pub fn config(&self) -> &TrialConfig {
        &self.config
    }

    pub fn labels(&self) -> &[String; 2] {
        &self.labels
    }

    pub fn surface(&self) -> &V {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut V {
        &mut self.surface
    }
}

impl<T, V, A> Drop for TrialController<T, V, A>
where
    T: Timer,
    V: TrialSurface + Scheduler,
    A: CuePlayer,
{
    fn drop(&mut self) {
        self.teardown();
    }
}
