#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;
use vidchoice_core::{
    ControlId, Cue, CueError, CuePlayer, FeedbackTone, Scheduler, TimerId, TrialResult,
};
use vidchoice_media::ExtensionResolver;
use vidchoice_timing::ManualTimer;
use vidchoice_trial::{TrialConfig, TrialController, TrialEvent, TrialLayout, TrialSurface};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Render([String; 2]),
    Enable(ControlId, bool),
    Feedback(ControlId, FeedbackTone),
    Schedule(TimerId, Duration),
    Cancel(TimerId),
    Teardown,
}

/// Surface that logs every capability call into a shared log
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub log: Rc<RefCell<Vec<Call>>>,
    pub enabled: [bool; 2],
    pub armed: HashMap<TimerId, Duration>,
}

impl TrialSurface for RecordingSurface {
    fn render(&mut self, layout: &TrialLayout) {
        self.log.borrow_mut().push(Call::Render(layout.labels.clone()));
    }
    fn set_control_enabled(&mut self, control: ControlId, enabled: bool) {
        self.enabled[control.index()] = enabled;
        self.log.borrow_mut().push(Call::Enable(control, enabled));
    }
    fn show_feedback(&mut self, control: ControlId, tone: FeedbackTone) {
        self.log.borrow_mut().push(Call::Feedback(control, tone));
    }
    fn teardown(&mut self) {
        self.log.borrow_mut().push(Call::Teardown);
    }
}

impl Scheduler for RecordingSurface {
    fn schedule(&mut self, id: TimerId, delay: Duration) {
        self.armed.insert(id, delay);
        self.log.borrow_mut().push(Call::Schedule(id, delay));
    }
    fn cancel(&mut self, id: TimerId) {
        self.armed.remove(&id);
        self.log.borrow_mut().push(Call::Cancel(id));
    }
}

/// Cue player that records cues and can be told to reject them
#[derive(Debug, Default, Clone)]
pub struct CountingCues {
    pub played: Rc<RefCell<Vec<Cue>>>,
    pub reject: bool,
}

impl CuePlayer for CountingCues {
    fn play(&mut self, cue: Cue) -> Result<(), CueError> {
        self.played.borrow_mut().push(cue);
        if self.reject {
            Err(CueError::Rejected(cue))
        } else {
            Ok(())
        }
    }
}

pub type Controller = TrialController<ManualTimer, RecordingSurface, CountingCues>;

pub struct Harness {
    pub timer: ManualTimer,
    pub trial: Controller,
    pub log: Rc<RefCell<Vec<Call>>>,
    pub cues: Rc<RefCell<Vec<Cue>>>,
    pub results: Rc<RefCell<Vec<TrialResult>>>,
}

impl Harness {
    pub fn start(config: TrialConfig) -> Self {
        Self::start_with_cues(config, CountingCues::default())
    }

    pub fn start_with_cues(config: TrialConfig, cues: CountingCues) -> Self {
        let timer = ManualTimer::starting_at(5_000_000);
        let surface = RecordingSurface::default();
        let log = Rc::clone(&surface.log);
        let played = Rc::clone(&cues.played);
        let results = Rc::new(RefCell::new(Vec::new()));

        let mut trial = TrialController::new(config, timer.clone(), surface, cues).unwrap();
        let sink = Rc::clone(&results);
        trial
            .start(&ExtensionResolver::default(), move |r| sink.borrow_mut().push(r))
            .unwrap();

        Self {
            timer,
            trial,
            log,
            cues: played,
            results,
        }
    }

    pub fn send(&mut self, event: TrialEvent) -> bool {
        self.trial.handle_event(event)
    }

    pub fn metadata(&mut self, duration: f64) -> bool {
        self.send(TrialEvent::MetadataLoaded {
            duration: Some(duration),
        })
    }

    pub fn position(&mut self, position: f64) -> bool {
        self.send(TrialEvent::TimeUpdate { position })
    }

    pub fn click(&mut self, control: ControlId) -> bool {
        self.send(TrialEvent::Response(control))
    }

    pub fn advance_ms(&self, ms: u64) {
        self.timer.advance(Duration::from_millis(ms));
    }

    pub fn is_armed(&self, id: TimerId) -> bool {
        self.trial.surface().armed.contains_key(&id)
    }

    /// Lets an armed timer run out and delivers it
    pub fn fire(&mut self, id: TimerId) -> bool {
        let delay = self.trial.surface_mut().armed.remove(&id).expect("timer not armed");
        self.timer.advance(delay);
        self.send(TrialEvent::TimerElapsed(id))
    }

    pub fn enabled(&self) -> [bool; 2] {
        self.trial.surface().enabled
    }

    pub fn calls(&self) -> Vec<Call> {
        self.log.borrow().clone()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.log.borrow().iter().filter(|c| *c == call).count()
    }

    pub fn results(&self) -> Vec<TrialResult> {
        self.results.borrow().clone()
    }
}

pub fn clip_config() -> TrialConfig {
    TrialConfig::new(["stimuli/clip01.mp4", "stimuli/clip01.webm"])
}
