use crate::queue::{nanos, EventQueue};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, info, warn};
use vidchoice_core::{ControlId, FeedbackTone, Scheduler, TimerId};
use vidchoice_render::{PanelRenderer, PanelState};
use vidchoice_timing::Timer;
use vidchoice_trial::{TrialEvent, TrialLayout, TrialSurface};

/// Surface without a window: keeps the panel state, turns timers into queue
/// entries and optionally snapshots the panel while feedback is showing.
pub struct HeadlessSurface<T: Timer<Timestamp = u64>> {
    timer: T,
    queue: Rc<RefCell<EventQueue>>,
    panel: PanelState,
    renderer: Option<PanelRenderer>,
    snapshot: Option<PathBuf>,
}

impl<T: Timer<Timestamp = u64>> HeadlessSurface<T> {
    pub fn new(timer: T, queue: Rc<RefCell<EventQueue>>) -> Self {
        Self {
            timer,
            queue,
            panel: PanelState::default(),
            renderer: None,
            snapshot: None,
        }
    }

    pub fn with_snapshot(mut self, renderer: PanelRenderer, path: PathBuf) -> Self {
        self.renderer = Some(renderer);
        self.snapshot = Some(path);
        self
    }

    #[cfg(test)]
    pub fn panel(&self) -> &PanelState {
        &self.panel
    }

    pub fn controls_enabled(&self) -> bool {
        self.panel.visible && self.panel.both_enabled()
    }

    fn save_snapshot(&mut self) {
        let (Some(renderer), Some(path)) = (self.renderer.as_mut(), self.snapshot.as_ref()) else {
            return;
        };
        renderer.render(&self.panel);
        match renderer.save_png(path) {
            Ok(()) => info!("Feedback snapshot saved to {}", path.display()),
            Err(e) => warn!("could not save feedback snapshot: {e:#}"),
        }
    }
}

impl<T: Timer<Timestamp = u64>> TrialSurface for HeadlessSurface<T> {
    fn render(&mut self, layout: &TrialLayout) {
        info!(
            "Rendering {} stimulus {:?} at {}x{}, choices [{}] / [{}]",
            if layout.stimulus.is_preloaded() { "preloaded" } else { "streamed" },
            layout.stimulus.primary_uri(),
            layout.width,
            layout.height,
            layout.label(ControlId::Left),
            layout.label(ControlId::Right),
        );
        if let Some(prompt) = &layout.prompt {
            info!("Prompt: {prompt}");
        }
        self.panel = PanelState::default();
    }

    fn set_control_enabled(&mut self, control: ControlId, enabled: bool) {
        debug!(?control, enabled, "control state");
        self.panel.set_enabled(control, enabled);
    }

    fn show_feedback(&mut self, control: ControlId, tone: FeedbackTone) {
        info!(?control, ?tone, "feedback shown");
        self.panel.show_feedback(control, tone);
        self.save_snapshot();
    }

    fn teardown(&mut self) {
        self.panel.clear();
        let mut queue = self.queue.borrow_mut();
        if !queue.is_empty() {
            debug!(dropped = queue.len(), "dropping pending events");
            queue.clear();
        }
        debug!("view cleared");
    }
}

impl<T: Timer<Timestamp = u64>> Scheduler for HeadlessSurface<T> {
    fn schedule(&mut self, id: TimerId, delay: Duration) {
        let due = self.timer.now().saturating_add(nanos(delay));
        let mut queue = self.queue.borrow_mut();
        queue.cancel_timer(id);
        queue.push_at(due, TrialEvent::TimerElapsed(id));
    }

    fn cancel(&mut self, id: TimerId) {
        self.queue.borrow_mut().cancel_timer(id);
    }
}
