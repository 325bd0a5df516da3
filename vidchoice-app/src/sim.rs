use crate::queue::{nanos, EventQueue};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use vidchoice_core::ControlId;
use vidchoice_trial::TrialEvent;

/// Passes a looping clip plays before the simulated player stops reporting
pub const LOOP_PASSES: u32 = 3;

/// Gap between the two clicks of a double click
pub const DOUBLE_CLICK_GAP: Duration = Duration::from_millis(30);

/// Upper bound on queued position updates for one playback
pub const MAX_TICKS: u64 = 100_000;

/// Stand-in for a media element: metadata, periodic position updates and
/// the end-of-playback signal, all queued up front.
#[derive(Debug, Clone)]
pub struct PlayerSim {
    pub duration_s: f64,
    pub tick: Duration,
    pub metadata_delay: Duration,
    /// Reported in the metadata; off for formats that carry no duration
    pub report_duration: bool,
    pub loop_playback: bool,
    /// Never delivers anything, like a clip that fails to decode
    pub stalled: bool,
}

impl PlayerSim {
    pub fn new(duration_s: f64, tick: Duration) -> Self {
        Self {
            duration_s,
            tick,
            metadata_delay: Duration::from_millis(50),
            report_duration: true,
            loop_playback: false,
            stalled: false,
        }
    }

    pub fn schedule(&self, start_ns: u64, queue: &mut EventQueue) {
        if self.stalled {
            return;
        }
        let loaded = start_ns.saturating_add(nanos(self.metadata_delay));
        queue.push_at(
            loaded,
            TrialEvent::MetadataLoaded {
                duration: self.report_duration.then_some(self.duration_s),
            },
        );

        // Without a finite length there is nothing to play through.
        let tick_s = self.tick.as_secs_f64();
        let Ok(length) = Duration::try_from_secs_f64(self.duration_s) else {
            return;
        };
        if tick_s <= 0.0 || length.is_zero() {
            return;
        }
        let passes = if self.loop_playback { LOOP_PASSES } else { 1 };
        let total_s = self.duration_s * f64::from(passes);
        let ticks = ((total_s / tick_s).ceil() as u64).min(MAX_TICKS);

        for i in 1..ticks {
            let played = i as f64 * tick_s;
            let position = if self.loop_playback {
                played % self.duration_s
            } else {
                played
            };
            queue.push_at(
                loaded.saturating_add(nanos(self.tick).saturating_mul(i)),
                TrialEvent::TimeUpdate { position },
            );
        }

        // A looping element restarts instead of ending.
        if !self.loop_playback {
            let end = loaded.saturating_add(nanos(length));
            queue.push_at(end, TrialEvent::TimeUpdate { position: self.duration_s });
            queue.push_at(end, TrialEvent::Ended);
        }
    }
}

/// Participant whose reaction times are uniform around a mean
#[derive(Debug)]
pub struct SubjectSim {
    rng: StdRng,
    mean: Duration,
    spread: Duration,
    pub choice: Option<ControlId>,
    pub double_click: bool,
}

impl SubjectSim {
    pub fn new(seed: u64, mean: Duration, spread: Duration) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            mean,
            spread,
            choice: None,
            double_click: false,
        }
    }

    pub fn reaction_delay(&mut self) -> Duration {
        let lo = self.mean.saturating_sub(self.spread);
        let hi = self.mean.saturating_add(self.spread);
        let ns = self.rng.random_range(nanos(lo)..=nanos(hi));
        Duration::from_nanos(ns)
    }

    pub fn choose(&mut self) -> ControlId {
        match self.choice {
            Some(control) => control,
            None if self.rng.random_bool(0.5) => ControlId::Left,
            None => ControlId::Right,
        }
    }

    /// Queues the click (or clicks) answering a window that opened at `now_ns`
    pub fn respond(&mut self, now_ns: u64, queue: &mut EventQueue) -> ControlId {
        let control = self.choose();
        let due = now_ns.saturating_add(nanos(self.reaction_delay()));
        queue.push_at(due, TrialEvent::Response(control));
        if self.double_click {
            let second = ControlId::ALL[1 - control.index()];
            let again = due.saturating_add(nanos(DOUBLE_CLICK_GAP));
            queue.push_at(again, TrialEvent::Response(second));
        }
        control
    }
}
