use crate::timer::Timer;
use std::time::Duration;

/// Measures reaction time from response-window opening to the response.
///
/// The start timestamp is set once. A response captured before the start is
/// rejected, and only the first capture is kept.
#[derive(Debug, Clone)]
pub struct ReactionClock<T: Timer> {
    timer: T,
    start: Option<T::Timestamp>,
    response: Option<T::Timestamp>,
    reaction: Option<Duration>,
}

impl<T: Timer> ReactionClock<T> {
    pub fn new(timer: T) -> Self {
        Self {
            timer,
            start: None,
            response: None,
            reaction: None,
        }
    }

    /// Records the start timestamp. Returns false if it was already set.
    pub fn mark_start(&mut self) -> bool {
        if self.start.is_some() {
            return false;
        }
        self.start = Some(self.timer.now());
        true
    }

    pub fn is_started(&self) -> bool {
        self.start.is_some()
    }

    pub fn started_at(&self) -> Option<T::Timestamp> {
        self.start
    }

    pub fn responded_at(&self) -> Option<T::Timestamp> {
        self.response
    }

    /// Time since the start, if started
    pub fn elapsed(&self) -> Option<Duration> {
        self.start.map(|start| self.timer.elapsed(start))
    }

    /// Stamps the response and returns the reaction time. `None` when the
    /// clock was never started; later calls return the first measurement.
    pub fn capture(&mut self) -> Option<Duration> {
        if self.reaction.is_some() {
            return self.reaction;
        }
        let start = self.start?;
        self.response = Some(self.timer.now());
        self.reaction = Some(self.timer.elapsed(start));
        self.reaction
    }

    pub fn reaction_time(&self) -> Option<Duration> {
        self.reaction
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }
}
