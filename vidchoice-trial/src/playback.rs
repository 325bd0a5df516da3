//! First-completion detection for the stimulus clip.
//!
//! Two signals can report that the clip has played through: a position
//! update landing within the threshold of the known duration, or the
//! player's ended signal. Loop playback never emits ended, and non-looping
//! clips may never report a position close enough to the end, so both are
//! watched and the first one to arrive wins. Without a usable duration only
//! the ended signal can complete playback.

use tracing::{debug, info, warn};
use vidchoice_core::PlaybackState;

/// Seconds before the end at which a position update counts as completion
pub const COMPLETION_THRESHOLD_S: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionSource {
    NearEnd,
    Ended,
}

#[derive(Debug, Clone)]
pub struct PlaybackMonitor {
    state: PlaybackState,
    duration: Option<f64>,
    position: f64,
    threshold_s: f64,
    completed_by: Option<CompletionSource>,
}

impl Default for PlaybackMonitor {
    fn default() -> Self {
        Self::new(COMPLETION_THRESHOLD_S)
    }
}

impl PlaybackMonitor {
    pub fn new(threshold_s: f64) -> Self {
        Self {
            state: PlaybackState::Loading,
            duration: None,
            position: 0.0,
            threshold_s,
            completed_by: None,
        }
    }

    /// Metadata arrived. Non-finite or non-positive durations (streams,
    /// formats without seekable duration) leave the duration unknown. The
    /// first known duration sticks. Returns true when a duration became known.
    pub fn on_metadata(&mut self, duration: Option<f64>) -> bool {
        if self.state == PlaybackState::Loading {
            self.state = PlaybackState::Playing;
        }

        let Some(reported) = duration.filter(|d| d.is_finite() && *d > 0.0) else {
            debug!(?duration, "no usable duration, waiting for ended signal");
            return false;
        };

        match self.duration {
            None => {
                self.duration = Some(reported);
                info!("Video duration: {:.3}s", reported);
                true
            }
            Some(known) => {
                if known != reported {
                    warn!(known, reported, "ignoring changed video duration");
                }
                false
            }
        }
    }

    /// Position update. Returns the completion source the first time the
    /// position comes within the threshold of the end.
    pub fn on_time_update(&mut self, position: f64) -> Option<CompletionSource> {
        if !position.is_finite() || position < 0.0 {
            return None;
        }
        self.position = position;
        if self.state == PlaybackState::Loading && position > 0.0 {
            self.state = PlaybackState::Playing;
        }
        if self.has_completed() {
            return None;
        }

        let duration = self.duration?;
        if position > 0.0 && duration - position < self.threshold_s {
            return Some(self.complete(CompletionSource::NearEnd));
        }
        None
    }

    /// Ended signal. Completes regardless of position.
    pub fn on_ended(&mut self) -> Option<CompletionSource> {
        if self.has_completed() {
            return None;
        }
        Some(self.complete(CompletionSource::Ended))
    }

    fn complete(&mut self, source: CompletionSource) -> CompletionSource {
        self.completed_by = Some(source);
        self.state = PlaybackState::Completed;
        info!(?source, position = self.position, "Video has played through once");
        source
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn has_completed(&self) -> bool {
        self.completed_by.is_some()
    }

    pub fn completed_by(&self) -> Option<CompletionSource> {
        self.completed_by
    }
}
