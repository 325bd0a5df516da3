use crate::error::ConfigError;
use crate::playback::COMPLETION_THRESHOLD_S;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use crate::surface::TrialLayout;
use vidchoice_core::ControlId;
use vidchoice_media::ResolvedStimulus;

/// Immutable input for one trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialConfig {
    /// Candidate sources for the same clip, in preference order
    pub stimulus: Vec<String>,
    #[serde(default)]
    pub choices: Vec<String>,
    #[serde(default)]
    pub required: bool,
    /// Grace period between first-completion and the window opening
    #[serde(default)]
    pub time_after_video_ms: u64,
    #[serde(default = "default_feedback_ms")]
    pub feedback_duration_ms: u64,
    /// Compared against the label of the selected control
    #[serde(default)]
    pub expected_answer: Option<String>,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_true")]
    pub autoplay: bool,
    #[serde(default, rename = "loop")]
    pub loop_playback: bool,
    #[serde(default)]
    pub controls: bool,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default = "default_threshold")]
    pub completion_threshold_s: f64,
}

fn default_feedback_ms() -> u64 {
    400
}
fn default_width() -> u32 {
    640
}
fn default_height() -> u32 {
    360
}
fn default_true() -> bool {
    true
}
fn default_threshold() -> f64 {
    COMPLETION_THRESHOLD_S
}

impl TrialConfig {
    pub fn new<I, S>(stimulus: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            stimulus: stimulus.into_iter().map(Into::into).collect(),
            choices: Vec::new(),
            required: false,
            time_after_video_ms: 0,
            feedback_duration_ms: default_feedback_ms(),
            expected_answer: None,
            width: default_width(),
            height: default_height(),
            autoplay: true,
            loop_playback: false,
            controls: false,
            prompt: None,
            completion_threshold_s: COMPLETION_THRESHOLD_S,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_choices(mut self, left: impl Into<String>, right: impl Into<String>) -> Self {
        self.choices = vec![left.into(), right.into()];
        self
    }

    pub fn with_expected_answer(mut self, answer: impl Into<String>) -> Self {
        self.expected_answer = Some(answer.into());
        self
    }

    pub fn with_feedback_duration(mut self, d: Duration) -> Self {
        self.feedback_duration_ms = u64::try_from(d.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_grace_period(mut self, d: Duration) -> Self {
        self.time_after_video_ms = u64::try_from(d.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn with_loop(mut self, loop_playback: bool) -> Self {
        self.loop_playback = loop_playback;
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stimulus.is_empty() {
            return Err(ConfigError::EmptyStimulus);
        }
        if let Some(idx) = self.stimulus.iter().position(|s| s.trim().is_empty()) {
            return Err(ConfigError::BlankStimulus(idx));
        }
        if self.choices.len() > 2 {
            return Err(ConfigError::TooManyChoices(self.choices.len()));
        }
        if !self.completion_threshold_s.is_finite() || self.completion_threshold_s <= 0.0 {
            return Err(ConfigError::InvalidThreshold(self.completion_threshold_s));
        }
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidSize {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// Effective labels; missing or blank choices fall back to left/right
    pub fn labels(&self) -> [String; 2] {
        ControlId::ALL.map(|control| {
            self.choices
                .get(control.index())
                .filter(|label| !label.is_empty())
                .cloned()
                .unwrap_or_else(|| control.default_label().to_string())
        })
    }

    /// Prompt to show, if any. Prompts that are just a "Video N" title are
    /// not shown.
    pub fn visible_prompt(&self) -> Option<&str> {
        self.prompt.as_deref().filter(|p| !p.contains("Video"))
    }

    pub fn feedback_duration(&self) -> Duration {
        Duration::from_millis(self.feedback_duration_ms)
    }

    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.time_after_video_ms)
    }

    /// Whether a host may end this trial with an external timeout
    pub fn allows_external_timeout(&self) -> bool {
        !self.required
    }

    pub fn layout(&self, stimulus: ResolvedStimulus) -> TrialLayout {
        TrialLayout {
            stimulus,
            labels: self.labels(),
            prompt: self.visible_prompt().map(str::to_string),
            width: self.width,
            height: self.height,
            autoplay: self.autoplay,
            loop_playback: self.loop_playback,
            controls: self.controls,
        }
    }
}
