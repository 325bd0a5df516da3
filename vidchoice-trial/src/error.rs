use thiserror::Error;
use vidchoice_media::ResolveError;

/// Configuration defects, reported before the trial starts
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("stimulus list is empty")]
    EmptyStimulus,

    #[error("stimulus entry {0} is blank")]
    BlankStimulus(usize),

    #[error("expected at most two choices, got {0}")]
    TooManyChoices(usize),

    #[error("completion threshold must be a positive number of seconds, got {0}")]
    InvalidThreshold(f64),

    #[error("stimulus surface must have a non-zero size, got {width}x{height}")]
    InvalidSize { width: u32, height: u32 },

    #[error("failed to parse trial config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum TrialError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("could not resolve stimulus: {0}")]
    Resolve(#[from] ResolveError),

    #[error("trial already started")]
    AlreadyStarted,
}
