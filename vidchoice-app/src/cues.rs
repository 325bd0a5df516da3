use std::path::{Path, PathBuf};
use tracing::info;
use vidchoice_core::{Cue, CueError, CuePlayer};

pub const DEFAULT_BLEEP: &str = "stimuli/bleep.wav";
pub const DEFAULT_BUZZ: &str = "stimuli/buzz.wav";

/// Looks up one sound file per cue. There is no audio device here, so
/// "playing" means confirming the asset exists and logging it.
#[derive(Debug, Clone)]
pub struct FileCuePlayer {
    bleep: PathBuf,
    buzz: PathBuf,
}

impl Default for FileCuePlayer {
    fn default() -> Self {
        Self::new(DEFAULT_BLEEP, DEFAULT_BUZZ)
    }
}

impl FileCuePlayer {
    pub fn new(bleep: impl Into<PathBuf>, buzz: impl Into<PathBuf>) -> Self {
        Self {
            bleep: bleep.into(),
            buzz: buzz.into(),
        }
    }

    pub fn asset(&self, cue: Cue) -> &Path {
        match cue {
            Cue::Bleep => &self.bleep,
            Cue::Buzz => &self.buzz,
        }
    }
}

impl CuePlayer for FileCuePlayer {
    fn play(&mut self, cue: Cue) -> Result<(), CueError> {
        let asset = self.asset(cue);
        if !asset.is_file() {
            return Err(CueError::Unavailable(asset.display().to_string()));
        }
        info!("Playing {:?} from {}", cue, asset.display());
        Ok(())
    }
}
