pub mod config;
pub mod error;
pub mod feedback;
pub mod gate;
pub mod outcome;
pub mod playback;
pub mod state;
pub mod surface;
pub mod trial;

pub use config::TrialConfig;
pub use error::{ConfigError, TrialError};
pub use feedback::FeedbackPresenter;
pub use gate::ResponseGate;
pub use outcome::OutcomeEvaluator;
pub use playback::{CompletionSource, PlaybackMonitor, COMPLETION_THRESHOLD_S};
pub use state::{FinishCallback, TrialController};
pub use surface::{TrialLayout, TrialSurface};
pub use trial::{Capture, TrialEvent};
