pub mod manual;
pub mod reaction;
pub mod timer;

pub use manual::ManualTimer;
pub use reaction::ReactionClock;
pub use timer::{HighPrecisionTimer, Timer};
