pub mod cache;
pub mod resolver;

pub use cache::{Atom, PreloadCache};
pub use resolver::{ExtensionResolver, MediaSource, ResolveError, ResolvedStimulus, SourceResolver};
