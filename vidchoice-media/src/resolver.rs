//! Stimulus source resolution.
//!
//! Turns the configured list of stimulus identifiers into either a preloaded
//! buffer or an ordered list of candidate sources, each tagged with the MIME
//! type the playback surface should try. Containers that browsers and most
//! players handle through the mp4 demuxer (`mov`, `mpeg`) are advertised as
//! `video/mp4`.

use crate::cache::{Atom, PreloadCache};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("no stimulus sources given")]
    Empty,
    #[error("stimulus source {0:?} has no file extension")]
    MissingExtension(String),
}

/// One playable candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaSource {
    pub uri: Atom,
    pub mime: Atom,
}

#[derive(Debug, Clone)]
pub enum ResolvedStimulus {
    /// Bytes already fetched for the first source
    Preloaded { uri: Atom, buffer: Arc<[u8]> },
    /// Candidates in preference order
    Candidates(Vec<MediaSource>),
}

impl ResolvedStimulus {
    pub fn is_preloaded(&self) -> bool {
        matches!(self, ResolvedStimulus::Preloaded { .. })
    }

    /// The source the surface will try first
    pub fn primary_uri(&self) -> Option<&Atom> {
        match self {
            ResolvedStimulus::Preloaded { uri, .. } => Some(uri),
            ResolvedStimulus::Candidates(sources) => sources.first().map(|s| &s.uri),
        }
    }
}

/// Resolves stimulus identifiers into something a playback surface can load
pub trait SourceResolver {
    fn resolve(&self, stimulus: &[String]) -> Result<ResolvedStimulus, ResolveError>;
}

/// Resolver that consults a preload cache, then derives MIME types from file
/// extensions.
#[derive(Debug, Clone, Default)]
pub struct ExtensionResolver {
    preloads: PreloadCache,
}

impl ExtensionResolver {
    pub fn new(preloads: PreloadCache) -> Self {
        Self { preloads }
    }

    /// Resolver backed by the process-wide preload cache
    pub fn global() -> Self {
        Self::new(PreloadCache::global())
    }

    pub fn preloads(&self) -> &PreloadCache {
        &self.preloads
    }

    /// Builds a candidate for a single identifier. The query string is
    /// dropped from both the source and the extension lookup.
    pub fn source_for(uri: &str) -> Result<MediaSource, ResolveError> {
        let path = uri.split_once('?').map_or(uri, |(path, _)| path);
        let file_name = path.rsplit_once('/').map_or(path, |(_, name)| name);
        let ext = match file_name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => ext.to_ascii_lowercase(),
            _ => return Err(ResolveError::MissingExtension(uri.to_string())),
        };

        let subtype = match ext.as_str() {
            "mov" => {
                warn!(source = path, "mov files are not reliably supported; advertising as mp4");
                "mp4"
            }
            "mpeg" => "mp4",
            other => other,
        };

        Ok(MediaSource {
            uri: Atom::from(path),
            mime: Atom::from(format!("video/{subtype}")),
        })
    }
}

impl SourceResolver for ExtensionResolver {
    fn resolve(&self, stimulus: &[String]) -> Result<ResolvedStimulus, ResolveError> {
        let first = stimulus.first().ok_or(ResolveError::Empty)?;

        if let Some(buffer) = self.preloads.get(first) {
            debug!(source = %first, bytes = buffer.len(), "using preloaded stimulus");
            return Ok(ResolvedStimulus::Preloaded {
                uri: Atom::from(first.as_str()),
                buffer,
            });
        }

        let sources = stimulus
            .iter()
            .map(|uri| Self::source_for(uri))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ResolvedStimulus::Candidates(sources))
    }
}
