//! Stream sampling
//!
//! A probe fetches a short fragment of a stream and reduces it to a single
//! figure: the share of the fragment that is not silent.
//!
//! ```text
//! stream url → decoder process → artifact file → PCM samples → non-silent %
//! ```

pub mod ffmpeg;
pub mod silence;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{trace, warn};

use crate::Channel;

/// Minimum share of a sample that must be audible for a stream to count as
/// having sound.
pub const SOUND_ACTIVITY_PERCENT: f64 = 10.0;

/// Outcome of sampling one channel.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeResult {
    /// No usable sample could be obtained
    Failed { reason: String },

    /// A sample was obtained and analysed
    Sampled { non_silent_percent: f64 },
}

impl ProbeResult {
    /// `None` when the probe failed.
    pub fn has_sound(&self) -> Option<bool> {
        match self {
            ProbeResult::Failed { .. } => None,
            ProbeResult::Sampled { non_silent_percent } => {
                Some(*non_silent_percent >= SOUND_ACTIVITY_PERCENT)
            }
        }
    }
}

/// Anything that can sample a channel.
#[async_trait]
pub trait AudioProbe: Send + Sync {
    async fn probe(&self, channel: &Channel) -> ProbeResult;

    /// Remove any artifacts left behind by earlier probes.
    fn cleanup(&self) {}
}

/// A temporary file owned for the duration of one probe. The file is removed
/// when the guard is dropped, whether or not it was ever created.
#[derive(Debug)]
pub struct TempArtifact {
    path: PathBuf,
}

impl TempArtifact {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempArtifact {
    fn drop(&mut self) {
        remove_if_present(&self.path);
    }
}

pub(crate) fn remove_if_present(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => trace!("removed artifact {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("could not remove artifact {}: {e}", path.display()),
    }
}
