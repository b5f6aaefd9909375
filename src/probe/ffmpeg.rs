use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, instrument, trace, warn};

use crate::config::Config;
use crate::error::ProbeError;
use crate::{Channel, ChannelRole};

use super::silence::{self, SAMPLE_RATE};
use super::{AudioProbe, ProbeResult, TempArtifact, remove_if_present};

/// Length of the fragment fetched from each stream.
pub const SAMPLE_SECONDS: u32 = 10;

/// Probe that shells out to `ffmpeg` to record and decode a fragment.
#[derive(Debug, Clone)]
pub struct FfmpegProbe {
    ffmpeg_bin: String,
    temp_dir: PathBuf,
    threshold_dbfs: f64,
    run_id: String,
}

impl FfmpegProbe {
    pub fn new(config: &Config) -> Self {
        Self {
            ffmpeg_bin: config.ffmpeg_bin.clone(),
            temp_dir: config.temp_dir.clone(),
            threshold_dbfs: f64::from(config.threshold_dbfs),
            run_id: std::process::id().to_string(),
        }
    }

    /// Artifact location for a channel, unique to this process.
    pub fn artifact_path(&self, role: ChannelRole) -> PathBuf {
        self.temp_dir
            .join(format!("radio_watchdog_{}_{}.mp3", self.run_id, role.id()))
    }

    async fn fetch(&self, url: &str, artifact: &Path) -> Result<(), ProbeError> {
        let output = Command::new(&self.ffmpeg_bin)
            .arg("-y")
            .args(["-i", url])
            .arg("-t")
            .arg(SAMPLE_SECONDS.to_string())
            .args(["-acodec", "copy"])
            .arg(artifact)
            .args(["-loglevel", "error"])
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(ProbeError::Spawn)?;

        if !output.stderr.is_empty() {
            trace!(
                "decoder diagnostics: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        if !output.status.success() {
            return Err(ProbeError::ExitStatus(output.status.code()));
        }

        // the artifact, not the tool's own report, decides success
        if !artifact.is_file() {
            return Err(ProbeError::MissingArtifact);
        }

        Ok(())
    }

    async fn decode(&self, artifact: &Path) -> Result<Vec<i16>, ProbeError> {
        let output = Command::new(&self.ffmpeg_bin)
            .args(["-loglevel", "error"])
            .arg("-i")
            .arg(artifact)
            .args(["-f", "s16le", "-acodec", "pcm_s16le", "-ac", "1"])
            .arg("-ar")
            .arg(SAMPLE_RATE.to_string())
            .arg("pipe:1")
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(ProbeError::Spawn)?;

        if !output.status.success() {
            return Err(ProbeError::Decode(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        Ok(pcm_samples(&output.stdout))
    }
}

/// Interpret little-endian 16-bit PCM; a trailing odd byte is dropped.
pub fn pcm_samples(bytes: &[u8]) -> Vec<i16> {
    bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect()
}

#[async_trait]
impl AudioProbe for FfmpegProbe {
    #[instrument(skip(self, channel), fields(role = channel.role.id()))]
    async fn probe(&self, channel: &Channel) -> ProbeResult {
        let Some(url) = &channel.url else {
            return ProbeResult::Failed {
                reason: "channel has no stream address".to_string(),
            };
        };

        let artifact = TempArtifact::new(self.artifact_path(channel.role));

        if let Err(e) = self.fetch(url, artifact.path()).await {
            warn!("could not sample {url}: {e}");
            return ProbeResult::Failed {
                reason: e.to_string(),
            };
        }

        let samples = match self.decode(artifact.path()).await {
            Ok(samples) => samples,
            Err(e) => {
                warn!("could not analyse sample of {url}: {e}");
                return ProbeResult::Failed {
                    reason: e.to_string(),
                };
            }
        };

        let non_silent_percent =
            silence::non_silent_percent(&samples, SAMPLE_RATE, self.threshold_dbfs);
        debug!("{url}: {non_silent_percent:.1}% non-silent");

        ProbeResult::Sampled { non_silent_percent }
    }

    fn cleanup(&self) {
        for role in ChannelRole::ALL {
            remove_if_present(&self.artifact_path(role));
        }
    }
}
