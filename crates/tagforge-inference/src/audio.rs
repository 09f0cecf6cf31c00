//! Audio decoding via ffmpeg subprocess.
//!
//! Decodes any media container to mono f32 samples at the transcription
//! sample rate, and extracts audio tracks from video files. ffmpeg owns the
//! codec zoo; this module only shells out to it.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use tagforge_core::defaults::EXTRACTION_CMD_TIMEOUT_SECS;
use tagforge_core::{AudioDecoder, Error, Result};

use crate::cmd::run_cmd_stdout;

/// ffmpeg-backed implementation of [`AudioDecoder`].
pub struct FfmpegAudioDecoder;

#[async_trait]
impl AudioDecoder for FfmpegAudioDecoder {
    async fn decode(&self, path: &Path, sample_rate: u32) -> Result<Vec<f32>> {
        let stdout = run_cmd_stdout(
            Command::new("ffmpeg")
                .arg("-v")
                .arg("error")
                .arg("-i")
                .arg(path)
                .arg("-f")
                .arg("f32le")
                .arg("-ac")
                .arg("1")
                .arg("-ar")
                .arg(sample_rate.to_string())
                .arg("pipe:1"),
            EXTRACTION_CMD_TIMEOUT_SECS,
        )
        .await?;

        let samples = bytes_to_f32_samples(&stdout)?;
        debug!(
            path = %path.display(),
            samples = samples.len(),
            sample_rate,
            "Decoded audio"
        );
        Ok(samples)
    }
}

/// Extract the audio track of a video file to a mono 16-bit WAV in `out_dir`.
pub async fn extract_audio_track<'a>(
    video_path: &'a Path,
    out_dir: &'a Path,
    sample_rate: u32,
) -> Result<PathBuf> {
    let out_path = out_dir.join("audio_track.wav");
    crate::cmd::run_cmd_status(
        Command::new("ffmpeg")
            .arg("-v")
            .arg("error")
            .arg("-i")
            .arg(video_path)
            .arg("-vn")
            .arg("-acodec")
            .arg("pcm_s16le")
            .arg("-ac")
            .arg("1")
            .arg("-ar")
            .arg(sample_rate.to_string())
            .arg(&out_path),
        EXTRACTION_CMD_TIMEOUT_SECS,
    )
    .await?;
    Ok(out_path)
}

/// Reinterpret little-endian f32 PCM bytes as samples.
fn bytes_to_f32_samples(bytes: &[u8]) -> Result<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(Error::Decode(format!(
            "PCM stream length {} is not a multiple of 4",
            bytes.len()
        )));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_to_samples_roundtrip() {
        let samples = [0.0f32, 1.0, -0.5, 0.25];
        let bytes: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        assert_eq!(bytes_to_f32_samples(&bytes).unwrap(), samples);
    }

    #[test]
    fn test_bytes_to_samples_empty() {
        assert!(bytes_to_f32_samples(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_bytes_to_samples_truncated_stream() {
        let err = bytes_to_f32_samples(&[0, 0, 0]).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }
}
