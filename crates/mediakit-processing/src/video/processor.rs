//! Video probe - duration and dimension extraction via ffprobe

use crate::error::ProcessingError;
use crate::metadata::VideoMetadata;
use std::path::Path;
use tokio::process::Command;

/// Reject executable paths that carry shell metacharacters or traversal.
fn validate_executable_path(path: &str) -> Result<(), ProcessingError> {
    if path.trim().is_empty() {
        return Err(ProcessingError::Config("ffprobe path is empty".to_string()));
    }

    if path.contains("..") {
        return Err(ProcessingError::Config(format!(
            "ffprobe path contains directory traversal: {}",
            path
        )));
    }

    if !path
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '/' | '-' | '_' | '.' | '\\' | ':'))
    {
        return Err(ProcessingError::Config(format!(
            "ffprobe path contains unsafe characters: {}",
            path
        )));
    }

    Ok(())
}

#[derive(Debug, Clone)]
pub struct VideoProbe {
    ffprobe_path: String,
}

impl VideoProbe {
    pub fn new(ffprobe_path: String) -> Result<Self, ProcessingError> {
        validate_executable_path(&ffprobe_path)?;
        Ok(Self { ffprobe_path })
    }

    /// Probe an in-memory video by spilling it to a temporary file.
    pub async fn probe(&self, data: &[u8]) -> Result<VideoMetadata, ProcessingError> {
        let temp_file = tempfile::NamedTempFile::new()
            .map_err(|e| ProcessingError::Probe(format!("Failed to create temp file: {}", e)))?;
        tokio::fs::write(temp_file.path(), data)
            .await
            .map_err(|e| ProcessingError::Probe(format!("Failed to write temp file: {}", e)))?;

        self.probe_path(temp_file.path()).await
    }

    #[tracing::instrument(skip(self), fields(
        process.executable.name = "ffprobe",
        process.executable.path = %self.ffprobe_path,
        ffmpeg.operation = "probe"
    ))]
    pub async fn probe_path(&self, video_path: &Path) -> Result<VideoMetadata, ProcessingError> {
        let start = std::time::Instant::now();

        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
                "-select_streams",
                "v:0",
            ])
            .arg(video_path)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| ProcessingError::Probe(format!("Failed to execute ffprobe: {}", e)))?;

        if !output.status.success() {
            return Err(ProcessingError::Probe(format!(
                "ffprobe failed: {}",
                String::from_utf8_lossy(&output.stderr)
            )));
        }

        let metadata = parse_probe_output(&output.stdout)?;

        tracing::info!(
            duration_ms = start.elapsed().as_millis(),
            video_duration = ?metadata.duration,
            width = metadata.width,
            height = metadata.height,
            codec = %metadata.codec,
            "Video probe completed"
        );

        Ok(metadata)
    }
}

/// Parse `ffprobe -print_format json -show_format -show_streams` output.
fn parse_probe_output(stdout: &[u8]) -> Result<VideoMetadata, ProcessingError> {
    let probe_data: serde_json::Value = serde_json::from_slice(stdout)
        .map_err(|e| ProcessingError::Probe(format!("Failed to parse ffprobe output: {}", e)))?;

    let stream = probe_data["streams"]
        .get(0)
        .ok_or_else(|| ProcessingError::Probe("No video stream found".to_string()))?;

    let duration = probe_data["format"]["duration"]
        .as_str()
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0);

    let width = stream["width"]
        .as_u64()
        .ok_or_else(|| ProcessingError::Probe("Could not parse width".to_string()))? as u32;

    let height = stream["height"]
        .as_u64()
        .ok_or_else(|| ProcessingError::Probe("Could not parse height".to_string()))? as u32;

    let codec = stream["codec_name"]
        .as_str()
        .unwrap_or("unknown")
        .to_string();

    Ok(VideoMetadata {
        duration,
        width,
        height,
        codec,
    })
}
