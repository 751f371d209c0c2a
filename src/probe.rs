//! Media probe data contract.
//!
//! The engine never runs ffprobe itself; the host hands it a probe
//! snapshot. This module deserializes an ffprobe-style JSON document
//! (`ffprobe -print_format json -show_format -show_streams`) into the
//! read-only [`MediaDescriptor`] the planner consumes.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Error type for probe-document parsing.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Failed to parse probe JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Probe document has no format section")]
    MissingFormat,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One elementary stream inside the container.
///
/// Every field a probe may omit is an `Option`; an absent field is
/// treated as "unknown" by the engine, never as an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StreamInfo {
    pub codec_name: Option<String>,
    /// "video", "audio", "subtitle", "data", ...
    pub codec_type: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Codec profile string (e.g. "High 10").
    pub profile: Option<String>,
    /// Bit depth marker as reported by ffprobe (a string, e.g. "10").
    pub bits_per_raw_sample: Option<String>,
    pub duration_secs: Option<f64>,
}

impl StreamInfo {
    /// Lower-cased codec type, or `None` when the probe omitted it.
    pub fn kind(&self) -> Option<String> {
        self.codec_type.as_deref().map(str::to_ascii_lowercase)
    }

    /// Lower-cased codec name, or `None` when the probe omitted it.
    pub fn codec(&self) -> Option<String> {
        self.codec_name.as_deref().map(str::to_ascii_lowercase)
    }

    pub fn is_video(&self) -> bool {
        self.kind().as_deref() == Some("video")
    }
}

/// Read-only snapshot of one media file, as supplied by the probing
/// collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaDescriptor {
    /// Source container name ("mkv", "mp4", ...).
    pub container: String,
    /// File size in bytes.
    pub file_size: u64,
    /// Container-level duration. May be absent; the planner then falls
    /// back to the first stream's duration.
    pub duration_secs: Option<f64>,
    /// Ordered stream sequence, as probed.
    pub streams: Vec<StreamInfo>,
}

impl MediaDescriptor {
    /// Whether the file carries at least one video stream.
    pub fn is_video(&self) -> bool {
        self.streams.iter().any(StreamInfo::is_video)
    }

    /// Container duration with per-stream fallback, in seconds.
    pub fn effective_duration_secs(&self) -> Option<f64> {
        self.duration_secs
            .filter(|d| *d > 0.0)
            .or_else(|| self.streams.first().and_then(|s| s.duration_secs))
            .filter(|d| *d > 0.0)
    }
}

/// Raw ffprobe JSON structures for parsing.
mod ffprobe_json {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct FfprobeOutput {
        pub streams: Option<Vec<Stream>>,
        pub format: Option<Format>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Stream {
        pub codec_name: Option<String>,
        pub codec_type: Option<String>,
        pub width: Option<u32>,
        pub height: Option<u32>,
        pub profile: Option<String>,
        pub bits_per_raw_sample: Option<String>,
        pub duration: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Format {
        pub filename: Option<String>,
        pub format_name: Option<String>,
        pub duration: Option<String>,
        pub size: Option<String>,
    }
}

/// Parse an ffprobe JSON document into a [`MediaDescriptor`].
pub fn parse_probe(json: &str) -> Result<MediaDescriptor, ProbeError> {
    let raw: ffprobe_json::FfprobeOutput = serde_json::from_str(json)?;
    let format = raw.format.ok_or(ProbeError::MissingFormat)?;

    // Prefer the filename extension as the container name; ffprobe's
    // format_name is a demuxer list ("matroska,webm") and only its first
    // token is useful as a fallback.
    let container = format
        .filename
        .as_deref()
        .map(Path::new)
        .and_then(|p| p.extension())
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .or_else(|| {
            format
                .format_name
                .as_deref()
                .and_then(|n| n.split(',').next())
                .map(str::to_ascii_lowercase)
        })
        .unwrap_or_default();

    let streams = raw
        .streams
        .unwrap_or_default()
        .into_iter()
        .map(|s| StreamInfo {
            codec_name: s.codec_name,
            codec_type: s.codec_type,
            width: s.width,
            height: s.height,
            profile: s.profile,
            bits_per_raw_sample: s.bits_per_raw_sample,
            duration_secs: s.duration.as_deref().and_then(|d| d.parse().ok()),
        })
        .collect();

    Ok(MediaDescriptor {
        container,
        file_size: format
            .size
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0),
        duration_secs: format.duration.as_deref().and_then(|d| d.parse().ok()),
        streams,
    })
}

/// Read and parse a probe document from disk.
pub fn load_probe(path: &Path) -> Result<MediaDescriptor, ProbeError> {
    let contents = std::fs::read_to_string(path)?;
    parse_probe(&contents)
}
