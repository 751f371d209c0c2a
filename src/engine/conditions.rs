//! Conformance predicates: is the file already what the policy asks for?
//!
//! Every predicate is evaluated and reported; there is no short-circuit.
//! The operator must be able to see exactly why a file was or wasn't
//! touched.

use crate::config::PolicyConfig;
use crate::engine::profile::{QualityProfile, TARGET_VIDEO_CODEC};
use crate::engine::streams::VideoStreamSummary;
use crate::probe::MediaDescriptor;

/// One evaluated predicate with its operator-facing description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub passed: bool,
    pub description: String,
}

impl Condition {
    fn new(passed: bool, description: String) -> Self {
        Self { passed, description }
    }

    /// Checklist line in the diagnostic transcript.
    pub fn log_line(&self) -> String {
        let mark = if self.passed { "\u{2705}" } else { "\u{274c}" };
        format!("  {mark} {}", self.description)
    }
}

/// The full predicate report for the representative video stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionReport {
    pub conditions: Vec<Condition>,
}

impl ConditionReport {
    /// The file is compliant only when every predicate holds.
    pub fn all_met(&self) -> bool {
        self.conditions.iter().all(|c| c.passed)
    }
}

/// Evaluate all six conformance predicates against the first qualifying
/// video stream. Missing dimensions or codec are treated as failing the
/// corresponding predicate, never as an error.
pub fn evaluate(
    policy: &PolicyConfig,
    profile: &QualityProfile,
    media: &MediaDescriptor,
    video: &VideoStreamSummary,
    output_container: &str,
    current_bitrate: u32,
) -> ConditionReport {
    let codec_match = video.codec.as_deref() == Some(TARGET_VIDEO_CODEC);
    let container_match = media.container.eq_ignore_ascii_case(output_container);
    let resolution_match = match (video.width, video.height) {
        (Some(w), Some(h)) => w <= profile.width && h <= profile.height,
        _ => false,
    };
    // 10% leeway over the baseline before the bitrate counts as off-target
    let bitrate_tolerance = (profile.baseline_kbps as f64 * 1.1) as u32;
    let bitrate_match = current_bitrate <= bitrate_tolerance;
    let ceiling_match = policy
        .bitrate_ceiling
        .is_none_or(|ceiling| current_bitrate <= ceiling);
    let floor_match = policy
        .bitrate_floor
        .is_none_or(|floor| current_bitrate >= floor);

    let conditions = vec![
        Condition::new(codec_match, "Codec is HEVC".to_string()),
        Condition::new(
            container_match,
            format!("Container is {output_container}"),
        ),
        Condition::new(
            resolution_match,
            format!("Resolution is {}", profile.resolution_label()),
        ),
        Condition::new(
            bitrate_match,
            format!("Bitrate is <= {bitrate_tolerance} kbps"),
        ),
        Condition::new(
            ceiling_match,
            "Bitrate is lower than the specified ceiling".to_string(),
        ),
        Condition::new(
            floor_match,
            "Bitrate is higher than the specified floor".to_string(),
        ),
    ];

    ConditionReport { conditions }
}
