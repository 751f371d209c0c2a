//! Bitrate budget derivation: current bitrate from size/duration, target
//! from the profile baseline with policy clamping.

use crate::config::PolicyConfig;
use crate::engine::plan::DiagnosticLog;
use crate::engine::profile::QualityProfile;

/// Derived rate-control numbers for one file, all in kbps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitrateBudget {
    /// Estimated average bitrate of the source.
    pub current: u32,
    /// Target average bitrate after clamping.
    pub target: u32,
    /// Short-term lower bound (70% of target).
    pub minimum: u32,
    /// Short-term upper bound (130% of target) for action-packed scenes.
    pub maximum: u32,
}

/// Estimate the source's average bitrate in kbps from file size and
/// duration, using the "size = bitrate x minutes x 0.0075" rule of thumb
/// (size in MB). Returns 0 when the duration is unusable.
pub fn current_bitrate_kbps(file_size_bytes: u64, duration_secs: f64) -> u32 {
    if duration_secs <= 0.0 {
        return 0;
    }
    let minutes = duration_secs / 60.0;
    let megabytes = file_size_bytes as f64 / 1_000_000.0;
    (megabytes / (minutes * 0.0075)).round() as u32
}

/// Compute the clamped bitrate budget for one file.
///
/// Clamping order: ceiling cap, floor raise, then cap to the source's own
/// bitrate (never encode above what the source carries). Each applied
/// clamp is reported to the log. `target == 0` signals a degenerate
/// computation upstream; the caller decides to skip.
pub fn compute_budget(
    policy: &PolicyConfig,
    profile: &QualityProfile,
    file_size_bytes: u64,
    duration_secs: f64,
    log: &mut DiagnosticLog,
) -> BitrateBudget {
    let current = current_bitrate_kbps(file_size_bytes, duration_secs);
    let mut target = (profile.baseline_kbps as f64 / policy.bitrate_scaledown_factor) as u32;

    if let Some(ceiling) = policy.bitrate_ceiling {
        if target > ceiling {
            log.push(format!(
                "Proposed bitrate {target} kbps exceeds ceiling. Limiting to {ceiling} kbps."
            ));
            target = ceiling;
        }
    }
    if let Some(floor) = policy.bitrate_floor {
        if target < floor {
            log.push(format!(
                "Proposed bitrate {target} kbps is lower than the floor. Raising to {floor} kbps."
            ));
            target = floor;
        }
    }
    if target > current {
        target = current;
    }

    BitrateBudget {
        current,
        target,
        minimum: (target as u64 * 7 / 10) as u32,
        maximum: (target as u64 * 13 / 10) as u32,
    }
}

/// Constant-quality value for quality-mode policies: the configured base
/// CQ offset by the profile's resolution tier. No floor/ceiling clamping
/// applies in this mode.
pub fn constant_quality_value(policy: &PolicyConfig, profile: &QualityProfile) -> u32 {
    policy.constant_quality_base + profile.tier
}
