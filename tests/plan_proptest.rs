//! Property-based tests for the bitrate budget and the planner's
//! skip/transcode invariants.

use ffplan::config::PolicyConfig;
use ffplan::engine::plan::DiagnosticLog;
use ffplan::engine::{bitrate, plan, profile};
use ffplan::probe::{MediaDescriptor, StreamInfo};
use proptest::prelude::*;

fn any_profile() -> impl Strategy<Value = &'static profile::QualityProfile> {
    (0..profile::QUALITY_PROFILES.len()).prop_map(|i| &profile::QUALITY_PROFILES[i])
}

fn media_1080p(kbps: u64, codec: &str, width: u32, height: u32) -> MediaDescriptor {
    MediaDescriptor {
        container: "mkv".to_string(),
        file_size: kbps * 125 * 3600,
        duration_secs: Some(3600.0),
        streams: vec![StreamInfo {
            codec_name: Some(codec.to_string()),
            codec_type: Some("video".to_string()),
            width: Some(width),
            height: Some(height),
            ..StreamInfo::default()
        }],
    }
}

proptest! {
    /// minimum <= target <= maximum, and the target never exceeds the
    /// source's own bitrate.
    #[test]
    fn budget_bounds_always_ordered(
        profile in any_profile(),
        file_size in 1_000_000u64..100_000_000_000,
        duration_secs in 1.0f64..36_000.0,
        scaledown in 1.0f64..10.0,
        floor in prop::option::of(100u32..5_000),
        ceiling_extra in 1u32..30_000,
    ) {
        let policy = PolicyConfig {
            quality: profile.label.to_string(),
            bitrate_scaledown_factor: scaledown,
            bitrate_floor: floor,
            // Keep ceiling strictly above any generated floor
            bitrate_ceiling: Some(floor.unwrap_or(0) + ceiling_extra),
            ..PolicyConfig::default()
        };
        prop_assume!(policy.validate().is_ok());

        let mut log = DiagnosticLog::default();
        let budget = bitrate::compute_budget(&policy, profile, file_size, duration_secs, &mut log);

        prop_assert!(budget.minimum <= budget.target);
        prop_assert!(budget.target <= budget.maximum);
        prop_assert!(budget.target <= budget.current);
    }

    /// Increasing the scaledown factor never increases the target.
    #[test]
    fn scaledown_is_monotonic(
        profile in any_profile(),
        file_size in 1_000_000u64..100_000_000_000,
        duration_secs in 1.0f64..36_000.0,
        lower in 1.0f64..10.0,
        bump in 0.0f64..10.0,
    ) {
        let base = PolicyConfig {
            quality: profile.label.to_string(),
            bitrate_scaledown_factor: lower,
            ..PolicyConfig::default()
        };
        let stronger = PolicyConfig {
            bitrate_scaledown_factor: lower + bump,
            ..base.clone()
        };

        let mut log = DiagnosticLog::default();
        let target_base =
            bitrate::compute_budget(&base, profile, file_size, duration_secs, &mut log).target;
        let target_stronger =
            bitrate::compute_budget(&stronger, profile, file_size, duration_secs, &mut log).target;

        prop_assert!(target_stronger <= target_base);
    }

    /// Violating the ceiling > floor precondition always yields a skip,
    /// regardless of the file.
    #[test]
    fn inverted_bounds_never_process(
        floor in 1u32..50_000,
        gap in 0u32..1_000,
        kbps in 100u64..50_000,
    ) {
        let policy = PolicyConfig {
            bitrate_floor: Some(floor),
            bitrate_ceiling: Some(floor.saturating_sub(gap)),
            ..PolicyConfig::default()
        };
        let media = media_1080p(kbps, "h264", 1920, 1080);
        let decision = plan(&media, &policy);
        prop_assert!(!decision.should_process);
        prop_assert!(decision.log[0].contains("Configuration error"));
    }

    /// A file already compliant with every predicate is never re-encoded.
    #[test]
    fn compliant_files_are_idempotent(
        kbps in 100u64..=4_950,
        width in 320u32..=1920,
        height in 180u32..=1080,
    ) {
        // Default policy: 1080p @ 4500 kbps, mkv, ceiling 20000, no floor.
        // Tolerance admits anything at or below 4950 kbps.
        let media = media_1080p(kbps, "hevc", width, height);
        let decision = plan(&media, &PolicyConfig::default());
        prop_assert!(!decision.should_process, "log: {:?}", decision.log);
        prop_assert!(decision.args.is_empty());
    }

    /// Every transcode decision carries the requeue flag and a non-empty
    /// argument list ending in deterministic order.
    #[test]
    fn transcode_decisions_always_requeue(
        kbps in 5_500u64..50_000,
        width in 320u32..=3840,
        height in 180u32..=2160,
    ) {
        let media = media_1080p(kbps, "h264", width, height);
        let decision = plan(&media, &PolicyConfig::default());
        // h264 codec always fails the codec predicate
        prop_assert!(decision.should_process);
        prop_assert!(decision.requeue_after);
        prop_assert!(!decision.args.is_empty());
    }
}
