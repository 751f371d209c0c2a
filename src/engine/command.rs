//! Encoder argument synthesis.
//!
//! Arguments are collected as a structured, ordered token list and
//! serialized once, so spacing and ordering stay deterministic and
//! testable.

use crate::config::{PolicyConfig, RateControl};
use crate::engine::bitrate::{BitrateBudget, constant_quality_value};
use crate::engine::profile::QualityProfile;
use crate::engine::streams::{Removal, StreamAnalysis};

/// Target encoder for every synthesized command.
pub const TARGET_ENCODER: &str = "hevc_nvenc";

/// Containers whose timestamps are unreliable enough to need
/// regeneration on remux.
const GENPTS_CONTAINERS: &[&str] = &["ts", "avi"];

/// One hardware decoder mapping. `ten_bit_capable` records whether the
/// decode path survives 10-bit/HDR input; when it does not, the engine
/// falls back to software decode for such sources.
///
/// TODO: verify the 10-bit capability column against NVDEC support
/// matrices; today only the h264 path is known-bad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HwDecoder {
    pub codec: &'static str,
    pub decoder: &'static str,
    pub ten_bit_capable: bool,
}

/// Codec families with a known NVDEC (cuvid) decoder. Codecs outside the
/// table decode in software by omission.
pub const CUVID_DECODERS: &[HwDecoder] = &[
    HwDecoder { codec: "h263", decoder: "h263_cuvid", ten_bit_capable: true },
    HwDecoder { codec: "h264", decoder: "h264_cuvid", ten_bit_capable: false },
    HwDecoder { codec: "mjpeg", decoder: "mjpeg_cuvid", ten_bit_capable: true },
    HwDecoder { codec: "mpeg1video", decoder: "mpeg1_cuvid", ten_bit_capable: true },
    HwDecoder { codec: "mpeg2video", decoder: "mpeg2_cuvid", ten_bit_capable: true },
    HwDecoder { codec: "mpeg4", decoder: "mpeg4_cuvid", ten_bit_capable: true },
    HwDecoder { codec: "vc1", decoder: "vc1_cuvid", ten_bit_capable: true },
    HwDecoder { codec: "vp8", decoder: "vp8_cuvid", ten_bit_capable: true },
];

/// Pick the hardware decode flag value for a source codec, or `None` for
/// software decode (unknown codec, or 10-bit input on an incapable path).
pub fn hardware_decoder(codec: Option<&str>, ten_bit: bool) -> Option<&'static str> {
    let codec = codec?;
    CUVID_DECODERS
        .iter()
        .find(|d| d.codec == codec)
        .filter(|d| d.ten_bit_capable || !ten_bit)
        .map(|d| d.decoder)
}

/// Ordered flag/value token list for one encoder invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgList(Vec<String>);

impl ArgList {
    pub fn flag(&mut self, flag: &str) {
        self.0.push(flag.to_string());
    }

    pub fn pair(&mut self, flag: &str, value: impl ToString) {
        self.0.push(flag.to_string());
        self.0.push(value.to_string());
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }

    /// Shell-safe rendering for display; tokens are quoted only when
    /// needed.
    pub fn to_command_line(&self) -> String {
        shlex::try_join(self.0.iter().map(String::as_str)).unwrap_or_else(|_| self.0.join(" "))
    }
}

/// Assemble the full encoder argument list in the fixed synthesis order.
#[allow(clippy::too_many_arguments)]
pub fn synthesize(
    policy: &PolicyConfig,
    profile: &QualityProfile,
    analysis: &StreamAnalysis,
    budget: &BitrateBudget,
    source_codec: Option<&str>,
    source_width: Option<u32>,
    source_height: Option<u32>,
    output_container: &str,
) -> ArgList {
    let mut args = ArgList::default();

    // Input-side options: hardware decode and timestamp regeneration.
    if let Some(decoder) = hardware_decoder(source_codec, analysis.ten_bit) {
        args.pair("-c:v", decoder);
    }
    if GENPTS_CONTAINERS.contains(&output_container.to_ascii_lowercase().as_str()) {
        args.pair("-fflags", "+genpts");
    }

    args.pair("-map", "0");
    args.pair("-c:v", TARGET_ENCODER);

    match policy.rate_control {
        RateControl::Bitrate => {
            args.pair("-cq:v", 19);
            args.pair("-b:v", format!("{}k", budget.target));
            args.pair("-minrate", format!("{}k", budget.minimum));
            args.pair("-maxrate", format!("{}k", budget.maximum));
            args.pair("-bufsize", format!("{}k", budget.current));
        }
        RateControl::ConstantQuality => {
            args.pair("-cq:v", constant_quality_value(policy, profile));
        }
    }

    // Fixed quality tuning for NVENC
    args.pair("-spatial_aq:v", 1);
    args.pair("-rc-lookahead:v", 32);

    args.pair("-c:a", "copy");
    args.pair("-c:s", "copy");
    args.pair("-max_muxing_queue_size", 9999);

    // Downscale only; sources at or below the target keep their size.
    let exceeds_target = source_width.is_some_and(|w| w > profile.width)
        || source_height.is_some_and(|h| h > profile.height);
    if exceeds_target {
        args.pair("-vf", format!("scale=-1:{}", profile.height));
    }

    for removal in &analysis.removals {
        match removal {
            Removal::DataStreams => args.pair("-map", "-0:d"),
            Removal::Stream(index) => args.pair("-map", format!("-0:{index}")),
            Removal::VideoStream(index) => args.pair("-map", format!("-v:{index}")),
        }
    }

    if policy.enable_10bit {
        args.pair("-pix_fmt", "p010le");
    }
    if policy.enable_bframes {
        args.pair("-bf", 5);
    }

    args
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::profile;

    fn budget() -> BitrateBudget {
        BitrateBudget {
            current: 8000,
            target: 4500,
            minimum: 3150,
            maximum: 5850,
        }
    }

    #[test]
    fn test_hardware_decoder_table() {
        assert_eq!(hardware_decoder(Some("h264"), false), Some("h264_cuvid"));
        assert_eq!(hardware_decoder(Some("vc1"), false), Some("vc1_cuvid"));
        // hevc has no cuvid mapping here; software decode by omission
        assert_eq!(hardware_decoder(Some("hevc"), false), None);
        assert_eq!(hardware_decoder(None, false), None);
    }

    #[test]
    fn test_ten_bit_disables_h264_hw_decode_only() {
        assert_eq!(hardware_decoder(Some("h264"), true), None);
        assert_eq!(hardware_decoder(Some("mpeg2video"), true), Some("mpeg2_cuvid"));
    }

    #[test]
    fn test_bitrate_mode_emits_rate_quartet() {
        let policy = PolicyConfig::default();
        let profile = profile::resolve(&policy.quality).unwrap();
        let analysis = StreamAnalysis::default();
        let args = synthesize(
            &policy,
            profile,
            &analysis,
            &budget(),
            Some("h264"),
            Some(1920),
            Some(1080),
            "mkv",
        );
        let line = args.to_command_line();
        assert!(line.contains("-b:v 4500k -minrate 3150k -maxrate 5850k -bufsize 8000k"));
        assert!(line.starts_with("-c:v h264_cuvid -map 0 -c:v hevc_nvenc"));
        // 1080p source, 1080p target: no scale filter
        assert!(!line.contains("-vf"));
    }

    #[test]
    fn test_quality_mode_emits_single_cq() {
        let policy = PolicyConfig {
            rate_control: RateControl::ConstantQuality,
            ..PolicyConfig::default()
        };
        let profile = profile::resolve(&policy.quality).unwrap();
        let args = synthesize(
            &policy,
            profile,
            &StreamAnalysis::default(),
            &budget(),
            Some("hevc"),
            Some(1920),
            Some(1080),
            "mkv",
        );
        let line = args.to_command_line();
        assert!(line.contains("-cq:v 21"));
        assert!(!line.contains("-b:v"));
        assert!(!line.contains("-bufsize"));
    }

    #[test]
    fn test_downscale_filter_only_when_oversized() {
        let policy = PolicyConfig::default();
        let profile = profile::resolve(&policy.quality).unwrap();
        let oversized = synthesize(
            &policy,
            profile,
            &StreamAnalysis::default(),
            &budget(),
            None,
            Some(3840),
            Some(2160),
            "mkv",
        );
        assert!(oversized.to_command_line().contains("-vf scale=-1:1080"));

        let undersized = synthesize(
            &policy,
            profile,
            &StreamAnalysis::default(),
            &budget(),
            None,
            Some(1280),
            Some(720),
            "mkv",
        );
        assert!(!undersized.to_command_line().contains("scale"));
    }

    #[test]
    fn test_genpts_for_unreliable_containers() {
        let policy = PolicyConfig {
            container: "ts".to_string(),
            ..PolicyConfig::default()
        };
        let profile = profile::resolve(&policy.quality).unwrap();
        for (container, expected) in [("ts", true), ("avi", true), ("mkv", false)] {
            let args = synthesize(
                &policy,
                profile,
                &StreamAnalysis::default(),
                &budget(),
                None,
                Some(1920),
                Some(1080),
                container,
            );
            assert_eq!(
                args.to_command_line().contains("-fflags +genpts"),
                expected,
                "container {container}"
            );
        }
    }

    #[test]
    fn test_removals_and_toggles_come_last() {
        let policy = PolicyConfig {
            enable_10bit: true,
            enable_bframes: true,
            ..PolicyConfig::default()
        };
        let profile = profile::resolve(&policy.quality).unwrap();
        let analysis = StreamAnalysis {
            removals: vec![
                Removal::DataStreams,
                Removal::Stream(2),
                Removal::VideoStream(1),
            ],
            ..StreamAnalysis::default()
        };
        let args = synthesize(
            &policy,
            profile,
            &analysis,
            &budget(),
            None,
            Some(1920),
            Some(1080),
            "mkv",
        );
        let line = args.to_command_line();
        assert!(line.ends_with("-map -0:d -map -0:2 -map -v:1 -pix_fmt p010le -bf 5"));
    }
}
