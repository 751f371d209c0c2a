//! Fixed quality profile table mapping policy labels to concrete targets.

/// Codec every plan transcodes toward.
pub const TARGET_VIDEO_CODEC: &str = "hevc";

/// One entry of the quality table: a standard 16:9 resolution and the
/// baseline average bitrate appropriate for it. Sources with other aspect
/// ratios are scaled to the vertical height and keep their aspect ratio,
/// so only `height`/`width` bound the resolution check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityProfile {
    pub label: &'static str,
    pub height: u32,
    pub width: u32,
    pub baseline_kbps: u32,
    /// Resolution tier (0 = 360p .. 5 = 4k), used as the CRF offset in
    /// constant-quality mode.
    pub tier: u32,
}

impl QualityProfile {
    /// The resolution part of the label ("1080p @ 4500 kbps" -> "1080p").
    pub fn resolution_label(&self) -> &'static str {
        self.label.split('@').next().unwrap_or(self.label).trim()
    }
}

/// Quality profiles keyed by the policy's quality label.
///
/// Entries are ordered by resolution and baseline bitrate, both strictly
/// non-decreasing (checked by tests).
pub const QUALITY_PROFILES: &[QualityProfile] = &[
    QualityProfile { label: "360p @ 500 kbps", height: 360, width: 640, baseline_kbps: 500, tier: 0 },
    QualityProfile { label: "480p @ 1200 kbps", height: 480, width: 720, baseline_kbps: 1200, tier: 1 },
    QualityProfile { label: "720p @ 1500 kbps", height: 720, width: 1280, baseline_kbps: 1500, tier: 2 },
    QualityProfile { label: "720p @ 3000 kbps", height: 720, width: 1280, baseline_kbps: 3000, tier: 2 },
    QualityProfile { label: "1080p @ 3000 kbps", height: 1080, width: 1920, baseline_kbps: 3000, tier: 3 },
    QualityProfile { label: "1080p @ 4500 kbps", height: 1080, width: 1920, baseline_kbps: 4500, tier: 3 },
    QualityProfile { label: "2k @ 6000 kbps", height: 1440, width: 2560, baseline_kbps: 6000, tier: 4 },
    QualityProfile { label: "2k @ 9000 kbps", height: 1440, width: 2560, baseline_kbps: 9000, tier: 4 },
    QualityProfile { label: "4k @ 13000 kbps", height: 2160, width: 3840, baseline_kbps: 13000, tier: 5 },
    QualityProfile { label: "4k @ 20000 kbps", height: 2160, width: 3840, baseline_kbps: 20000, tier: 5 },
];

/// Resolve a quality label to its profile, or `None` for labels outside
/// the enumerated set.
pub fn resolve(label: &str) -> Option<&'static QualityProfile> {
    QUALITY_PROFILES.iter().find(|p| p.label == label)
}
