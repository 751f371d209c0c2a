// Transcode policy configuration (TOML-backed)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Sentinel container value meaning "keep the source container".
pub const KEEP_ORIGINAL: &str = "original";

/// Rate-control strategy selected by the policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateControl {
    /// Target an average bitrate budget with min/max/buffer bounds.
    #[default]
    Bitrate,
    /// Constant-quality encode (CQ/CRF); bitrate bounds do not apply.
    ConstantQuality,
}

/// Per-library transcode policy.
///
/// Field names and defaults track the operator-facing options of the
/// original plugin: a quality label, an output container (or the
/// "original" sentinel), bitrate shaping knobs, and two encoder toggles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    #[serde(default = "default_quality")]
    pub quality: String,

    /// Output container ("mkv", "mp4", "ts", ...), `original` to keep the
    /// source container. Empty means the policy was never configured.
    #[serde(default = "default_container")]
    pub container: String,

    /// Divisor applied to the profile baseline to bias toward smaller
    /// output. Must be >= 1.
    #[serde(default = "default_scaledown")]
    pub bitrate_scaledown_factor: f64,

    /// Absolute lower bound on the computed target, in kbps.
    #[serde(default)]
    pub bitrate_floor: Option<u32>,

    /// Absolute upper bound on the computed target, in kbps.
    #[serde(default = "default_ceiling")]
    pub bitrate_ceiling: Option<u32>,

    #[serde(default)]
    pub rate_control: RateControl,

    /// Base CQ value for constant-quality mode; the resolution tier of the
    /// selected profile is added on top.
    #[serde(default = "default_constant_quality_base")]
    pub constant_quality_base: u32,

    /// Emit 10-bit output (p010le).
    #[serde(default)]
    pub enable_10bit: bool,

    /// Use B-frames (newer NVENC generations only).
    #[serde(default)]
    pub enable_bframes: bool,
}

fn default_quality() -> String {
    "1080p @ 4500 kbps".to_string()
}

fn default_container() -> String {
    "mkv".to_string()
}

fn default_scaledown() -> f64 {
    1.0
}

fn default_ceiling() -> Option<u32> {
    Some(20000)
}

fn default_constant_quality_base() -> u32 {
    18
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            quality: default_quality(),
            container: default_container(),
            bitrate_scaledown_factor: default_scaledown(),
            bitrate_floor: None,
            bitrate_ceiling: default_ceiling(),
            rate_control: RateControl::default(),
            constant_quality_base: default_constant_quality_base(),
            enable_10bit: false,
            enable_bframes: false,
        }
    }
}

/// Misconfigurations that make the policy unusable for any file.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PolicyError {
    #[error("output container has not been configured")]
    UnsetContainer,

    #[error("unknown quality profile '{0}'")]
    UnknownQuality(String),

    #[error("bitrate_ceiling ({ceiling} kbps) must be greater than bitrate_floor ({floor} kbps)")]
    CeilingBelowFloor { ceiling: u32, floor: u32 },

    #[error("bitrate_scaledown_factor must be at least 1, got {0}")]
    ScaledownTooSmall(f64),
}

impl PolicyConfig {
    /// Check the hard preconditions the engine relies on. A violation is
    /// an operator error, reported once per file as a configuration-error
    /// decision rather than a crash.
    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.container.is_empty() {
            return Err(PolicyError::UnsetContainer);
        }
        if crate::engine::profile::resolve(&self.quality).is_none() {
            return Err(PolicyError::UnknownQuality(self.quality.clone()));
        }
        if let (Some(floor), Some(ceiling)) = (self.bitrate_floor, self.bitrate_ceiling) {
            if ceiling <= floor {
                return Err(PolicyError::CeilingBelowFloor { ceiling, floor });
            }
        }
        if self.bitrate_scaledown_factor < 1.0 {
            return Err(PolicyError::ScaledownTooSmall(self.bitrate_scaledown_factor));
        }
        Ok(())
    }

    /// Get the path to the policy file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "macos") {
            dirs::home_dir()
                .context("Could not determine home directory")?
                .join(".config")
                .join("ffplan")
        } else {
            dirs::config_dir()
                .context("Could not determine config directory")?
                .join("ffplan")
        };

        Ok(config_dir.join("policy.toml"))
    }

    /// Load a policy from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read policy file: {}", path.display()))?;
        let policy: PolicyConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse policy file: {}", path.display()))?;
        Ok(policy)
    }

    /// Load the policy from the default location, falling back to built-in
    /// defaults when no file exists.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(PolicyConfig::default())
        }
    }

    /// Save the policy to disk
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize policy")?;

        fs::write(&config_path, contents)
            .with_context(|| format!("Failed to write policy file: {}", config_path.display()))?;

        Ok(())
    }

    /// Check if a policy file exists
    pub fn exists() -> bool {
        Self::config_path().map(|p| p.exists()).unwrap_or(false)
    }
}
