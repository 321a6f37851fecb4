//! Settings management

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming an optional JSON settings file
pub const SWSCREEN_CONFIG: &str = "SWSCREEN_CONFIG";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Selection settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub hardware: HardwareSettings,
}

/// Device layout for the render-only hardware backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HardwareSettings {
    /// Kernel/display device node
    pub kernel_device_path: PathBuf,
    /// Directory scanned for DRM render nodes
    pub render_node_dir: PathBuf,
    /// sysfs DRM class directory
    pub sysfs_drm_dir: PathBuf,
    /// Render-node drivers usable with a kernel device that is not itself a
    /// DRM node. Empty accepts any render node.
    pub compatible_render_drivers: Vec<String>,
    /// Device index handed to the driver when the kernel device cannot be
    /// opened. `None` makes that open failure fatal for the backend.
    pub fallback_device_index: Option<u32>,
    /// Initial capacity of the scanout table
    pub scanout_bucket_hint: usize,
}

impl Default for HardwareSettings {
    fn default() -> Self {
        Self {
            kernel_device_path: PathBuf::from("/dev/kgsl-3d0"),
            render_node_dir: PathBuf::from("/dev/dri"),
            sysfs_drm_dir: PathBuf::from("/sys/class/drm"),
            compatible_render_drivers: vec!["msm".into(), "kgsl".into()],
            fallback_device_index: Some(3),
            scanout_bucket_hint: 64,
        }
    }
}

impl Settings {
    /// Load settings from a JSON file. Missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = serde_json::from_str(&text).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Load from `$SWSCREEN_CONFIG` if set, defaults otherwise.
    pub fn from_env() -> Result<Self, SettingsError> {
        match std::env::var_os(SWSCREEN_CONFIG) {
            Some(path) if !path.is_empty() => Self::load(Path::new(&path)),
            _ => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_kgsl_layout() {
        let hw = Settings::default().hardware;
        assert_eq!(hw.kernel_device_path, PathBuf::from("/dev/kgsl-3d0"));
        assert_eq!(hw.fallback_device_index, Some(3));
        assert_eq!(hw.scanout_bucket_hint, 64);
        assert_eq!(hw.compatible_render_drivers, ["msm", "kgsl"]);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let settings: Settings = serde_json::from_str(
            r#"{ "hardware": { "compatible_render_drivers": [], "fallback_device_index": null } }"#,
        )
        .unwrap();
        assert!(settings.hardware.compatible_render_drivers.is_empty());
        assert_eq!(settings.hardware.fallback_device_index, None);
        assert_eq!(settings.hardware.render_node_dir, PathBuf::from("/dev/dri"));
    }

    #[test]
    fn load_reports_path_on_parse_error() {
        let path =
            std::env::temp_dir().join(format!("swscreen-settings-{}.json", std::process::id()));
        std::fs::write(&path, "{ not json").unwrap();
        let err = Settings::load(&path).unwrap_err();
        let _ = std::fs::remove_file(&path);
        assert!(matches!(err, SettingsError::Parse { .. }));
        assert!(err.to_string().contains("swscreen-settings-"));
    }

    #[test]
    fn load_missing_file_is_read_error() {
        let err = Settings::load(Path::new("/nonexistent/swscreen.json")).unwrap_err();
        assert!(matches!(err, SettingsError::Read { .. }));
    }
}
