//! Application configuration.
//!
//! The configuration is loaded from `$XDG_CONFIG_HOME/gridwm/config.json`.
//! Every section is optional and falls back to compiled-in defaults, so a
//! minimal `{}` file is valid.
//!
//! # Example
//!
//! ```json
//! {
//!   "workspaces": {
//!     "preallocated": 10,
//!     "limit": 64,
//!     "out_of_range": "grow"
//!   },
//!   "monitors": [
//!     { "name": "DP-1", "x": 0, "y": 0, "width": 2560, "height": 1440 },
//!     { "name": "HDMI-A-1", "x": 2560, "y": 0, "width": 1920, "height": 1080 }
//!   ],
//!   "socket_path": "/run/user/1000/gridwm.sock"
//! }
//! ```

use crate::geometry::MonitorInfo;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Workspace slot allocation.
    #[serde(default)]
    pub workspaces: WorkspaceConfig,

    /// Outputs reported by the headless backend.  Real transports discover
    /// their monitors themselves and ignore this list.
    #[serde(default = "default_monitors")]
    pub monitors: Vec<MonitorInfo>,

    /// Where the command socket is bound.  Defaults to
    /// `$XDG_RUNTIME_DIR/gridwm.sock`.
    #[serde(default)]
    pub socket_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workspaces: WorkspaceConfig::default(),
            monitors: default_monitors(),
            socket_path: None,
        }
    }
}

fn default_monitors() -> Vec<MonitorInfo> {
    vec![MonitorInfo {
        name: "default".into(),
        x: 0,
        y: 0,
        width: 1920,
        height: 1080,
    }]
}

/// What a workspace number above the allocated slots means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutOfRangePolicy {
    /// Allocate empty slots up to the requested number, within `limit`.
    #[default]
    Grow,
    /// Refuse the command.
    Reject,
}

/// Workspace slot allocation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Slots created at startup.  Always at least one per monitor.
    pub preallocated: usize,
    /// Highest workspace number [`OutOfRangePolicy::Grow`] will allocate.
    pub limit: usize,
    pub out_of_range: OutOfRangePolicy,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            preallocated: 10,
            limit: 64,
            out_of_range: OutOfRangePolicy::Grow,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_full_config() {
        let json = r#"{
            "workspaces": { "preallocated": 4, "limit": 8, "out_of_range": "reject" },
            "monitors": [
                { "name": "DP-1", "x": 0, "y": 0, "width": 2560, "height": 1440 },
                { "name": "DP-2", "x": 2560, "y": 0, "width": 1920, "height": 1080 }
            ],
            "socket_path": "/tmp/grid.sock"
        }"#;
        let cfg: Config = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.workspaces.preallocated, 4);
        assert_eq!(cfg.workspaces.limit, 8);
        assert_eq!(cfg.workspaces.out_of_range, OutOfRangePolicy::Reject);
        assert_eq!(cfg.monitors.len(), 2);
        assert_eq!(cfg.monitors[1].x, 2560);
        assert_eq!(cfg.socket_path, Some(PathBuf::from("/tmp/grid.sock")));
    }

    #[test]
    fn deserialize_empty_uses_defaults() {
        let cfg: Config = serde_json::from_str("{}").unwrap();
        let wd = WorkspaceConfig::default();
        assert_eq!(cfg.workspaces.preallocated, wd.preallocated);
        assert_eq!(cfg.workspaces.limit, wd.limit);
        assert_eq!(cfg.workspaces.out_of_range, OutOfRangePolicy::Grow);
        assert_eq!(cfg.monitors, default_monitors());
        assert!(cfg.socket_path.is_none());
    }

    #[test]
    fn deserialize_partial_workspaces() {
        let cfg: Config = serde_json::from_str(r#"{ "workspaces": { "limit": 12 } }"#).unwrap();
        assert_eq!(cfg.workspaces.limit, 12);
        assert_eq!(cfg.workspaces.preallocated, 10);
    }

    #[test]
    fn unknown_top_level_keys_ignored() {
        let json = r#"{ "workspaces": {}, "keybindings": { "Mod4+h": "h" } }"#;
        let _cfg: Config = serde_json::from_str(json).unwrap();
    }

    #[test]
    fn load_reports_missing_file() {
        let err = Config::load(Path::new("/nonexistent/gridwm/config.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
