use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::cache::DeviceRole;

/// Identity of one of the two fixed peer devices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub role: DeviceRole,
    pub name: String,
    pub address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    pub devices: [DeviceConfig; 2],
    /// Delay between characteristic reads in a device loop.
    pub poll_interval_ms: u64,
    /// Cadence of the posture monitoring tick.
    pub monitor_interval_ms: u64,
    pub db_path: PathBuf,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            devices: [
                DeviceConfig {
                    role: DeviceRole::Upper,
                    name: "Upper".into(),
                    address: "F0:CF:41:E5:1F:D5".into(),
                },
                DeviceConfig {
                    role: DeviceRole::Lower,
                    name: "Lower".into(),
                    address: "4C:EB:D6:4D:3B:BA".into(),
                },
            ],
            poll_interval_ms: 50,
            monitor_interval_ms: 500,
            db_path: PathBuf::from("posture.sqlite3"),
        }
    }
}

impl MonitorConfig {
    /// Load from a JSON file, falling back to defaults when the file does
    /// not exist or fails to parse.
    pub fn load(path: &PathBuf) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        Ok(serde_json::from_str(&contents).unwrap_or_default())
    }

    pub fn save(&self, path: &PathBuf) -> Result<()> {
        let serialized = serde_json::to_string_pretty(self)?;
        fs::write(path, serialized)
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }

    pub fn device(&self, role: DeviceRole) -> &DeviceConfig {
        self.devices
            .iter()
            .find(|d| d.role == role)
            .expect("both device roles are always configured")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_both_roles() {
        let config = MonitorConfig::default();
        assert_eq!(config.device(DeviceRole::Upper).role, DeviceRole::Upper);
        assert_eq!(config.device(DeviceRole::Lower).role, DeviceRole::Lower);
        assert_eq!(config.poll_interval_ms, 50);
        assert_eq!(config.monitor_interval_ms, 500);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.json");
        let config = MonitorConfig::load(&path).unwrap();
        assert_eq!(config.poll_interval_ms, 50);
    }

    #[test]
    fn save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut config = MonitorConfig::default();
        config.poll_interval_ms = 100;
        config.save(&path).unwrap();

        let loaded = MonitorConfig::load(&path).unwrap();
        assert_eq!(loaded.poll_interval_ms, 100);
    }
}
