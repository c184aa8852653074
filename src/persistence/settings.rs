use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// User settings stored in settings.json
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Settings {
    /// Create a day entry on Saturdays and Sundays
    #[serde(default = "default_true")]
    pub create_weekend_days: bool,
    /// Carry unfinished tasks forward when creating a new day
    #[serde(default = "default_true")]
    pub auto_carryover: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            create_weekend_days: true,
            auto_carryover: true,
        }
    }
}

/// Load settings from settings.json, defaults if the file doesn't exist
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<Settings> {
    let path = path.as_ref();

    if !path.exists() {
        return Ok(Settings::default());
    }

    let content = std::fs::read_to_string(path)?;
    let settings: Settings = serde_json::from_str(&content)?;
    Ok(settings)
}

/// Save settings to settings.json
pub fn save_settings<P: AsRef<Path>>(path: P, settings: &Settings) -> Result<()> {
    let json = serde_json::to_string_pretty(settings)?;
    crate::persistence::atomic_write(path, &json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_nonexistent_settings() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("settings.json");

        let settings = load_settings(&path).unwrap();
        assert!(settings.create_weekend_days);
        assert!(settings.auto_carryover);
    }

    #[test]
    fn test_save_and_load_settings() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("settings.json");

        let mut settings = Settings::default();
        settings.create_weekend_days = false;

        save_settings(&path, &settings).unwrap();

        let loaded = load_settings(&path).unwrap();
        assert!(!loaded.create_weekend_days);
        assert!(loaded.auto_carryover);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("settings.json");
        std::fs::write(&path, "{}").unwrap();

        let settings = load_settings(&path).unwrap();
        assert!(settings.create_weekend_days);
        assert!(settings.auto_carryover);
    }
}
