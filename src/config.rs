use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::repository::TemplateRepository;

// App settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Overrides the default location of the template data file.
    pub data_file: Option<String>,
}

impl Settings {
    /// The effective data-file path: the configured override, or the
    /// default under the user's documents directory.
    pub fn data_path(&self) -> PathBuf {
        self.data_file
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(TemplateRepository::default_data_path)
    }
}

// Get settings file path
fn settings_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().context("no config directory for this platform")?;
    let app_dir = config_dir.join("template-manager");
    std::fs::create_dir_all(&app_dir)?;
    Ok(app_dir.join("settings.json"))
}

/// Load settings from disk, falling back to defaults on any failure.
pub fn load_settings() -> Settings {
    let path = match settings_path() {
        Ok(p) => p,
        Err(_) => return Settings::default(),
    };

    if path.exists() {
        std::fs::read_to_string(&path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    } else {
        Settings::default()
    }
}

/// Save settings to disk.
pub fn save_settings(settings: &Settings) -> Result<()> {
    let path = settings_path()?;
    let content = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_round_trip() {
        let settings = Settings {
            data_file: Some("/tmp/custom/templates.json".to_string()),
        };
        let json = serde_json::to_string(&settings).unwrap();
        assert!(json.contains("\"dataFile\""));

        let parsed: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.data_file, settings.data_file);
    }

    #[test]
    fn test_unknown_fields_are_tolerated() {
        let parsed: Settings =
            serde_json::from_str(r#"{ "dataFile": null, "theme": "dark" }"#).unwrap();
        assert_eq!(parsed.data_file, None);
    }

    #[test]
    fn test_data_path_override() {
        let settings = Settings {
            data_file: Some("/tmp/custom/templates.json".to_string()),
        };
        assert_eq!(
            settings.data_path(),
            PathBuf::from("/tmp/custom/templates.json")
        );

        let defaults = Settings::default();
        assert!(defaults.data_path().ends_with("templates.json"));
    }
}
