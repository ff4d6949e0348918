use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::config::DriverSettings;

/// Load driver settings from a JSON file.
pub fn load_settings<P: AsRef<Path>>(path: P) -> Result<DriverSettings, AppError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::FileRead(format!("{}: {}", path.display(), e)))?;
    let settings: DriverSettings = serde_json::from_str(&raw).map_err(|e| {
        AppError::InvalidConfig(format!("{} is not valid settings JSON: {}", path.display(), e))
    })?;
    info!("Loaded driver settings from {}", path.display());
    Ok(settings)
}

/// Load settings from `path` when given. A missing file falls back to defaults;
/// a file that exists but does not parse is an error.
pub fn load_optional_settings(path: Option<&Path>) -> Result<DriverSettings, AppError> {
    match path {
        Some(p) if p.exists() => load_settings(p),
        Some(p) => {
            warn!("Settings file {} not found, using defaults", p.display());
            Ok(DriverSettings::default())
        }
        None => Ok(DriverSettings::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let settings = load_optional_settings(Some(Path::new("/no/such/settings.json"))).unwrap();
        assert_eq!(settings, DriverSettings::default());
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            load_optional_settings(Some(path.as_path())),
            Err(AppError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_loads_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let json = r#"{"webdriver_url": "http://127.0.0.1:9515", "headless": true}"#;
        fs::write(&path, json).unwrap();
        let settings = load_settings(&path).unwrap();
        assert_eq!(settings.webdriver_url, "http://127.0.0.1:9515");
        assert!(settings.headless);
        assert_eq!(settings.element_wait_ms, 10_000);
    }
}
