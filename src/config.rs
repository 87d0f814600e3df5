use std::path::{Path, PathBuf};

use chrono::Duration;
use chrono_tz::Tz;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::{
    charts::cursor::DEFAULT_CURSOR_TOLERANCE_MINUTES,
    day::{DEFAULT_TIMEZONE, parse_timezone},
    errors::GlucodayError,
};

const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// IANA name of the zone local days are computed in
    pub timezone: String,
    /// Dump loaded when no input file is given
    pub data_file: Option<PathBuf>,
    pub cursor_tolerance_minutes: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            timezone: DEFAULT_TIMEZONE.name().to_string(),
            data_file: None,
            cursor_tolerance_minutes: DEFAULT_CURSOR_TOLERANCE_MINUTES,
        }
    }
}

fn config_path() -> Option<PathBuf> {
    Some(dirs::config_dir()?.join("glucoday").join(CONFIG_FILE_NAME))
}

impl AppConfig {
    pub fn from_local_file() -> Result<Option<Self>, GlucodayError> {
        match config_path() {
            Some(path) => Self::from_path(&path),
            None => Ok(None),
        }
    }

    pub fn from_path(config_path: &Path) -> Result<Option<Self>, GlucodayError> {
        if !config_path.exists() {
            return Ok(None);
        }
        let file = std::fs::File::open(config_path)
            .map_err(|e| GlucodayError::ConfigIOError { source: e })?;
        serde_json::from_reader(file)
            .map(Some)
            .map_err(|e| GlucodayError::ConfigSerializeError { source: e })
    }

    pub fn save(&self) -> Result<(), GlucodayError> {
        let config_path = config_path().ok_or(GlucodayError::NoConfigDir)?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<(), GlucodayError> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| GlucodayError::ConfigIOError { source: e })?;
        }

        let file = std::fs::File::create(config_path)
            .map_err(|e| GlucodayError::ConfigIOError { source: e })?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| GlucodayError::ConfigSerializeError { source: e })
    }

    pub fn timezone(&self) -> Result<Tz, GlucodayError> {
        parse_timezone(&self.timezone)
    }

    pub fn cursor_tolerance(&self) -> Duration {
        if self.cursor_tolerance_minutes <= 0 {
            warn!(
                "Ignoring cursor tolerance of {} minutes",
                self.cursor_tolerance_minutes
            );
            return Duration::minutes(DEFAULT_CURSOR_TOLERANCE_MINUTES);
        }
        Duration::minutes(self.cursor_tolerance_minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, tempdir};

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.timezone().unwrap(), DEFAULT_TIMEZONE);
        assert_eq!(config.cursor_tolerance(), Duration::minutes(2));
        assert!(config.data_file.is_none());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);
        let config = AppConfig {
            timezone: "Europe/London".to_string(),
            data_file: Some(PathBuf::from("/data/glucoseData.json")),
            cursor_tolerance_minutes: 5,
        };
        config.save_to(&path).unwrap();

        let loaded = AppConfig::from_path(&path).unwrap().unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.timezone().unwrap(), chrono_tz::Europe::London);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"cursor_tolerance_minutes": 0}}"#).unwrap();
        file.flush().unwrap();

        let loaded = AppConfig::from_path(file.path()).unwrap().unwrap();
        assert_eq!(loaded.timezone, DEFAULT_TIMEZONE.name());
        assert_eq!(loaded.cursor_tolerance(), Duration::minutes(2));
    }

    #[test]
    fn test_missing_file_and_bad_timezone() {
        let dir = tempdir().unwrap();
        assert!(
            AppConfig::from_path(&dir.path().join(CONFIG_FILE_NAME))
                .unwrap()
                .is_none()
        );

        let config = AppConfig {
            timezone: "Mars/Olympus".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.timezone(),
            Err(GlucodayError::UnknownTimezone { .. })
        ));
    }
}
