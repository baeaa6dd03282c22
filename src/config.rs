use crate::error::AppError;
use crate::theme::ColorScheme;
use log::warn;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub color_scheme: ColorScheme,
    pub refresh_interval_ms: u64,
    pub history_points: usize,
    pub disk_mount: String,
    pub process_rows: usize,
    /// Minimum age of a cached tool result before the tool runs again.
    pub command_cache_ms: u64,
    pub command_timeout_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            color_scheme: ColorScheme::default(),
            refresh_interval_ms: 1000,
            history_points: 2048,
            disk_mount: "/".to_string(),
            process_rows: 6,
            command_cache_ms: 900,
            command_timeout_ms: 2000,
        }
    }
}

impl AppConfig {
    /// Saved config, or the defaults when there is none or it is unreadable.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        match Self::load_from(&path) {
            Ok(Some(config)) => config,
            Ok(None) => Self::default(),
            Err(err) => {
                warn!("ignoring {}: {}", path.display(), err);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, AppError> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)?;
        Ok(Some(toml::from_str(&content)?))
    }

    pub fn save(&self) -> Result<(), AppError> {
        let path = Self::config_path().ok_or(AppError::ConfigDirUnavailable)?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), AppError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let toml = toml::to_string_pretty(self)?;
        fs::write(path, toml)?;
        Ok(())
    }

    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("hwtop").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = AppConfig {
            color_scheme: ColorScheme::Nord,
            disk_mount: "/home".into(),
            ..Default::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(AppConfig::load_from(&path).unwrap(), Some(config));
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "color_scheme = \"gruvbox\"\nprocess_rows = 3\n").unwrap();

        let config = AppConfig::load_from(&path).unwrap().unwrap();
        assert_eq!(config.color_scheme, ColorScheme::Gruvbox);
        assert_eq!(config.process_rows, 3);
        assert_eq!(config.refresh_interval_ms, 1000);
        assert_eq!(config.command_cache_ms, 900);
    }

    #[test]
    fn missing_and_invalid_files() {
        let dir = tempfile::tempdir().unwrap();
        assert!(AppConfig::load_from(&dir.path().join("absent.toml")).unwrap().is_none());

        let path = dir.path().join("bad.toml");
        fs::write(&path, "color_scheme = \"sepia\"\n").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(AppError::ConfigParse(_))
        ));
    }
}
