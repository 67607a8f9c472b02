//! Runtime configuration: defaults, then the optional config file, then
//! environment overrides. Loading never fails; a broken file is logged
//! and ignored so the app always starts.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
    #[serde(default)]
    pub backend_token: Option<String>,
    /// How many entries a history refresh asks for.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    /// Default mood window for the dashboard, in days.
    #[serde(default = "default_window_days")]
    pub window_days: u32,
}

fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}

fn default_history_limit() -> usize {
    50
}

fn default_window_days() -> u32 {
    7
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            backend_token: None,
            history_limit: default_history_limit(),
            window_days: default_window_days(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Self {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Self::default(),
        };
        config.apply_env_overrides();
        config
    }

    /// Read one specific file, falling back to defaults on any problem.
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(raw) => match toml::from_str(&raw) {
                Ok(config) => config,
                Err(error) => {
                    tracing::warn!(
                        "ignoring malformed config at {}: {}",
                        path.display(),
                        error
                    );
                    Self::default()
                }
            },
            Err(error) => {
                tracing::warn!("could not read config at {}: {}", path.display(), error);
                Self::default()
            }
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("REVERIE_BACKEND_URL") {
            if !url.trim().is_empty() {
                self.backend_url = url;
            }
        }
        if let Ok(token) = std::env::var("REVERIE_BACKEND_TOKEN") {
            if !token.trim().is_empty() {
                self.backend_token = Some(token);
            }
        }
    }

    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("reverie").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn file_values_override_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "backend_url = \"http://journal.local:9000\"\nwindow_days = 30"
        )
        .unwrap();

        let config = AppConfig::load_from(file.path());
        assert_eq!(config.backend_url, "http://journal.local:9000");
        assert_eq!(config.window_days, 30);
        // Unspecified fields keep their defaults.
        assert_eq!(config.history_limit, 50);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "backend_url = [this is not toml").unwrap();

        let config = AppConfig::load_from(file.path());
        assert_eq!(config.backend_url, DEFAULT_BACKEND_URL);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/reverie.toml"));
        assert_eq!(config.history_limit, 50);
        assert_eq!(config.window_days, 7);
    }
}
