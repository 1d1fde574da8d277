use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.toml";

/// Application settings, persisted as TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// "auto", "nl-nl" or "en-us"
    pub language: String,
    /// Directory with `<code>.toml` language packs overriding the built-in ones.
    pub language_pack_dir: Option<String>,
    /// Where the terminal binary writes reports when no path is given.
    pub report_dir: PathBuf,
    pub window_alpha: f32,
    /// GUI font file replacing the built-in proportional font.
    pub font_path: Option<String>,
    /// Default tracing filter level; `RUST_LOG` wins when set.
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: "auto".into(),
            language_pack_dir: None,
            report_dir: PathBuf::from("."),
            window_alpha: 1.0,
            font_path: None,
            log_level: "warn".into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("config serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Loads `config.toml`, writing the defaults first if it does not exist.
pub fn load_or_default() -> Result<Config, ConfigError> {
    load_or_create(Path::new(CONFIG_FILE))
}

/// Same as [`load_or_default`] for an explicit path.
pub fn load_or_create(path: &Path) -> Result<Config, ConfigError> {
    if path.exists() {
        load_from(path)
    } else {
        let cfg = Config::default();
        cfg.save_to(path)?;
        tracing::info!(path = %path.display(), "default config written");
        Ok(cfg)
    }
}

pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path)?;
    let cfg: Config = toml::from_str(&content)?;
    tracing::debug!(path = %path.display(), "config loaded");
    Ok(cfg)
}

impl Config {
    /// Saves to `config.toml` in the working directory.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(Path::new(CONFIG_FILE))
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = load_or_create(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn saved_settings_are_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config {
            language: "nl-nl".into(),
            report_dir: PathBuf::from("reports"),
            window_alpha: 0.8,
            ..Config::default()
        };
        cfg.save_to(&path).unwrap();
        assert_eq!(load_from(&path).unwrap(), cfg);
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "language = \"en-us\"\n").unwrap();
        let cfg = load_from(&path).unwrap();
        assert_eq!(cfg.language, "en-us");
        assert_eq!(cfg.window_alpha, 1.0);
        assert_eq!(cfg.log_level, "warn");
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "language = [").unwrap();
        assert!(matches!(load_from(&path), Err(ConfigError::Parse(_))));
    }
}
