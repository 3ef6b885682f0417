//! Driver configuration.
//!
//! Settings are read from a YAML file and then overridden by environment
//! variables:
//! - `RKFLEX_CONFIG`: config file path when `--config` is not given.
//! - `RKFLEX_STATE_ROOT`: directory of the local control plane.
//! - `RKFLEX_LOG_PATH`: log file (stdout is reserved for the JSON reply).
//! - `RKFLEX_LOG`: `tracing` filter directive, e.g. `debug` or `libflexvol=trace`.
//! - `RKFLEX_LOG_FORMAT`: `text` or `json`.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

pub static DEFAULT_CONFIG_PATH: &str = "/etc/rkflex/rkflex.yaml";
static DEFAULT_STATE_ROOT: &str = "/var/lib/rkflex";
static DEFAULT_LOG_PATH: &str = "/var/log/rkflex/rkflex.log";

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => bail!("unknown log format {other:?}, expected text or json"),
        }
    }
}

/// Configuration for the rkflex driver
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PluginConfig {
    pub state_root: PathBuf,
    pub log_path: PathBuf,
    pub log_format: LogFormat,
    pub log_filter: String,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            state_root: PathBuf::from(DEFAULT_STATE_ROOT),
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
            log_format: LogFormat::Text,
            log_filter: "info".to_owned(),
        }
    }
}

impl PluginConfig {
    /// Load the configuration.
    ///
    /// An explicitly named file (flag or `RKFLEX_CONFIG`) must exist; the
    /// default file is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let named = explicit
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os("RKFLEX_CONFIG").map(PathBuf::from));

        let mut config = match named {
            Some(path) => Self::from_file(&path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {:?}", path))
    }

    /// Apply `RKFLEX_*` overrides using `lookup` to read variables.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(root) = lookup("RKFLEX_STATE_ROOT") {
            self.state_root = PathBuf::from(root);
        }
        if let Some(path) = lookup("RKFLEX_LOG_PATH") {
            self.log_path = PathBuf::from(path);
        }
        if let Some(filter) = lookup("RKFLEX_LOG") {
            self.log_filter = filter;
        }
        if let Some(format) = lookup("RKFLEX_LOG_FORMAT") {
            self.log_format = format.parse().context("Invalid RKFLEX_LOG_FORMAT")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults() {
        let config = PluginConfig::default();
        assert_eq!(config.state_root, PathBuf::from("/var/lib/rkflex"));
        assert_eq!(config.log_format, LogFormat::Text);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("rkflex.yaml");
        fs::write(&path, "state_root: /srv/volumes\nlog_format: json\n").unwrap();

        let config = PluginConfig::from_file(&path).unwrap();
        assert_eq!(config.state_root, PathBuf::from("/srv/volumes"));
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.log_path, PathBuf::from("/var/log/rkflex/rkflex.log"));
    }

    #[test]
    fn empty_file_is_default() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("rkflex.yaml");
        fs::write(&path, "\n").unwrap();
        assert_eq!(PluginConfig::from_file(&path).unwrap(), PluginConfig::default());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = PluginConfig::load(Some(Path::new("/nonexistent/rkflex.yaml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn env_overrides() {
        let vars = HashMap::from([
            ("RKFLEX_STATE_ROOT", "/data/flex"),
            ("RKFLEX_LOG", "debug"),
            ("RKFLEX_LOG_FORMAT", "JSON"),
        ]);
        let mut config = PluginConfig::default();
        config
            .apply_env(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.state_root, PathBuf::from("/data/flex"));
        assert_eq!(config.log_filter, "debug");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.log_path, PathBuf::from("/var/log/rkflex/rkflex.log"));
    }

    #[test]
    fn bad_log_format_is_rejected() {
        let mut config = PluginConfig::default();
        let err = config
            .apply_env(|key| (key == "RKFLEX_LOG_FORMAT").then(|| "xml".to_owned()))
            .unwrap_err();
        assert!(format!("{err:#}").contains("unknown log format"));
    }
}
