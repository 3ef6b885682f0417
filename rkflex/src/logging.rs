//! `tracing` subscriber setup.
//!
//! Stdout carries the JSON reply to the node agent, so log records go to an
//! append-mode file and only fall back to stderr when it cannot be opened.

use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use crate::config::{LogFormat, PluginConfig};

pub fn init(config: &PluginConfig) -> Result<()> {
    let filter = EnvFilter::try_new(&config.log_filter)
        .with_context(|| format!("Invalid log filter {:?}", config.log_filter))?;

    let writer = match open_log_file(&config.log_path) {
        Ok(file) => BoxMakeWriter::new(Mutex::new(file)),
        Err(e) => {
            eprintln!("rkflex: logging to stderr: {e:#}");
            BoxMakeWriter::new(std::io::stderr)
        }
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false);
    let installed = match config.log_format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| anyhow!("Failed to install tracing subscriber: {e}"))
}

fn open_log_file(path: &Path) -> Result<File> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory {:?}", dir))?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_and_parents_are_created() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("log/nested/rkflex.log");
        open_log_file(&path).unwrap();
        assert!(path.is_file());
        // Reopening appends rather than failing.
        open_log_file(&path).unwrap();
    }

    #[test]
    fn invalid_filter_is_rejected() {
        let config = PluginConfig {
            log_filter: "rkflex=loudest".into(),
            ..PluginConfig::default()
        };
        assert!(init(&config).is_err());
    }
}
