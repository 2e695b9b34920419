//! Configuration for the blackbox CLI.
//!
//! Configuration is loaded from several sources, later ones winning:
//! 1. Global config: `~/.config/blackbox/config.json`
//! 2. Project config: `blackbox.json` in the working directory
//! 3. An explicit `--config` file
//! 4. Environment overrides: `BLACKBOX_DATABASE`, `BLACKBOX_LOG_LEVEL`
//!
//! Command-line flags are applied on top by the caller.

use blackbox_util::{path, LogLevel};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

const DEFAULT_CONTEXT_LINES: usize = 3;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid JSON syntax or shape.
    #[error("invalid config at {path}: {message}")]
    InvalidJson { path: String, message: String },

    /// An environment override has an unusable value.
    #[error("invalid value for {name}: {value}")]
    InvalidEnv { name: &'static str, value: String },

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the history database.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<LogLevel>,

    /// Record edits that only change a single line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_one_line_edits: Option<bool>,

    /// Context lines in displayed diffs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_lines: Option<usize>,
}

impl Config {
    /// Load and merge all configuration sources.
    ///
    /// Returns the merged config and the files it was read from.
    pub async fn load(
        project_dir: Option<&Path>,
        explicit: Option<&Path>,
    ) -> Result<(Self, Vec<PathBuf>), ConfigError> {
        let mut config = Config::default();
        let mut sources = Vec::new();

        let candidates = [
            path::global_config_file(),
            project_dir.map(|dir| dir.join(path::PROJECT_CONFIG_FILE)),
        ];
        for candidate in candidates.into_iter().flatten() {
            if candidate.exists() {
                config = config.merge(Self::load_file(&candidate).await?);
                sources.push(candidate);
            }
        }

        if let Some(file) = explicit {
            config = config.merge(Self::load_file(file).await?);
            sources.push(file.to_path_buf());
        }

        config.apply_env(|name| std::env::var(name).ok())?;
        Ok((config, sources))
    }

    /// Load a single configuration file.
    pub async fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        serde_json::from_str(&content).map_err(|e| ConfigError::InvalidJson {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Merge `other` on top of `self`.
    pub fn merge(self, other: Self) -> Self {
        Self {
            database: other.database.or(self.database),
            log_level: other.log_level.or(self.log_level),
            include_one_line_edits: other.include_one_line_edits.or(self.include_one_line_edits),
            context_lines: other.context_lines.or(self.context_lines),
        }
    }

    /// Apply `BLACKBOX_*` overrides using `lookup` to read variables.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(db) = lookup("BLACKBOX_DATABASE").filter(|v| !v.is_empty()) {
            self.database = Some(PathBuf::from(db));
        }
        if let Some(level) = lookup("BLACKBOX_LOG_LEVEL") {
            self.log_level = Some(LogLevel::parse(&level).ok_or(ConfigError::InvalidEnv {
                name: "BLACKBOX_LOG_LEVEL",
                value: level,
            })?);
        }
        Ok(())
    }

    /// The database path, falling back to the default data directory.
    pub fn database_path(&self) -> Option<PathBuf> {
        self.database.clone().or_else(path::default_database)
    }

    pub fn include_one_line_edits(&self) -> bool {
        self.include_one_line_edits.unwrap_or(true)
    }

    pub fn context_lines(&self) -> usize {
        self.context_lines.unwrap_or(DEFAULT_CONTEXT_LINES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_merge_prefers_later_values() {
        let base = Config {
            database: Some(PathBuf::from("a.db")),
            context_lines: Some(5),
            ..Default::default()
        };
        let overlay = Config {
            database: Some(PathBuf::from("b.db")),
            include_one_line_edits: Some(false),
            ..Default::default()
        };

        let merged = base.merge(overlay);
        assert_eq!(merged.database, Some(PathBuf::from("b.db")));
        assert_eq!(merged.context_lines(), 5);
        assert!(!merged.include_one_line_edits());
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.context_lines(), 3);
        assert!(config.include_one_line_edits());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("BLACKBOX_DATABASE", "/tmp/history.db"),
            ("BLACKBOX_LOG_LEVEL", "debug"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_env(|name| vars.get(name).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.database, Some(PathBuf::from("/tmp/history.db")));
        assert_eq!(config.log_level, Some(LogLevel::Debug));
    }

    #[test]
    fn test_invalid_env_log_level() {
        let mut config = Config::default();
        let err = config
            .apply_env(|name| (name == "BLACKBOX_LOG_LEVEL").then(|| "loud".to_string()))
            .unwrap_err();
        assert_eq!(err.to_string(), "invalid value for BLACKBOX_LOG_LEVEL: loud");
    }

    #[tokio::test]
    async fn test_load_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(path::PROJECT_CONFIG_FILE);
        std::fs::write(
            &path,
            r#"{ "database": "project.db", "log_level": "warn", "context_lines": 1 }"#,
        )
        .unwrap();

        let config = Config::load_file(&path).await.unwrap();
        assert_eq!(config.database, Some(PathBuf::from("project.db")));
        assert_eq!(config.log_level, Some(LogLevel::Warn));
        assert_eq!(config.context_lines(), 1);
    }

    #[tokio::test]
    async fn test_load_file_rejects_bad_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ database: ").unwrap();

        let err = Config::load_file(&path).await.unwrap_err();
        assert!(matches!(err, ConfigError::InvalidJson { .. }));
    }
}
