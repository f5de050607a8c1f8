//! Configuration file support.
//!
//! Loads optional `.scribe/config.toml` from a project root. Every field has a
//! default, so a partial file (or none at all) is valid.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use scribe_api::CommentStyle;
use serde::{Deserialize, Serialize};

use crate::annotator::AnnotateOptions;
use crate::oracle::{CommandOracle, CommentOracle, OutlineOracle};
use crate::{Error, Result};

/// Environment variable that replaces the configured oracle command.
pub const ORACLE_BIN_ENV: &str = "SCRIBE_ORACLE_BIN";

const DEFAULT_COMMIT_MESSAGE: &str = "Updated comments";

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScribeConfig {
    /// Force every file through one plugin instead of resolving by extension.
    pub language: Option<String>,
    /// Style for every language without an entry in `styles`.
    pub style: Option<CommentStyle>,
    /// Per-plugin style overrides keyed by plugin id.
    pub styles: BTreeMap<String, CommentStyle>,
    /// Comment cache location, relative to the project root.
    pub cache_file: PathBuf,
    /// Rewrite files instead of printing a preview.
    pub write: bool,
    /// Commit each rewritten file.
    pub commit: bool,
    /// Message used for those commits.
    pub commit_message: String,
    /// Oracle backend.
    pub oracle: OracleConfig,
    /// Log output.
    pub logging: LoggingConfig,
}

impl Default for ScribeConfig {
    fn default() -> Self {
        Self {
            language: None,
            style: None,
            styles: BTreeMap::new(),
            cache_file: PathBuf::from("comment_cache.json"),
            write: false,
            commit: false,
            commit_message: DEFAULT_COMMIT_MESSAGE.to_owned(),
            oracle: OracleConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// External oracle program settings. Without a command the offline outline
/// oracle is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// Program to spawn.
    pub command: Option<String>,
    /// Arguments passed to the program.
    pub args: Vec<String>,
    /// Deadline per declaration.
    pub timeout_secs: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            command: None,
            args: Vec::new(),
            timeout_secs: 60,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `SCRIBE_LOG` is unset.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            json: false,
        }
    }
}

impl ScribeConfig {
    /// Load config from `.scribe/config.toml` in the given root directory.
    ///
    /// # Errors
    ///
    /// See [`ScribeConfig::load_from_path`].
    pub fn load(root: &Path) -> Result<Self> {
        let config_path = root.join(".scribe").join("config.toml");
        Self::load_from_path(&config_path)
    }

    /// Load config from a specific path, then apply environment overrides.
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the file exists but cannot be read or
    /// parsed.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let content = std::fs::read_to_string(path).map_err(|err| Error::Config {
                path: path.display().to_string(),
                message: err.to_string(),
            })?;
            Self::parse(path, &content)?
        } else {
            Self::default()
        };

        Ok(config.with_overrides(|key| std::env::var(key).ok()))
    }

    fn parse(path: &Path, content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|err| Error::Config {
            path: path.display().to_string(),
            message: err.to_string(),
        })
    }

    /// Apply environment overrides read through `lookup`.
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(binary) = lookup(ORACLE_BIN_ENV).filter(|value| !value.trim().is_empty()) {
            self.oracle.command = Some(binary);
        }
        self
    }

    /// Cache file resolved against `root` when relative.
    #[must_use]
    pub fn cache_path(&self, root: &Path) -> PathBuf {
        if self.cache_file.is_absolute() {
            self.cache_file.clone()
        } else {
            root.join(&self.cache_file)
        }
    }

    /// Oracle described by the `oracle` table.
    #[must_use]
    pub fn build_oracle(&self) -> Arc<dyn CommentOracle> {
        match &self.oracle.command {
            Some(command) => Arc::new(
                CommandOracle::new(command, &self.oracle.args)
                    .with_timeout(Duration::from_secs(self.oracle.timeout_secs)),
            ),
            None => Arc::new(OutlineOracle::new()),
        }
    }

    /// Per-run annotation options.
    #[must_use]
    pub fn annotate_options(&self) -> AnnotateOptions {
        AnnotateOptions {
            language: self.language.clone(),
            style: self.style,
            styles: self.styles.clone(),
            write: self.write,
            commit_message: self.commit.then(|| self.commit_message.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let temp = TempDir::new().expect("temp dir");
        let config = ScribeConfig::load(temp.path())
            .expect("load")
            .with_overrides(|_| None);
        let defaults = ScribeConfig::default();
        assert_eq!(config.cache_file, defaults.cache_file);
        assert_eq!(config.commit_message, "Updated comments");
        assert_eq!(config.oracle.timeout_secs, 60);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let temp = TempDir::new().expect("temp dir");
        let dir = temp.path().join(".scribe");
        std::fs::create_dir_all(&dir).expect("create .scribe");
        std::fs::write(
            dir.join("config.toml"),
            r#"
style = "numpy"
commit = true

[styles]
c = "line"
cpp = "single-line"

[oracle]
command = "gen-comment"
args = ["--fast"]
"#,
        )
        .expect("write config");

        let config = ScribeConfig::load(temp.path()).expect("load");
        assert_eq!(config.style, Some(CommentStyle::Numpy));
        assert_eq!(config.styles.get("cpp"), Some(&CommentStyle::Line));
        assert_eq!(config.oracle.args, vec!["--fast".to_string()]);
        assert_eq!(config.oracle.timeout_secs, 60);

        let options = config.annotate_options();
        assert_eq!(options.commit_message.as_deref(), Some("Updated comments"));
        assert!(!options.write);
    }

    #[test]
    fn invalid_file_is_a_config_error() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "write = \"yes please\"").expect("write config");
        assert!(matches!(
            ScribeConfig::load_from_path(&path),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn oracle_binary_override() {
        let config = ScribeConfig::default().with_overrides(|key| {
            (key == ORACLE_BIN_ENV).then(|| "/opt/bin/oracle".to_string())
        });
        assert_eq!(config.oracle.command.as_deref(), Some("/opt/bin/oracle"));
        assert_eq!(config.build_oracle().id(), "command");
        assert_eq!(ScribeConfig::default().build_oracle().id(), "outline");
    }

    #[test]
    fn cache_path_is_rooted() {
        let config = ScribeConfig::default();
        assert_eq!(
            config.cache_path(Path::new("/work")),
            PathBuf::from("/work/comment_cache.json")
        );
    }
}
