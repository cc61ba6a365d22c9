//! Configuration management for rzk-docs.
//!
//! Parses `rzk-docs.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! `rzk.path` supports environment variable expansion and a leading `~`:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default

mod expand;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override docs source directory.
    pub source_dir: Option<PathBuf>,
    /// Override the `rzk` executable path.
    pub rzk_path: Option<String>,
    /// Override diagram rendering.
    pub render_svg: Option<bool>,
    /// Override definition anchors.
    pub anchor_definitions: Option<bool>,
    /// Override the type-checking mode.
    pub mode: Option<Mode>,
    /// Override the type-check timeout in seconds.
    pub timeout_secs: Option<u64>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "rzk-docs.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Documentation configuration (paths are relative strings from TOML).
    docs: DocsConfigRaw,
    /// Type-checker and page processing configuration.
    pub rzk: RzkConfig,

    /// Resolved docs configuration (set after loading).
    #[serde(skip)]
    pub docs_resolved: DocsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw docs configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DocsConfigRaw {
    source_dir: Option<String>,
}

/// Resolved documentation configuration with absolute paths.
#[derive(Debug, Default)]
pub struct DocsConfig {
    /// Source directory for markdown files; page identifiers are relative to it.
    pub source_dir: PathBuf,
}

/// `[rzk]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RzkConfig {
    /// Location of the `rzk` executable.
    pub path: String,
    /// Inject SVG diagrams into Literate Rzk pages.
    pub render_svg: bool,
    /// Add `define:<name>` anchors to definition names.
    pub anchor_definitions: bool,
    /// Type-checking mode.
    pub mode: Mode,
    /// How snippets are passed to `rzk` in cumulative mode.
    pub input: Input,
    /// Kill type-checks after this many seconds (no limit when unset).
    pub timeout_secs: Option<u64>,
}

impl Default for RzkConfig {
    fn default() -> Self {
        Self {
            path: "rzk".to_owned(),
            render_svg: true,
            anchor_definitions: true,
            mode: Mode::default(),
            input: Input::default(),
            timeout_secs: None,
        }
    }
}

impl RzkConfig {
    /// Type-check timeout, if configured.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// Type-checking mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Check snippets one by one, each together with all earlier snippets.
    #[default]
    Cumulative,
    /// Check the whole page once and place diagrams by definition name.
    Page,
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cumulative" => Ok(Self::Cumulative),
            "page" => Ok(Self::Page),
            _ => Err(format!("unknown mode '{s}' (valid: cumulative, page)")),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Cumulative => "cumulative",
            Self::Page => "page",
        })
    }
}

/// Snippet input strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Input {
    /// Write accumulated snippets to the checker's stdin.
    #[default]
    Stdin,
    /// Write accumulated snippets to a temporary file.
    File,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`rzk.path`").
        field: String,
        /// Error message (e.g., "${`RZK_HOME`} not set").
        message: String,
    },
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `rzk-docs.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails, or
    /// the final configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings)?;
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) -> Result<(), ConfigError> {
        if let Some(source_dir) = &settings.source_dir {
            self.docs_resolved.source_dir.clone_from(source_dir);
        }
        if let Some(path) = &settings.rzk_path {
            self.rzk.path = expand::expand_path(path, "rzk.path")?;
        }
        if let Some(render_svg) = settings.render_svg {
            self.rzk.render_svg = render_svg;
        }
        if let Some(anchor_definitions) = settings.anchor_definitions {
            self.rzk.anchor_definitions = anchor_definitions;
        }
        if let Some(mode) = settings.mode {
            self.rzk.mode = mode;
        }
        if let Some(timeout_secs) = settings.timeout_secs {
            self.rzk.timeout_secs = Some(timeout_secs);
        }
        Ok(())
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rzk.path.trim().is_empty() {
            return Err(ConfigError::Validation("rzk.path cannot be empty".to_owned()));
        }
        if self.rzk.timeout_secs == Some(0) {
            return Err(ConfigError::Validation(
                "rzk.timeout_secs must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }

    /// Page identifier for `file`: its path relative to the docs source
    /// directory with forward slashes, or the path as given when it lies
    /// outside of it.
    #[must_use]
    pub fn page_id(&self, file: &Path) -> String {
        match file.strip_prefix(&self.docs_resolved.source_dir) {
            Ok(relative) => relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/"),
            Err(_) => file.to_string_lossy().into_owned(),
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            docs: DocsConfigRaw::default(),
            rzk: RzkConfig::default(),
            docs_resolved: DocsConfig {
                source_dir: base.join("docs"),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.rzk.path = expand::expand_path(&self.rzk.path, "rzk.path")?;
        if let Some(ref source_dir) = self.docs.source_dir {
            self.docs.source_dir = Some(expand::expand_env(source_dir, "docs.source_dir")?);
        }
        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.docs_resolved = DocsConfig {
            source_dir: config_dir.join(self.docs.source_dir.as_deref().unwrap_or("docs")),
        };
    }
}
