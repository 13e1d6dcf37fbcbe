use std::path::{Path, PathBuf};

use anyhow::bail;
use serde::{Deserialize, Serialize};

use crate::common::geometry::Size;
use crate::layout_engine::{Orientation, SizePolicy};

/// The configuration shipped with the binary, with every option spelled out.
pub const DEFAULT_CONFIG: &str = include_str!("../../blend-view.default.toml");

pub fn config_file() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("blend-view")
        .join("config.toml")
}

fn yes() -> bool { true }
fn default_preferred_extent() -> i32 { 200 }
fn default_handle_size() -> i32 { 6 }
fn default_filter() -> String { "info".to_string() }

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub view: ViewSettings,
    #[serde(default)]
    pub splitter: SplitterSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct ViewSettings {
    /// Size a view reports when it has no opinion of its own.
    #[serde(default = "default_preferred_extent")]
    pub default_preferred_width: i32,
    #[serde(default = "default_preferred_extent")]
    pub default_preferred_height: i32,
}

impl Default for ViewSettings {
    fn default() -> Self {
        ViewSettings {
            default_preferred_width: default_preferred_extent(),
            default_preferred_height: default_preferred_extent(),
        }
    }
}

impl ViewSettings {
    pub fn default_preferred_size(&self) -> Size {
        Size::new(self.default_preferred_width, self.default_preferred_height)
    }

    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.default_preferred_width <= 0 || self.default_preferred_height <= 0 {
            issues.push(format!(
                "view.default_preferred_width/height must be positive, got {}x{}",
                self.default_preferred_width, self.default_preferred_height
            ));
        }
        issues
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct SplitterSettings {
    /// Thickness of the handle between two panes.
    #[serde(default = "default_handle_size")]
    pub handle_size: i32,
    #[serde(default)]
    pub default_orientation: Orientation,
    #[serde(default)]
    pub default_size_policy: SizePolicy,
}

impl Default for SplitterSettings {
    fn default() -> Self {
        SplitterSettings {
            handle_size: default_handle_size(),
            default_orientation: Orientation::default(),
            default_size_policy: SizePolicy::default(),
        }
    }
}

impl SplitterSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.handle_size <= 0 {
            issues.push(format!("splitter.handle_size must be positive, got {}", self.handle_size));
        }
        issues
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct LoggingSettings {
    /// `tracing` filter directives. `RUST_LOG` takes precedence when set.
    #[serde(default = "default_filter")]
    pub filter: String,
    #[serde(default = "yes")]
    pub indent_lines: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self { LoggingSettings { filter: default_filter(), indent_lines: yes() } }
}

impl LoggingSettings {
    pub fn validate(&self) -> Vec<String> {
        match tracing_subscriber::EnvFilter::try_new(&self.filter) {
            Ok(_) => Vec::new(),
            Err(e) => vec![format!("logging.filter {:?} is invalid: {e}", self.filter)],
        }
    }
}

impl Config {
    pub fn read(path: &Path) -> anyhow::Result<Config> {
        let buf = std::fs::read_to_string(path)?;
        Self::parse(&buf)
    }

    pub fn parse(buf: &str) -> anyhow::Result<Config> {
        match toml::from_str::<Config>(buf) {
            Ok(config) => Ok(config),
            Err(e) => bail!("Could not parse config: {e}"),
        }
    }

    /// Reads `path` if it exists, otherwise falls back to the defaults.
    pub fn read_or_default(path: &Path) -> anyhow::Result<Config> {
        if path.exists() {
            Self::read(path)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let toml_string = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml_string.as_bytes())?;
        Ok(())
    }

    /// Validates the entire configuration and returns a list of issues found.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        issues.extend(self.view.validate());
        issues.extend(self.splitter.validate());
        issues.extend(self.logging.validate());
        issues
    }
}
