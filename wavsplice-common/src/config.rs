//! Configuration loading and resolution
//!
//! Configuration file resolution follows this priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable `WAVSPLICE_CONFIG`
//! 3. `<config dir>/wavsplice/config.toml`
//! 4. Compiled defaults (fallback)
//!
//! Every key has a built-in default, so a partial file is valid. A file named
//! explicitly (levels 1 and 2) must exist and parse; the implicit per-user file
//! degrades to defaults with a warning.

use crate::fade_curves::FadeCurve;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable naming an explicit configuration file
pub const CONFIG_ENV_VAR: &str = "WAVSPLICE_CONFIG";

/// Default name of the spliced output, placed beside the inputs
pub const DEFAULT_OUTPUT_NAME: &str = "spliced-audio.wav";

/// Leading characters of a file name compared when ordering tracks
pub const DEFAULT_TRACK_NUMBER_WIDTH: usize = 3;

/// Complete configuration file contents
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TomlConfig {
    pub splice: SpliceSettings,
    pub trim: TrimSettings,
    pub scan: ScanSettings,
    pub logging: LoggingConfig,
}

/// `[splice]` section
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SpliceSettings {
    /// File name of the spliced output within the scanned directory
    pub output_name: String,

    /// Fade shape name (see [`FadeCurve::parse`])
    pub fade_curve: String,

    /// Crossfade overlap at each join, in seconds
    pub overlap_seconds: f64,

    /// Window in which the join point may move earlier, in seconds
    pub search_window_seconds: f64,

    /// Trim leading/trailing silence from every input before splicing
    pub trim_before_splice: bool,
}

impl Default for SpliceSettings {
    fn default() -> Self {
        Self {
            output_name: DEFAULT_OUTPUT_NAME.to_string(),
            fade_curve: FadeCurve::default().config_name().to_string(),
            overlap_seconds: 0.5,
            // Zero keeps the output exactly ΣL - (N-1)·overlap frames long;
            // a search window shortens it by the chosen offsets
            search_window_seconds: 0.0,
            trim_before_splice: false,
        }
    }
}

impl SpliceSettings {
    /// Parsed fade curve
    pub fn fade_curve(&self) -> Result<FadeCurve> {
        FadeCurve::parse(&self.fade_curve).ok_or_else(|| {
            Error::Config(format!("Unknown fade curve '{}'", self.fade_curve))
        })
    }
}

/// `[trim]` section
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TrimSettings {
    /// How long audio must stay above the threshold before trimming stops
    pub duration_seconds: f64,

    /// Amplitude threshold: `"1%"`, `"-40dB"` or a linear fraction
    pub threshold: String,
}

impl Default for TrimSettings {
    fn default() -> Self {
        Self {
            duration_seconds: 0.1,
            threshold: "1%".to_string(),
        }
    }
}

/// `[scan]` section
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScanSettings {
    /// Characters of each file name compared when sorting (0 = whole name)
    pub track_number_width: usize,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            track_number_width: DEFAULT_TRACK_NUMBER_WIDTH,
        }
    }
}

impl ScanSettings {
    /// Prefix width for the file enumerator, `None` meaning the whole name
    pub fn prefix_width(&self) -> Option<usize> {
        match self.track_number_width {
            0 => None,
            width => Some(width),
        }
    }
}

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text and validate it
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Cannot read config file {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
            .map_err(|e| Error::Config(format!("{} ({})", e, path.display())))
    }

    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> Result<()> {
        self.splice.fade_curve()?;

        if !(self.splice.overlap_seconds >= 0.0) {
            return Err(Error::Config(format!(
                "splice.overlap_seconds must be >= 0, got {}",
                self.splice.overlap_seconds
            )));
        }
        if !(self.splice.search_window_seconds >= 0.0) {
            return Err(Error::Config(format!(
                "splice.search_window_seconds must be >= 0, got {}",
                self.splice.search_window_seconds
            )));
        }
        if self.splice.output_name.trim().is_empty() {
            return Err(Error::Config("splice.output_name must not be empty".to_string()));
        }
        if !is_plain_file_name(&self.splice.output_name) {
            return Err(Error::Config(format!(
                "splice.output_name must be a file name without directories, got '{}'",
                self.splice.output_name
            )));
        }
        if !(self.trim.duration_seconds >= 0.0) {
            return Err(Error::Config(format!(
                "trim.duration_seconds must be >= 0, got {}",
                self.trim.duration_seconds
            )));
        }
        Ok(())
    }
}

/// Where the effective configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    CommandLine(PathBuf),
    Environment(PathBuf),
    UserFile(PathBuf),
    Defaults,
}

/// Configuration together with its origin
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: TomlConfig,
    pub source: ConfigSource,
}

/// Resolves and loads the configuration file
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    cli_path: Option<PathBuf>,
    user_file: Option<PathBuf>,
}

impl ConfigResolver {
    /// Resolver using the platform configuration directory for level 3
    pub fn new(cli_path: Option<PathBuf>) -> Self {
        Self {
            cli_path,
            user_file: default_user_config_file(),
        }
    }

    /// Override the level-3 per-user file location
    pub fn with_user_file(mut self, path: Option<PathBuf>) -> Self {
        self.user_file = path;
        self
    }

    /// Load configuration following the priority order
    pub fn load(&self) -> Result<LoadedConfig> {
        // Priority 1: Command-line argument
        if let Some(path) = &self.cli_path {
            info!("Loading configuration from command line: {}", path.display());
            return Ok(LoadedConfig {
                config: TomlConfig::from_file(path)?,
                source: ConfigSource::CommandLine(path.clone()),
            });
        }

        // Priority 2: Environment variable
        if let Ok(value) = std::env::var(CONFIG_ENV_VAR) {
            if !value.trim().is_empty() {
                let path = PathBuf::from(value);
                info!("Loading configuration from {}: {}", CONFIG_ENV_VAR, path.display());
                return Ok(LoadedConfig {
                    config: TomlConfig::from_file(&path)?,
                    source: ConfigSource::Environment(path),
                });
            }
        }

        // Priority 3: per-user config file
        if let Some(path) = &self.user_file {
            if path.exists() {
                match TomlConfig::from_file(path) {
                    Ok(config) => {
                        info!("Loaded configuration from {}", path.display());
                        return Ok(LoadedConfig {
                            config,
                            source: ConfigSource::UserFile(path.clone()),
                        });
                    }
                    Err(e) => {
                        warn!("Ignoring config file {}: {}; using defaults", path.display(), e);
                    }
                }
            } else {
                debug!("No config file at {}", path.display());
            }
        }

        // Priority 4: compiled defaults
        Ok(LoadedConfig {
            config: TomlConfig::default(),
            source: ConfigSource::Defaults,
        })
    }
}

/// True when `name` is a single path component such as `out.wav`
/// (no separators, no `.` or `..`)
pub fn is_plain_file_name(name: &str) -> bool {
    let mut parts = Path::new(name).components();
    matches!(
        (parts.next(), parts.next()),
        (Some(std::path::Component::Normal(_)), None)
    ) && !name.contains(|c| c == '/' || c == '\\')
}

/// `<config dir>/wavsplice/config.toml` for the current platform
pub fn default_user_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("wavsplice").join("config.toml"))
}
