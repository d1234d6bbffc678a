//! Run configuration: built-in defaults, optional config file, CLI overrides.
//!
//! Precedence is defaults < config file < command line. The config file uses a
//! small `key = value` subset of TOML (strings double-quoted, `#` comments).

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};

use crate::download::DEFAULT_WORKERS;
use crate::download::constants::REQUEST_TIMEOUT_SECS;
use crate::input::DEFAULT_INPUT_FILE;

pub const DEFAULT_OUTPUT_DIR: &str = "downloaded_pdfs";
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_RESULTS_DIR: &str = ".";

const WORKERS_RANGE: std::ops::RangeInclusive<usize> = 1..=100;
const TIMEOUT_SECS_RANGE: std::ops::RangeInclusive<u64> = 1..=3600;

/// Values read from the config file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileConfig {
    pub input: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    /// Maximum concurrent downloads (same range as the CLI).
    pub workers: Option<usize>,
    /// Per-request timeout in seconds.
    pub timeout_secs: Option<u64>,
    pub log_dir: Option<PathBuf>,
    pub results_dir: Option<PathBuf>,
    pub verbosity: Option<VerbositySetting>,
}

impl FileConfig {
    /// Validates config values against runtime and CLI constraints.
    ///
    /// # Errors
    ///
    /// Returns an error naming the offending key when a value is out of range.
    pub fn validate(&self) -> Result<()> {
        if let Some(workers) = self.workers
            && !WORKERS_RANGE.contains(&workers)
        {
            bail!("Invalid config value for `workers`: {workers}. Expected range: 1..=100");
        }
        if let Some(timeout) = self.timeout_secs
            && !TIMEOUT_SECS_RANGE.contains(&timeout)
        {
            bail!("Invalid config value for `timeout_secs`: {timeout}. Expected range: 1..=3600");
        }
        Ok(())
    }
}

/// Supported config verbosity labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbositySetting {
    Default,
    Verbose,
    Quiet,
    Debug,
}

impl VerbositySetting {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Verbose => "verbose",
            Self::Quiet => "quiet",
            Self::Debug => "debug",
        }
    }

    /// Log level used when neither `RUST_LOG` nor a CLI flag decides.
    #[must_use]
    pub fn log_level(self) -> &'static str {
        match self {
            Self::Default => "info",
            Self::Verbose => "debug",
            Self::Quiet => "error",
            Self::Debug => "trace",
        }
    }
}

/// Command-line values that override the file config when present.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub input: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub workers: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub log_dir: Option<PathBuf>,
    pub results_dir: Option<PathBuf>,
}

/// Effective settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    /// JSON file holding the URL list.
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub workers: usize,
    pub timeout_secs: u64,
    pub log_dir: PathBuf,
    pub results_dir: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT_FILE),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            workers: DEFAULT_WORKERS,
            timeout_secs: REQUEST_TIMEOUT_SECS,
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            results_dir: PathBuf::from(DEFAULT_RESULTS_DIR),
        }
    }
}

impl RunConfig {
    /// Layers `file` and then `overrides` over the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error when an effective value is out of range.
    pub fn resolve(overrides: &ConfigOverrides, file: Option<&FileConfig>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(file) = file {
            if let Some(input) = &file.input {
                config.input.clone_from(input);
            }
            if let Some(output_dir) = &file.output_dir {
                config.output_dir.clone_from(output_dir);
            }
            if let Some(workers) = file.workers {
                config.workers = workers;
            }
            if let Some(timeout) = file.timeout_secs {
                config.timeout_secs = timeout;
            }
            if let Some(log_dir) = &file.log_dir {
                config.log_dir.clone_from(log_dir);
            }
            if let Some(results_dir) = &file.results_dir {
                config.results_dir.clone_from(results_dir);
            }
        }

        if let Some(input) = &overrides.input {
            config.input.clone_from(input);
        }
        if let Some(output_dir) = &overrides.output_dir {
            config.output_dir.clone_from(output_dir);
        }
        if let Some(workers) = overrides.workers {
            config.workers = workers;
        }
        if let Some(timeout) = overrides.timeout_secs {
            config.timeout_secs = timeout;
        }
        if let Some(log_dir) = &overrides.log_dir {
            config.log_dir.clone_from(log_dir);
        }
        if let Some(results_dir) = &overrides.results_dir {
            config.results_dir.clone_from(results_dir);
        }

        if !WORKERS_RANGE.contains(&config.workers) {
            bail!(
                "Invalid effective workers value: {}. Expected range: 1..=100",
                config.workers
            );
        }
        if !TIMEOUT_SECS_RANGE.contains(&config.timeout_secs) {
            bail!(
                "Invalid effective timeout_secs value: {}. Expected range: 1..=3600",
                config.timeout_secs
            );
        }
        Ok(config)
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Config file metadata after loading.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Path that was consulted, if one could be determined.
    pub path: Option<PathBuf>,
    /// Parsed config when the file existed.
    pub config: Option<FileConfig>,
}

/// Resolves the default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/pdf-batch/config.toml`
/// 2. `$HOME/.config/pdf-batch/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("pdf-batch")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("pdf-batch")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads the config file.
///
/// An explicit path must exist; the default path is optional.
///
/// # Errors
///
/// Returns an error when the file cannot be read, fails to parse, or an
/// explicit path does not exist.
pub fn load_file_config(explicit: Option<&Path>) -> Result<LoadedConfig> {
    if let Some(path) = explicit {
        let config = read_config_file(path)?;
        return Ok(LoadedConfig {
            path: Some(path.to_path_buf()),
            config: Some(config),
        });
    }

    let path = resolve_default_config_path();
    let config = match path.as_deref() {
        Some(path_ref) if path_ref.exists() => Some(read_config_file(path_ref)?),
        _ => None,
    };
    Ok(LoadedConfig { path, config })
}

fn read_config_file(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line_no = line_index + 1;
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_no}: expected key = value");
        };
        let key = raw_key.trim();
        let value = raw_value.trim();

        match key {
            "input" | "output_dir" | "log_dir" | "results_dir" => {
                let parsed = parse_string_literal(value)
                    .with_context(|| format!("Invalid `{key}` value on line {line_no}"))?;
                let path = Some(PathBuf::from(parsed));
                match key {
                    "input" => cfg.input = path,
                    "output_dir" => cfg.output_dir = path,
                    "log_dir" => cfg.log_dir = path,
                    _ => cfg.results_dir = path,
                }
            }
            "workers" => {
                let parsed = parse_integer_u64(value)
                    .with_context(|| format!("Invalid `workers` value on line {line_no}"))?;
                let workers = usize::try_from(parsed)
                    .map_err(|_| anyhow::anyhow!("workers out of range for usize"))?;
                cfg.workers = Some(workers);
            }
            "timeout_secs" => {
                let parsed = parse_integer_u64(value)
                    .with_context(|| format!("Invalid `timeout_secs` value on line {line_no}"))?;
                cfg.timeout_secs = Some(parsed);
            }
            "verbosity" => {
                let parsed = parse_string_literal(value)
                    .with_context(|| format!("Invalid `verbosity` value on line {line_no}"))?;
                cfg.verbosity = Some(parse_verbosity(&parsed).with_context(|| {
                    format!("Invalid `verbosity` value '{parsed}' on line {line_no}")
                })?);
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_no}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    let value = token.parse::<i128>()?;
    if value < 0 {
        bail!("Expected non-negative integer");
    }
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Integer value out of range for u64"))
}

fn parse_verbosity(value: &str) -> Result<VerbositySetting> {
    match value {
        "default" => Ok(VerbositySetting::Default),
        "verbose" => Ok(VerbositySetting::Verbose),
        "quiet" => Ok(VerbositySetting::Quiet),
        "debug" => Ok(VerbositySetting::Debug),
        _ => bail!("Expected one of: default, verbose, quiet, debug"),
    }
}
