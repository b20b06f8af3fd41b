//! Configuration management for the G-code parser CLI.
//!
//! Handles:
//! - Command-line argument parsing
//! - Optional TOML config file (explicit path or user config directory)
//!
//! Precedence: built-in defaults < config file < command-line flags.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;

use crate::parser::{LineMode, ParseOptions};

/// Default log level when neither the config file nor the CLI sets one
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Command-line arguments for `gcode-parse`
#[derive(Debug, Default, Parser)]
#[command(name = "gcode-parse")]
#[command(about = "Parse G-code into JSON line records")]
#[command(version)]
pub struct Args {
    /// G-code file to parse; stdin when omitted or "-"
    pub input: Option<PathBuf>,

    /// Which form of each line to report
    #[arg(long, value_enum, help = "Line rendering (original, stripped, compact)")]
    pub line_mode: Option<LineMode>,

    /// Emit words as "G1" strings instead of ["G", 1] pairs
    #[arg(long, overrides_with = "no_flatten")]
    pub flatten: bool,

    /// Emit words as ["G", 1] pairs even if the config file flattens them
    #[arg(long, overrides_with = "flatten")]
    pub no_flatten: bool,

    /// Lines parsed per scheduling turn while streaming
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Read the whole input up front instead of streaming it
    #[arg(long)]
    pub sync: bool,

    /// Config file to load instead of the user default
    #[arg(long, help = "Path to a TOML config file")]
    pub config: Option<PathBuf>,

    /// Log level
    #[arg(long, help = "Log level (trace, debug, info, warn, error)")]
    pub log_level: Option<String>,
}

impl Args {
    /// `Some` when a flatten flag was given on the command line
    pub fn flatten_override(&self) -> Option<bool> {
        match (self.flatten, self.no_flatten) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

/// Settings read from a TOML config file
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub line_mode: Option<LineMode>,
    pub flatten: Option<bool>,
    pub batch_size: Option<usize>,
    pub read_buffer_size: Option<usize>,
    pub log_level: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Where the input comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Stdin,
    File(PathBuf),
}

/// Combined configuration from all sources
#[derive(Debug, Clone)]
pub struct Config {
    pub input: Input,
    pub options: ParseOptions,
    pub sync: bool,
    pub log_level: String,
    /// Config file that was applied, if any
    pub config_file: Option<PathBuf>,
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args_and_env() -> Result<Self> {
        Self::from_args(Args::parse())
    }

    /// Create configuration from explicit arguments (useful for testing)
    pub fn from_args(args: Args) -> Result<Self> {
        let config_file = match args.config.clone() {
            Some(path) => Some(path),
            None => default_config_path().filter(|path| path.is_file()),
        };
        let file = match &config_file {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };

        Ok(Self::merge(args, file, config_file))
    }

    /// Layer command-line arguments over file settings
    pub fn merge(args: Args, file: FileConfig, config_file: Option<PathBuf>) -> Self {
        let defaults = ParseOptions::default();
        let options = ParseOptions {
            line_mode: args.line_mode.or(file.line_mode).unwrap_or(defaults.line_mode),
            flatten: args.flatten_override().or(file.flatten).unwrap_or(defaults.flatten),
            batch_size: args.batch_size.or(file.batch_size).unwrap_or(defaults.batch_size),
            read_buffer_size: file.read_buffer_size.unwrap_or(defaults.read_buffer_size),
        };

        let input = match args.input {
            Some(path) if path.as_os_str() != "-" => Input::File(path),
            _ => Input::Stdin,
        };

        Config {
            input,
            options,
            sync: args.sync,
            log_level: args
                .log_level
                .or(file.log_level)
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            config_file,
        }
    }
}

/// `<config dir>/gcode-parser/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("gcode-parser").join("config.toml"))
}
