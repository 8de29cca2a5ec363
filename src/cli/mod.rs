//! Command-line interface for orgusers
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Go-style single-dash long flags (`-murl`, `-org`, ...)
//! - Configuration loading and CLI overrides
//! - Shell completion subcommand

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use crate::config::{Config, LogLevel};
use crate::connection::ConnectionTarget;
use crate::error::{ConfigError, OrgUsersError, Result};
use crate::executor::{Destination, ExportJob};

pub mod completion;

/// Long flags that may be written with a single dash.
const LONG_FLAGS: &[&str] = &[
    "murl", "mdb", "mport", "org", "file", "timeout", "config", "no-color", "verbose", "vv",
];

/// Export the users of an organization as JSON
#[derive(Parser, Debug)]
#[command(
    name = "orgusers",
    version,
    about = "Export the users of an organization as JSON",
    long_about = "Resolves an organization by its path, fetches every user holding a
membership in it, and writes them as indented JSON to a file or stdout."
)]
pub struct CliArgs {
    /// MongoDB host or URL (mongodb:// is prepended when missing)
    #[arg(long = "murl", value_name = "URL", default_value = "mongodb://localhost")]
    pub murl: String,

    /// Database name
    #[arg(long = "mdb", value_name = "NAME", default_value = "idm")]
    pub mdb: String,

    /// Database port
    #[arg(long = "mport", value_name = "PORT", default_value_t = 27017)]
    pub mport: u16,

    /// Organization path to resolve
    #[arg(long = "org", value_name = "PATH", default_value = "testorg")]
    pub org: String,

    /// Output file path (leave empty for stdout)
    #[arg(long = "file", value_name = "FILE", default_value = "")]
    pub file: String,

    /// Timeout in seconds for connect, resolve and fetch
    #[arg(long, value_name = "SECONDS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Configuration file path
    #[arg(long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Disable colored output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Verbose mode (debug logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Very verbose mode (trace logging)
    #[arg(long = "vv")]
    pub very_verbose: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands for orgusers
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate shell completion script
    Completion {
        /// Shell type
        #[arg(value_name = "SHELL", value_enum)]
        shell: Shell,
    },
}

/// Rewrite single-dash long flags into the double-dash form clap expects
///
/// `-murl x` and `-murl=x` become `--murl x` and `--murl=x`. Anything after a
/// bare `--`, short flags, and unknown names are left untouched.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let mut passthrough = false;

    args.into_iter()
        .map(Into::into)
        .map(|arg| {
            if passthrough {
                return arg;
            }
            let Some(text) = arg.to_str() else {
                return arg;
            };
            if text == "--" {
                passthrough = true;
                return arg;
            }
            match text.strip_prefix('-') {
                Some(rest) if !rest.starts_with('-') => {
                    let name = rest.split('=').next().unwrap_or(rest);
                    if LONG_FLAGS.contains(&name) {
                        OsString::from(format!("-{text}"))
                    } else {
                        arg
                    }
                }
                _ => arg,
            }
        })
        .collect()
}

/// Parse arguments (program name first) after normalizing Go-style flags
pub fn parse_args<I, T>(args: I) -> std::result::Result<CliArgs, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    CliArgs::try_parse_from(normalize_args(args))
}

/// Message to print for a failed [`CliInterface::new`]
///
/// Argument errors were already printed by clap and yield `None`.
pub fn startup_report(err: &OrgUsersError) -> Option<String> {
    match err {
        OrgUsersError::Config(ConfigError::InvalidArguments(_)) => None,
        other => Some(format!("Error: {other}")),
    }
}

/// CLI interface handler
pub struct CliInterface {
    /// Parsed command-line arguments
    args: CliArgs,

    /// Loaded configuration
    config: Config,
}

impl CliInterface {
    /// Parse the process arguments and load configuration
    ///
    /// `--help` and `--version` print and exit with status 0. Invalid
    /// arguments print clap's message and return a configuration error.
    pub fn new() -> Result<Self> {
        let args = match parse_args(std::env::args_os()) {
            Ok(args) => args,
            Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                e.exit()
            }
            Err(e) => {
                let _ = e.print();
                let rendered = e.render().to_string();
                let message = rendered
                    .lines()
                    .next()
                    .unwrap_or_default()
                    .trim_start_matches("error: ")
                    .to_string();
                return Err(ConfigError::InvalidArguments(message).into());
            }
        };
        Self::with_args(args)
    }

    /// Build from already-parsed arguments
    pub fn with_args(args: CliArgs) -> Result<Self> {
        let config = Config::load_from_file(args.config_file.as_deref())?;
        config.validate()?;
        Ok(Self { args, config })
    }

    /// Get the CLI arguments
    pub fn args(&self) -> &CliArgs {
        &self.args
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Connection target assembled from `-murl`, `-mport` and `-mdb`
    pub fn connection_target(&self) -> ConnectionTarget {
        ConnectionTarget::new(&self.args.murl, self.args.mport, &self.args.mdb)
    }

    /// Organization path and destination for this run
    pub fn export_job(&self) -> ExportJob {
        ExportJob {
            org_path: self.args.org.clone(),
            destination: Destination::from_flag(&self.args.file),
        }
    }

    /// Pipeline timeout: `-timeout` if given, else the config file value
    pub fn timeout(&self) -> Duration {
        self.args
            .timeout
            .map(Duration::from_secs)
            .unwrap_or_else(|| self.config.connection_timeout())
    }

    /// Whether terminal output may be colorized
    pub fn color_enabled(&self) -> bool {
        !self.args.no_color && self.config.output.color
    }

    /// Effective log level
    pub fn log_level(&self) -> LogLevel {
        if self.args.very_verbose {
            LogLevel::Trace
        } else if self.args.verbose {
            LogLevel::Debug
        } else {
            self.config.logging.level
        }
    }

    /// Handle subcommands
    ///
    /// # Returns
    /// * `Result<bool>` - True if a subcommand was handled, false to continue
    pub fn handle_subcommand(&self) -> Result<bool> {
        match &self.args.command {
            Some(Commands::Completion { shell }) => {
                completion::generate_completion(*shell, &mut std::io::stdout())?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
