use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;

use crate::logging::{LogDestination, DEFAULT_LOG_FILE};

/// Environment variable holding the source profile password.
pub const SOURCE_PASSWORD_ENV: &str = "CERTSYNC_SOURCE_PASSWORD";
/// Environment variable holding the claims portal password.
pub const TARGET_PASSWORD_ENV: &str = "CERTSYNC_TARGET_PASSWORD";

/// Copies certifications from a profile listing into the certificate claims portal.
///
/// Passwords are only read from the environment (CERTSYNC_SOURCE_PASSWORD,
/// CERTSYNC_TARGET_PASSWORD).
#[derive(Parser, Debug)]
#[command(name = "certsync")]
#[command(version)]
pub struct Args {
    /// Profile handle, e.g. `jdoe` for https://www.linkedin.com/in/jdoe
    #[arg(long, env = "CERTSYNC_PROFILE_HANDLE")]
    pub profile_handle: Option<String>,

    /// Login identity (email) for the source profile
    #[arg(long, env = "CERTSYNC_SOURCE_IDENTITY")]
    pub source_identity: Option<String>,

    /// Login identity (email) for the claims portal
    #[arg(long, env = "CERTSYNC_TARGET_IDENTITY")]
    pub target_identity: Option<String>,

    /// One-time code for the claims portal; asked for on the terminal when
    /// omitted and the portal shows the code field
    #[arg(long, env = "CERTSYNC_ONE_TIME_CODE", hide_env_values = true)]
    pub one_time_code: Option<String>,

    /// RON settings file; defaults apply when absent
    #[arg(short, long, env = "CERTSYNC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Read certifications from a saved listing page instead of logging in
    #[arg(long)]
    pub listing_html: Option<PathBuf>,

    /// Extract and print the records without submitting anything
    #[arg(long)]
    pub dry_run: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info", value_parser = parse_level)]
    pub log_level: LevelFilter,

    /// Log file written next to the terminal output
    #[arg(long, default_value = DEFAULT_LOG_FILE)]
    pub log_file: PathBuf,

    /// Log to the terminal only
    #[arg(long, conflicts_with = "log_file")]
    pub no_log_file: bool,
}

fn parse_level(raw: &str) -> Result<LevelFilter, String> {
    raw.parse::<LevelFilter>()
        .map_err(|_| format!("unknown log level `{raw}`"))
}

impl Args {
    pub fn log_destination(&self) -> LogDestination {
        if self.no_log_file {
            LogDestination::Terminal
        } else {
            LogDestination::Both(self.log_file.clone())
        }
    }
}
