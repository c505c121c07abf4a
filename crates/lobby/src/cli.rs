//! Command-line interface handling for the lobby server.
//!
//! This module provides command-line argument parsing using the `clap` crate.

use clap::{Arg, ArgMatches, Command};
use std::path::PathBuf;

/// Command line arguments parsed from user input.
///
/// These override the matching values from the configuration file.
#[derive(Debug, Clone)]
pub struct CliArgs {
    /// Path to the configuration file
    pub config_path: PathBuf,
    /// Optional override for the WebSocket bind address
    pub bind_address: Option<String>,
    /// Optional override for the query endpoint bind address
    pub query_address: Option<String>,
    /// Optional override for log level
    pub log_level: Option<String>,
    /// Whether to force JSON log output
    pub json_logs: bool,
    /// Optional override for the connection limit
    pub max_connections: Option<usize>,
}

impl CliArgs {
    /// Parses the process arguments.
    pub fn parse() -> Self {
        Self::from_matches(&command().get_matches())
    }

    fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            config_path: matches
                .get_one::<PathBuf>("config")
                .cloned()
                .unwrap_or_else(|| PathBuf::from("config.toml")),
            bind_address: matches.get_one::<String>("bind").cloned(),
            query_address: matches.get_one::<String>("query-bind").cloned(),
            log_level: matches.get_one::<String>("log-level").cloned(),
            json_logs: matches.get_flag("json-logs"),
            max_connections: matches.get_one::<usize>("max-connections").copied(),
        }
    }
}

fn command() -> Command {
    Command::new("lobby")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Real-time presence hub: shared player state over WebSockets")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
                .value_parser(clap::value_parser!(PathBuf))
                .default_value("config.toml"),
        )
        .arg(
            Arg::new("bind")
                .short('b')
                .long("bind")
                .value_name("ADDRESS")
                .help("WebSocket bind address (e.g., 127.0.0.1:8080)"),
        )
        .arg(
            Arg::new("query-bind")
                .short('q')
                .long("query-bind")
                .value_name("ADDRESS")
                .help("Query endpoint bind address (e.g., 127.0.0.1:8081)"),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level (trace, debug, info, warn, error)"),
        )
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .help("Output logs in JSON format")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("max-connections")
                .long("max-connections")
                .value_name("COUNT")
                .help("Maximum number of concurrent connections")
                .value_parser(clap::value_parser!(usize)),
        )
}
