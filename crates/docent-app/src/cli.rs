//! CLI argument definitions for the Docent application.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

/// Docent, the knowledge and chat core behind the portfolio assistant.
#[derive(Parser, Debug)]
#[command(name = "docent", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Ask the assistant one question and print the composed response.
    Ask {
        /// The question to ask.
        message: String,
        /// Intent label standing in for the external classifier
        /// (faq, troubleshooting, onboarding, product, general).
        #[arg(short = 'i', long = "intent", default_value = "faq")]
        intent: String,
        /// Continue an existing session.
        #[arg(short = 's', long = "session")]
        session: Option<Uuid>,
    },
    /// Search the knowledge base and print ranked matches.
    Search {
        /// Free-text query.
        query: String,
        /// Restrict to one category.
        #[arg(long = "category")]
        category: Option<String>,
        /// Maximum results.
        #[arg(long = "limit")]
        limit: Option<usize>,
    },
    /// Print knowledge store statistics.
    Stats,
    /// Export all knowledge entries as JSON.
    Export,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > DOCENT_CONFIG env var > ./docent.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("DOCENT_CONFIG") {
            return PathBuf::from(p);
        }
        PathBuf::from("docent.toml")
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > DOCENT_LOG env var > config file value.
    pub fn resolve_log_level(&self, config_level: &str) -> String {
        if let Some(ref level) = self.log_level {
            return level.clone();
        }
        if let Ok(level) = std::env::var("DOCENT_LOG") {
            return level;
        }
        config_level.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_with(config: Option<&str>, log_level: Option<&str>) -> CliArgs {
        CliArgs {
            config: config.map(PathBuf::from),
            log_level: log_level.map(str::to_string),
            command: Command::Stats,
        }
    }

    #[test]
    fn test_config_flag_wins() {
        let args = args_with(Some("/tmp/custom.toml"), None);
        assert_eq!(args.resolve_config_path(), PathBuf::from("/tmp/custom.toml"));
    }

    #[test]
    fn test_config_defaults_to_local_file() {
        let args = args_with(None, None);
        if std::env::var("DOCENT_CONFIG").is_err() {
            assert_eq!(args.resolve_config_path(), PathBuf::from("docent.toml"));
        }
    }

    #[test]
    fn test_log_level_flag_wins() {
        let args = args_with(None, Some("debug"));
        assert_eq!(args.resolve_log_level("info"), "debug");
    }

    #[test]
    fn test_log_level_falls_back_to_config() {
        let args = args_with(None, None);
        if std::env::var("DOCENT_LOG").is_err() {
            assert_eq!(args.resolve_log_level("warn"), "warn");
        }
    }

    #[test]
    fn test_cli_parses_ask_command() {
        let args = CliArgs::parse_from(["docent", "ask", "what is this?", "--intent", "faq"]);
        match args.command {
            Command::Ask { message, intent, session } => {
                assert_eq!(message, "what is this?");
                assert_eq!(intent, "faq");
                assert!(session.is_none());
            }
            _ => panic!("expected ask command"),
        }
    }

    #[test]
    fn test_cli_parses_search_with_options() {
        let args = CliArgs::parse_from([
            "docent", "search", "rust", "--category", "faq", "--limit", "3",
        ]);
        match args.command {
            Command::Search { query, category, limit } => {
                assert_eq!(query, "rust");
                assert_eq!(category.as_deref(), Some("faq"));
                assert_eq!(limit, Some(3));
            }
            _ => panic!("expected search command"),
        }
    }
}
