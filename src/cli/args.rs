//! CLI argument definitions using Clap

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// StudyVoice - practise explaining your study material to an AI tutor
#[derive(Parser, Debug)]
#[command(name = "study-voice")]
#[command(version)]
#[command(about = "Derive study topics from your material and practise explaining them to an AI tutor")]
#[command(long_about = None)]
pub struct Cli {
    /// Identity whose topics are loaded and saved
    #[arg(long, global = true, value_name = "NAME")]
    pub identity: Option<String>,

    /// Ask for exactly five topics when uploading
    #[arg(long, global = true)]
    pub strict: bool,

    /// Mastery merge policy (highest, overwrite)
    #[arg(long, global = true, value_name = "POLICY")]
    pub policy: Option<String>,

    /// Timeout for each remote call (e.g., 30s, 1m, 2m30s)
    #[arg(long, global = true, value_name = "TIME")]
    pub timeout: Option<String>,

    /// Completion model to use
    #[arg(long, global = true, value_name = "MODEL")]
    pub model: Option<String>,

    /// Log debug output to stderr
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Derive topics from a file (.txt, .pdf, .png, .jpg, .gif, .webp) and save them
    Upload {
        /// File with the study material
        file: PathBuf,
    },
    /// List saved topics with their mastery
    Topics,
    /// Discard the saved topic set
    Discard,
    /// Evaluate a single explanation of a topic
    Explain {
        /// Topic name (case-insensitive)
        topic: String,
        /// Explanation text; repeat to add more segments
        #[arg(short = 't', long = "text", value_name = "TEXT")]
        text: Vec<String>,
        /// Supplementary file appended to the explanation; repeatable
        #[arg(short = 'f', long = "file", value_name = "FILE")]
        file: Vec<PathBuf>,
    },
    /// Practise a topic interactively
    Practice {
        /// Topic name (case-insensitive)
        topic: String,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "api_key",
    "model",
    "max_tokens",
    "timeout",
    "mastery_policy",
    "topic_count",
    "pdf_reader",
    "store",
    "identity",
    "language",
    "server.url",
    "server.token",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_upload() {
        let cli = Cli::parse_from(["study-voice", "upload", "notes.pdf"]);
        assert!(matches!(cli.command, Commands::Upload { ref file } if file == &PathBuf::from("notes.pdf")));
        assert!(!cli.strict);
        assert!(!cli.verbose);
        assert!(cli.identity.is_none());
    }

    #[test]
    fn cli_parses_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "study-voice", "upload", "notes.txt", "--strict", "--identity", "ada", "-v",
        ]);
        assert!(cli.strict);
        assert!(cli.verbose);
        assert_eq!(cli.identity.as_deref(), Some("ada"));
    }

    #[test]
    fn cli_parses_explain_with_repeated_args() {
        let cli = Cli::parse_from([
            "study-voice",
            "explain",
            "Photosynthesis",
            "--text",
            "Plants use sunlight",
            "-t",
            "to make sugar",
            "--file",
            "diagram.png",
        ]);
        if let Commands::Explain { topic, text, file } = cli.command {
            assert_eq!(topic, "Photosynthesis");
            assert_eq!(text, vec!["Plants use sunlight", "to make sugar"]);
            assert_eq!(file, vec![PathBuf::from("diagram.png")]);
        } else {
            panic!("Expected Explain command");
        }
    }

    #[test]
    fn cli_parses_config_set() {
        let cli = Cli::parse_from(["study-voice", "config", "set", "mastery_policy", "overwrite"]);
        if let Commands::Config {
            action: ConfigAction::Set { key, value },
        } = cli.command
        {
            assert_eq!(key, "mastery_policy");
            assert_eq!(value, "overwrite");
        } else {
            panic!("Expected Config Set command");
        }
    }

    #[test]
    fn cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["study-voice"]).is_err());
    }

    #[test]
    fn valid_config_keys() {
        assert!(is_valid_config_key("api_key"));
        assert!(is_valid_config_key("server.url"));
        assert!(!is_valid_config_key("duration"));
    }

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }
}
