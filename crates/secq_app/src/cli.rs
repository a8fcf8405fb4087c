//! Command line surface of the `secq` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "secq")]
#[command(version, about = "Ask security questions about anonymised documents", long_about = None)]
pub struct Cli {
    /// Configuration file path (defaults to ./secq.ron when present)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Server root URL; wins over the config file and SECQ_BASE_URL
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List uploaded documents, then upload the given files
    Files {
        /// PDF, EML or MSG files to upload
        paths: Vec<PathBuf>,
    },

    /// Remove an uploaded document
    Remove {
        /// File name as listed by `files`
        name: String,
    },

    /// Submit security questions and wait for the analysis results
    Ask {
        /// Free model (mpnet, bart, t5) or paid model (claude, chatgpt)
        #[arg(short, long, default_value = "mpnet")]
        model: String,

        /// API key for a paid model
        #[arg(short = 'k', long)]
        api_key: Option<String>,

        /// Question to ask; repeat for several
        #[arg(short, long = "question", value_name = "QUESTION", required = true)]
        questions: Vec<String>,
    },

    /// Print question suggestions for a partial question
    Suggest {
        /// Partial question text
        text: String,
    },

    /// Show the stored analysis results
    Results {
        /// Delete the stored results after confirmation
        #[arg(long)]
        clear: bool,

        /// Answer yes to the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ask_collects_repeated_questions() {
        let cli = Cli::parse_from([
            "secq", "ask", "-m", "claude", "-k", "sk-1", "-q", "Q1", "-q", "Q2",
        ]);
        match cli.command {
            Command::Ask {
                model,
                api_key,
                questions,
            } => {
                assert_eq!(model, "claude");
                assert_eq!(api_key.as_deref(), Some("sk-1"));
                assert_eq!(questions, vec!["Q1", "Q2"]);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn ask_requires_a_question() {
        assert!(Cli::try_parse_from(["secq", "ask"]).is_err());
    }

    #[test]
    fn global_flags_precede_the_subcommand() {
        let cli = Cli::parse_from([
            "secq",
            "--base-url",
            "http://analysis.local:9000",
            "results",
            "--clear",
            "--yes",
        ]);
        assert_eq!(cli.base_url.as_deref(), Some("http://analysis.local:9000"));
        assert!(matches!(
            cli.command,
            Command::Results {
                clear: true,
                yes: true
            }
        ));
    }
}
