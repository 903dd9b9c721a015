//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Lax grouped pagination over DuckDB relations
#[derive(Parser, Debug)]
#[command(name = "grouped-pager")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Pager configuration file (YAML)
    #[arg(short, long, global = true, default_value = "pager.yaml")]
    pub config: PathBuf,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print one page
    Page {
        /// Anchor token from a previous page's `next` or `previous`
        #[arg(long, conflicts_with = "from")]
        anchor: Option<String>,

        /// Raw grouping value to start from
        ///
        /// The key type is inferred: integer, then date, then timestamp, else
        /// text. Use `--text` for text columns holding digits or dates.
        #[arg(long)]
        from: Option<String>,

        /// Take `--from` as text without inferring its type
        #[arg(long, requires = "from")]
        text: bool,
    },

    /// Walk all pages from the first one
    Walk {
        /// Stop after this many pages
        #[arg(long)]
        max_pages: Option<usize>,
    },

    /// Print the total number of items
    Count,

    /// Validate the configuration file
    Validate,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page_with_anchor() {
        let cli = Cli::parse_from(["grouped-pager", "-c", "p.yaml", "page", "--anchor", "abc"]);
        assert_eq!(cli.config, PathBuf::from("p.yaml"));
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(
            cli.command,
            Commands::Page { anchor: Some(ref a), from: None, text: false } if a == "abc"
        ));
    }

    #[test]
    fn test_anchor_conflicts_with_from() {
        let result =
            Cli::try_parse_from(["grouped-pager", "page", "--anchor", "abc", "--from", "7"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_text_from() {
        let cli = Cli::parse_from(["grouped-pager", "page", "--from", "01234", "--text"]);
        assert!(matches!(
            cli.command,
            Commands::Page { anchor: None, from: Some(ref f), text: true } if f == "01234"
        ));
        assert!(Cli::try_parse_from(["grouped-pager", "page", "--text"]).is_err());
    }

    #[test]
    fn test_parse_walk() {
        let cli = Cli::parse_from(["grouped-pager", "walk", "--max-pages", "3", "-f", "pretty"]);
        assert_eq!(cli.format, OutputFormat::Pretty);
        assert!(matches!(cli.command, Commands::Walk { max_pages: Some(3) }));
    }
}
