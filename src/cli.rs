//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// m2index - local real-estate price-per-m² index
///
/// Record listings, compare each one against its condominium, and
/// generate one-page market reports.
///
/// Examples:
///   m2index add --condominium "Solar" --neighborhood Centro --area 100 --price 500000
///   m2index list --search solar
///   m2index search "solar"
///   m2index report <ID> --format json
///   m2index export --output backup.json
///   m2index init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    ///
    /// If not specified, looks for .m2index.toml in the current directory
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Path to the JSON listing store
    #[arg(long, global = true, value_name = "FILE", env = "M2_STORE")]
    pub store: Option<PathBuf>,

    /// Your name, recorded as responsible for new listings
    #[arg(long, global = true, value_name = "NAME", env = "M2_RESPONSIBLE")]
    pub responsible: Option<String>,

    /// Display mode (visitor, admin)
    #[arg(long, global = true, value_name = "MODE")]
    pub mode: Option<Mode>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Record a new listing
    Add {
        /// Condominium or building name (grouping key)
        #[arg(long)]
        condominium: String,

        /// Neighborhood
        #[arg(long, default_value = "")]
        neighborhood: String,

        /// Area in m²
        #[arg(long)]
        area: String,

        /// Asking price
        #[arg(long)]
        price: String,
    },

    /// Delete a listing
    Remove {
        /// Listing id
        id: String,
    },

    /// Toggle the favorite flag of a listing
    Favorite {
        /// Listing id
        id: String,
    },

    /// Show listings with their market diagnosis
    List {
        /// Filter by condominium or neighborhood (case-insensitive)
        #[arg(short, long, default_value = "")]
        search: String,
    },

    /// Summarize a condominium search
    Search {
        /// Text matched against condominium names
        query: String,
    },

    /// Overall average and record count
    Summary,

    /// Rank condominiums by average price per m²
    Ranking,

    /// Listings priced more than 10% below their condominium average
    Opportunities,

    /// Generate a one-page report for a listing
    Report {
        /// Listing id
        id: String,

        /// Output file path for the report
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format (markdown, json)
        #[arg(long, value_name = "FORMAT")]
        format: Option<OutputFormat>,
    },

    /// Export all listings as a JSON array
    Export {
        /// Write to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Replace all listings with a JSON backup
    Import {
        /// Backup file to restore
        file: PathBuf,
    },

    /// Generate a default .m2index.toml configuration file
    InitConfig,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

/// Display mode.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Read-only view (default)
    #[default]
    Visitor,
    /// Shows ids, favorites and who entered each listing
    Admin,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        match &self.command {
            Command::Add {
                condominium,
                area,
                price,
                ..
            } => {
                if condominium.trim().is_empty() {
                    return Err("Condominium must not be empty".to_string());
                }
                if area.trim().is_empty() || price.trim().is_empty() {
                    return Err("Area and price are required".to_string());
                }
            }
            Command::Import { file } => {
                if !file.exists() {
                    return Err(format!("Backup file does not exist: {}", file.display()));
                }
            }
            _ => {}
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args(command: Command) -> Args {
        Args {
            command,
            config: None,
            store: None,
            responsible: None,
            mode: None,
            verbose: false,
            quiet: false,
        }
    }

    #[test]
    fn test_parse_add() {
        let args = Args::try_parse_from([
            "m2index",
            "add",
            "--condominium",
            "Solar",
            "--area",
            "100",
            "--price",
            "500000",
            "--mode",
            "admin",
        ])
        .unwrap();

        assert_eq!(
            args.command,
            Command::Add {
                condominium: "Solar".to_string(),
                neighborhood: String::new(),
                area: "100".to_string(),
                price: "500000".to_string(),
            }
        );
        assert_eq!(args.mode, Some(Mode::Admin));
    }

    #[test]
    fn test_parse_report_format() {
        let args =
            Args::try_parse_from(["m2index", "report", "abc", "--format", "json"]).unwrap();
        assert_eq!(
            args.command,
            Command::Report {
                id: "abc".to_string(),
                output: None,
                format: Some(OutputFormat::Json),
            }
        );
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args(Command::Summary);
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_add_requires_values() {
        let args = make_args(Command::Add {
            condominium: "Solar".to_string(),
            neighborhood: String::new(),
            area: " ".to_string(),
            price: "1".to_string(),
        });
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_import_missing_file() {
        let args = make_args(Command::Import {
            file: PathBuf::from("/definitely/not/here.json"),
        });
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args(Command::Summary);
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
