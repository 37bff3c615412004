use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;
use scan_logging::LogDestination;

#[derive(Debug, Parser)]
#[command(name = "cart_scan", version, about = "Scan a saved cart page for allergens")]
pub struct Cli {
    /// Saved cart page (HTML).
    #[arg(long, value_name = "FILE")]
    pub cart: PathBuf,

    /// Origin that relative product links resolve against.
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Allergy to check for. Repeat for several.
    #[arg(long = "allergy", value_name = "TERM")]
    pub allergies: Vec<String>,

    /// JSON trigger request, e.g. {"action":"scrapeCart","allergies":["milk"]}.
    #[arg(long, value_name = "FILE", conflicts_with = "allergies")]
    pub request: Option<PathBuf>,

    /// RON configuration file.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write the JSON response here.
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Product pages fetched concurrently per window.
    #[arg(long, value_name = "N")]
    pub batch_width: Option<usize>,

    #[arg(long, value_enum, default_value_t = LogTarget::Terminal)]
    pub log: LogTarget,

    /// Debug-level logging.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogTarget {
    Terminal,
    File,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::File => LogDestination::File,
            LogTarget::Both => LogDestination::Both,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_repeated_allergies_and_log_target() {
        let cli = Cli::try_parse_from([
            "cart_scan",
            "--cart",
            "cart.html",
            "--allergy",
            "milk",
            "--allergy",
            "peanuts",
            "--log",
            "both",
            "-v",
        ])
        .unwrap();

        assert_eq!(cli.allergies, vec!["milk", "peanuts"]);
        assert_eq!(cli.log, LogTarget::Both);
        assert_eq!(cli.log_level(), LevelFilter::Debug);
        assert_eq!(LogDestination::from(cli.log), LogDestination::Both);
    }

    #[test]
    fn request_file_excludes_allergy_flags() {
        let parsed = Cli::try_parse_from([
            "cart_scan",
            "--cart",
            "cart.html",
            "--request",
            "req.json",
            "--allergy",
            "milk",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn cart_is_required() {
        assert!(Cli::try_parse_from(["cart_scan"]).is_err());
    }
}
