use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::Provider;
use crate::pipeline::reporter::ReportFormat;

#[derive(Parser, Debug)]
#[command(
    name = "brand-hunter",
    version,
    about = "Hunt phishing and scam pages impersonating a brand"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to config file (TOML). Default: config/brand-hunter.toml
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Generation provider (overrides config)
    #[arg(long, global = true, value_enum)]
    pub provider: Option<ProviderArg>,

    /// Model name; must be listed by `models`
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Increase verbosity (info, debug, trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log file path
    #[arg(long, global = true, default_value = "data/hunter.log")]
    pub log_file: String,

    /// Output directory for reports
    #[arg(long, global = true, default_value = "output")]
    pub output: PathBuf,

    /// Report format
    #[arg(long, global = true, value_enum, default_value = "text")]
    pub format: FormatArg,

    /// Also write generated queries and pre-classification results
    #[arg(long, global = true)]
    pub save_intermediate: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate dorks, search, and keep the results judged relevant
    Hunt {
        /// Brand name; prompted for when omitted
        brand: Option<String>,
    },
    /// Only generate and print dork queries
    Generate {
        /// Brand name; prompted for when omitted
        brand: Option<String>,
    },
    /// List models available for the selected provider
    Models,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ProviderArg {
    Groq,
    Gemini,
}

impl From<ProviderArg> for Provider {
    fn from(value: ProviderArg) -> Self {
        match value {
            ProviderArg::Groq => Provider::Groq,
            ProviderArg::Gemini => Provider::Gemini,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for ReportFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Text => ReportFormat::Text,
            FormatArg::Json => ReportFormat::Json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hunt_with_globals() {
        let cli = Cli::try_parse_from([
            "brand-hunter",
            "hunt",
            "Acme",
            "--provider",
            "gemini",
            "--format",
            "json",
            "-vv",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Hunt { brand: Some(ref b) } if b == "Acme"));
        assert!(matches!(cli.provider, Some(ProviderArg::Gemini)));
        assert!(matches!(cli.format, FormatArg::Json));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.output, PathBuf::from("output"));
    }

    #[test]
    fn brand_is_optional() {
        let cli = Cli::try_parse_from(["brand-hunter", "generate"]).unwrap();
        assert!(matches!(cli.command, Command::Generate { brand: None }));
    }
}
