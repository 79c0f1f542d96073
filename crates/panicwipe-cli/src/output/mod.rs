//! Output formatting for different formats.

use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use panicwipe::WipeReport;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Available output formats.
#[derive(Debug, Clone, Copy, Default, ValueEnum, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable summary with colors
    #[default]
    Pretty,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => anyhow::bail!(
                "Unknown output format: {}\n\
                 Valid formats: pretty, json, yaml",
                s
            ),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pretty => write!(f, "pretty"),
            Self::Json => write!(f, "json"),
            Self::Yaml => write!(f, "yaml"),
        }
    }
}

/// Print a finished report in `format`.
pub fn print_report(report: &WipeReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(report)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(report)?),
        OutputFormat::Pretty => print_pretty(report),
    }
    Ok(())
}

fn print_pretty(report: &WipeReport) {
    let title = match (report.simulated(), report.success()) {
        (true, true) => "Audit complete (nothing was deleted)".yellow().bold(),
        (true, false) => "Audit finished with errors (nothing was deleted)".red().bold(),
        (false, true) => "Emergency wipe complete".green().bold(),
        (false, false) => "Emergency wipe finished with errors".red().bold(),
    };
    println!("{title}");
    println!();

    println!("  {} {}", "Trigger:".bold(), report.trigger());
    if !report.simulated() {
        println!("  {} {}", "Items destroyed:".bold(), report.items_destroyed());
        println!("  {} {}", "Overwrite passes:".bold(), report.passes());
    }
    println!("  {} {:.2}s", "Duration:".bold(), report.duration_seconds());

    if report.simulated() && !report.identified_items().is_empty() {
        println!();
        println!("{}", "Would destroy:".bold());
        for item in report.identified_items() {
            println!("  - {item}");
        }
    }

    if !report.warnings().is_empty() {
        println!();
        println!("{}", "Warnings:".yellow().bold());
        for warning in report.warnings() {
            println!("  {} {warning}", "!".yellow());
        }
    }

    if !report.errors().is_empty() {
        println!();
        println!("{}", "Errors:".red().bold());
        for error in report.errors() {
            println!("  {} {error}", "x".red());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parsing() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("yml".parse::<OutputFormat>().unwrap(), OutputFormat::Yaml);
        assert!("csv".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::default().to_string(), "pretty");
    }
}
