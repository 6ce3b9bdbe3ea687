use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use std::path::PathBuf;
use tabled::{settings::Style, Table, Tabled};
use tracing::error;

use flarewatch::analysis::{display_window, AnalysisEngine, AnalysisResult, TrendStatus};
use flarewatch::anomaly::Severity;
use flarewatch::clustering::DayProfileConfig;
use flarewatch::config::AppConfig;
use flarewatch::import::ImportManager;
use flarewatch::logging::{init_logging, LogLevel};
use flarewatch::risk::RiskLevel;
use flarewatch::FlareWatchError;

/// FlareWatch - Symptom Journal Analytics CLI
///
/// Reads a symptom journal export and reports trends, forecasts,
/// correlations, anomalies, patterns and flare-up risk.
#[derive(Parser)]
#[command(name = "flarewatch")]
#[command(author = "FlareWatch Contributors")]
#[command(version)]
#[command(about = "Symptom Journal Analytics CLI", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a journal export (CSV or JSON)
    Analyze {
        /// Journal file
        file: PathBuf,

        /// Days shown in the report, counted back from the latest entry
        #[arg(short, long)]
        days: Option<usize>,

        /// Forecast horizon in days
        #[arg(long)]
        horizon: Option<usize>,

        /// Confidence level for forecast bands (e.g. 0.9, 0.95, 0.99)
        #[arg(long)]
        confidence: Option<f64>,

        /// Group days into this many k-means profiles
        #[arg(long)]
        profiles: Option<usize>,

        /// Seed for k-means day profiles
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// Configure application settings
    Config {
        /// Write a default config file if none exists
        #[arg(long)]
        init: bool,

        /// Print the config file location
        #[arg(long)]
        path: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        match e.downcast_ref::<FlareWatchError>() {
            Some(err) => {
                error!(severity = ?err.severity(), "{}", err);
                eprintln!("{} {}", "Error:".red().bold(), err.user_message());
            }
            None => eprintln!("{} {:#}", "Error:".red().bold(), e),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(AppConfig::default_config_path);
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from_file(path)?,
        None => AppConfig::load_or_default(),
    };

    let mut log_config = config.logging.clone();
    log_config.level = match cli.verbose {
        0 => log_config.level,
        1 => LogLevel::Info,
        2 => LogLevel::Debug,
        _ => LogLevel::Trace,
    };
    init_logging(&log_config)?;

    match cli.command {
        Commands::Analyze {
            file,
            days,
            horizon,
            confidence,
            profiles,
            seed,
            format,
        } => {
            if let Some(horizon) = horizon {
                config.analysis.forecast_days = horizon;
            }
            if let Some(confidence) = confidence {
                config.analysis.confidence_level = confidence;
            }
            if let Some(k) = profiles {
                config.analysis.day_profiles = Some(DayProfileConfig { k, seed });
            }
            if let Some(days) = days {
                config.display_days = days;
            }
            config.validate()?;

            let entries = ImportManager::new().import_file(&file)?;
            let display = display_window(&entries, config.display_days);

            let engine =
                AnalysisEngine::with_config(config.analysis.clone()).with_advice(config.advice.clone());
            let result = engine.analyze(&display, Some(&entries));

            match format {
                OutputFormat::Json => {
                    let json = serde_json::to_string_pretty(&result)
                        .context("Failed to serialize analysis result")?;
                    println!("{}", json);
                }
                OutputFormat::Table => print_report(&result, &display, &config.advice.condition),
            }
        }

        Commands::Config { init, path } => {
            if path {
                println!("{}", config_path.display());
            } else if init {
                if config_path.exists() {
                    println!(
                        "{} {}",
                        "Config already exists:".yellow(),
                        config_path.display()
                    );
                } else {
                    AppConfig::default().save_to_file(&config_path)?;
                    println!("{} {}", "✓ Wrote".green(), config_path.display());
                }
            } else {
                let toml = toml::to_string_pretty(&config)
                    .context("Failed to serialize configuration")?;
                println!("{}", toml);
            }
        }
    }

    Ok(())
}

#[derive(Tabled)]
struct TrendRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Current")]
    current: String,
    #[tabled(rename = "Average")]
    average: String,
    #[tabled(rename = "Range")]
    range: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Slope/day")]
    slope: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Forecast")]
    forecast: String,
}

fn status_text(status: TrendStatus) -> &'static str {
    match status {
        TrendStatus::Improving => "improving",
        TrendStatus::Worsening => "worsening",
        TrendStatus::Stable => "stable",
        TrendStatus::Rising => "rising",
        TrendStatus::Falling => "falling",
    }
}

fn print_report(result: &AnalysisResult, display: &[flarewatch::LogEntry], condition: &str) {
    if result.entries_analyzed == 0 {
        println!("{}", "No journal entries in the selected window".yellow());
        return;
    }

    let first = display.first().map(|e| e.date.to_string()).unwrap_or_default();
    let last = display.last().map(|e| e.date.to_string()).unwrap_or_default();
    println!(
        "{}",
        format!(
            "FlareWatch report: {} entries, {} to {} ({})",
            result.entries_analyzed, first, last, condition
        )
        .cyan()
        .bold()
    );

    let rows: Vec<TrendRow> = result
        .trends
        .iter()
        .map(|(metric, record)| TrendRow {
            metric: metric.label().to_string(),
            current: format!("{:.1}", record.current),
            average: format!("{:.1}", record.average),
            range: format!("{:.1}-{:.1}", record.min, record.max),
            status: match record.predicted_status {
                Some(predicted) if predicted != record.status => {
                    format!("{} → {}", status_text(record.status), status_text(predicted))
                }
                _ => status_text(record.status).to_string(),
            },
            slope: record
                .regression
                .as_ref()
                .map(|r| format!("{:+.2}", r.slope))
                .unwrap_or_else(|| "-".to_string()),
            model: record
                .regression
                .as_ref()
                .map(|r| format!("{:?} (R² {:.2})", r.model_type, r.r_squared))
                .unwrap_or_else(|| "-".to_string()),
            forecast: record
                .forecast
                .last()
                .map(|p| format!("{:.1} [{:.1}, {:.1}]", p.value, p.lower, p.upper))
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect();
    println!("\n{}", Table::new(rows).with(Style::rounded()));

    if !result.correlations.is_empty() {
        println!("\n{}", "Correlations".bold());
        for correlation in &result.correlations {
            println!(
                "  • {} over {} days",
                correlation.description, correlation.sample_size
            );
        }
    }

    if !result.anomalies.is_empty() {
        println!("\n{}", "Anomalies".bold());
        for anomaly in &result.anomalies {
            let line = match anomaly.severity {
                Severity::High => anomaly.message.red(),
                Severity::Moderate => anomaly.message.yellow(),
                Severity::Low => anomaly.message.normal(),
            };
            println!("  • {}", line);
        }
    }

    if !result.patterns.is_empty() {
        println!("\n{}", "Patterns".bold());
        for pattern in &result.patterns {
            println!("  • {}", pattern.message);
        }
    }

    if let Some(risk) = &result.flare_risk {
        let level = match risk.level {
            RiskLevel::High => "HIGH".red().bold(),
            RiskLevel::Moderate => "MODERATE".yellow().bold(),
            RiskLevel::Low => "LOW".green(),
        };
        println!(
            "\n{} {} ({}% similar to pre-flare days, {} matching metrics)",
            "Flare risk:".bold(),
            level,
            risk.confidence,
            risk.matching_metrics
        );
    }

    if let Some(profiles) = &result.day_profiles {
        println!("\n{}", "Day profiles".bold());
        for (i, profile) in profiles.iter().enumerate() {
            let centroid: Vec<String> = profile
                .centroid
                .iter()
                .map(|(metric, value)| format!("{} {:.1}", metric.label(), value))
                .collect();
            println!("  {}. {} days: {}", i + 1, profile.dates.len(), centroid.join(", "));
        }
    }

    if !result.advice.is_empty() {
        println!("\n{}", "Suggestions".bold());
        for advice in &result.advice {
            println!("  • {}", advice);
        }
    }
}
