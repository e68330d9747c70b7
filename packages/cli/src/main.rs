#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI for querying and exporting surveillance data without the server.
//!
//! ```text
//! surveillance_map_cli ask "dengue deaths in pune 2021" [--csv data.csv] [--generate]
//! surveillance_map_cli knowledge-base [--csv data.csv] [--out insights.txt]
//! surveillance_map_cli map 2021 [--boundaries districts.geojson] [--out map.geojson]
//! surveillance_map_cli insights dengue
//! surveillance_map_cli district pune [--month august]
//! surveillance_map_cli compare dengue pune nagpur
//! surveillance_map_cli recent [--days 30]
//! surveillance_map_cli response-times [--by area]
//! ```
//!
//! Records come from `--csv` when given, otherwise from the same
//! environment configuration the server uses.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use surveillance_map_ai::chat::summarize_question;
use surveillance_map_ai::{answer_question, create_generator_from_env};
use surveillance_map_analytics::insights;
use surveillance_map_analytics_models::Grouping;
use surveillance_map_geography::{DEFAULT_DISTRICT_PROPERTY, build_map_overlay, load_boundaries};
use surveillance_map_records::RecordSnapshot;
use surveillance_map_records::sources::{CsvSource, RecordSource, source_from_env};
use surveillance_map_records_models::Record;

#[derive(Parser)]
#[command(
    name = "surveillance_map_cli",
    about = "Query and export disease surveillance data"
)]
struct Cli {
    /// Read records from this CSV export instead of the configured source
    #[arg(long, global = true)]
    csv: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a question from the data
    Ask {
        /// The question
        question: String,
        /// Phrase the answer with the configured AI provider
        #[arg(long)]
        generate: bool,
    },
    /// Write plain-text insight sentences, one per line
    KnowledgeBase {
        /// Output file (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Write district boundaries annotated with case totals for a year
    Map {
        /// Reporting year
        year: i32,
        /// Boundary `GeoJSON` file
        #[arg(long, default_value = "static/data/maharashtradist.geojson")]
        boundaries: PathBuf,
        /// Feature property holding district names
        #[arg(long, default_value = DEFAULT_DISTRICT_PROPERTY)]
        district_property: String,
        /// Output file (stdout when omitted)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Trends, hotspots and fatality rate for one disease
    Insights {
        /// Disease name
        disease: String,
        /// Number of hotspot districts to list
        #[arg(long, default_value = "5")]
        limit: usize,
    },
    /// Most common diseases in one district
    District {
        /// District name
        district: String,
        /// Only outbreaks starting in this month (e.g. "august")
        #[arg(long)]
        month: Option<String>,
        /// Number of diseases to list
        #[arg(long, default_value = "5")]
        limit: usize,
    },
    /// Compare cases of a disease between two districts
    Compare {
        /// Disease name
        disease: String,
        /// First district
        first: String,
        /// Second district
        second: String,
    },
    /// Outbreaks reported within a window of the latest report
    Recent {
        /// Window length in days
        #[arg(long, default_value = "30")]
        days: i64,
    },
    /// Mean days from outbreak start to reporting
    ResponseTimes {
        /// Group by `disease` or `area`
        #[arg(long, default_value = "disease")]
        by: Grouping,
    },
}

async fn load_records(csv: Option<PathBuf>) -> Result<Vec<Record>, Box<dyn std::error::Error>> {
    let source: Arc<dyn RecordSource> = match csv {
        Some(path) => Arc::new(CsvSource::new(path)),
        None => source_from_env()?,
    };

    log::info!("Loading records from {}", source.name());
    let rows = source.fetch_all().await?;
    let snapshot = RecordSnapshot::from_raw(&rows);
    log::info!("Loaded {} records", snapshot.len());
    Ok(snapshot.records)
}

fn write_output(out: Option<&PathBuf>, text: &str) -> std::io::Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, text)?;
            log::info!("Wrote {}", path.display());
            Ok(())
        }
        None => {
            println!("{text}");
            Ok(())
        }
    }
}

#[tokio::main]
#[allow(clippy::too_many_lines)]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    let records = load_records(cli.csv).await?;

    match cli.command {
        Commands::Ask { question, generate } => {
            for line in summarize_question(&records, &question) {
                println!("{line}");
            }

            if generate {
                let generator = create_generator_from_env()?;
                let answer = answer_question(Some(generator.as_ref()), &records, &question).await;
                println!("\n{answer}");
            }
        }
        Commands::KnowledgeBase { out } => {
            let sentences = insights::knowledge_base(&records);
            write_output(out.as_ref(), &sentences.join("\n"))?;
            eprintln!("{} insights", sentences.len());
        }
        Commands::Map {
            year,
            boundaries,
            district_property,
            out,
        } => {
            let boundaries = load_boundaries(&boundaries)?;
            let overlay =
                build_map_overlay(&records, Some(&boundaries), year, &district_property)?;
            write_output(out.as_ref(), &serde_json::to_string_pretty(&overlay)?)?;
        }
        Commands::Insights { disease, limit } => {
            println!("Yearly trends for {disease}:");
            for trend in insights::yearly_trends(&records, &disease) {
                println!(
                    "  {}: {} cases, {} deaths",
                    trend.year, trend.total_cases, trend.total_deaths
                );
            }

            println!("\nBusiest months:");
            let mut months = insights::seasonality(&records, &disease);
            months.sort_by(|a, b| b.cases.cmp(&a.cases));
            for month in months.iter().take(3).filter(|m| m.cases > 0) {
                println!("  {}: {} cases", month.month, month.cases);
            }

            println!("\nHotspots:");
            for spot in insights::hotspots(&records, &disease, limit) {
                println!("  {}: {} cases", spot.name, spot.cases);
            }

            match insights::fatality_rate(&records, &disease) {
                Some(rate) => println!("\nCase fatality rate: {rate:.2}%"),
                None => println!("\nNo cases reported for {disease}."),
            }
        }
        Commands::District {
            district,
            month,
            limit,
        } => {
            if let Some(month) = month {
                let Some(number) = insights::month_from_name(&month) else {
                    return Err(format!("Unknown month: {month}").into());
                };
                println!("Diseases in {district} starting in {month}:");
                for row in insights::monthly_risk(&records, &district, number) {
                    println!(
                        "  {}: {} cases, {} deaths",
                        row.category, row.total_cases, row.total_deaths
                    );
                }
            } else {
                println!("Most common diseases in {district}:");
                for entry in insights::district_profile(&records, &district, limit) {
                    println!("  {}: {} cases", entry.name, entry.cases);
                }
            }
        }
        Commands::Compare {
            disease,
            first,
            second,
        } => {
            let comparison = insights::compare_districts(&records, &disease, &first, &second);
            if comparison.is_empty() {
                println!("No {disease} cases in {first} or {second}.");
            }
            for entry in comparison {
                println!("{}: {} {disease} cases", entry.name, entry.cases);
            }
        }
        Commands::Recent { days } => {
            let recent = insights::recent_outbreaks(&records, days);
            println!("{} outbreaks reported in the last {days} days:", recent.len());
            for record in recent {
                let reported = record
                    .reported_on
                    .map_or_else(String::new, |d| d.to_string());
                println!(
                    "  {reported} {} in {}: {} cases, {} deaths",
                    record.disease, record.area, record.case_count, record.death_count
                );
            }
        }
        Commands::ResponseTimes { by } => {
            if let Some(overall) = insights::overall_response_time(&records) {
                println!("Overall: {overall:.1} days");
            }
            for time in insights::average_response_time(&records, by) {
                println!("  {}: {:.1} days", time.name, time.mean_days);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_times_parses_grouping() {
        let cli = Cli::try_parse_from(["surveillance_map_cli", "response-times", "--by", "Area"])
            .unwrap();
        assert!(matches!(
            cli.command,
            Commands::ResponseTimes { by: Grouping::Area }
        ));

        let cli = Cli::try_parse_from(["surveillance_map_cli", "response-times"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::ResponseTimes {
                by: Grouping::Disease
            }
        ));

        assert!(
            Cli::try_parse_from(["surveillance_map_cli", "response-times", "--by", "region"])
                .is_err()
        );
    }

    #[test]
    fn csv_flag_is_global() {
        let cli = Cli::try_parse_from(["surveillance_map_cli", "recent", "--csv", "data.csv"])
            .unwrap();
        assert_eq!(cli.csv, Some(PathBuf::from("data.csv")));
        assert!(matches!(cli.command, Commands::Recent { days: 30 }));
    }
}
