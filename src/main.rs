// src/main.rs
mod extractors;
mod storage;
mod utils;

use clap::Parser;
use extractors::{section, table, ExtractorConfig, FilingExtractor};
use storage::StorageManager;
use utils::AppError;

/// Command Line Interface for the DART filing fact extractor.
/// Reads an already-fetched report body from disk; downloading filings and
/// persisting facts to a datastore are the surrounding pipeline's job.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the filing body (DART report HTML/XML)
    #[arg(short, long)]
    input: String,

    /// Ticker symbol of the company (e.g. 005930)
    #[arg(short, long)]
    ticker: String,

    /// Reporting period string (e.g. 2025.3Q)
    #[arg(short, long)]
    period: String,

    /// Output directory for extracted facts
    #[arg(short, long, default_value = "./output")]
    output_dir: String,

    /// Debug mode - save the narrowed section and candidate tables
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::info!("Starting extraction for args: {:?}", args);

    // 3. Read the filing body
    let document_text = std::fs::read_to_string(&args.input)?;
    tracing::info!("Read filing body ({} bytes) from {}", document_text.len(), args.input);

    // 4. Initialize storage and the engine
    let storage = StorageManager::new(&args.output_dir)?;
    let config = ExtractorConfig::default();
    let extractor = FilingExtractor::new(config.clone());

    // 5. Optional debug artifacts: what the engine will actually look at
    if args.debug {
        match section::locate(
            &document_text,
            &config.business_start_marker,
            &config.business_end_marker,
        ) {
            Some(business) => {
                storage.save_debug_text(&args.ticker, &args.period, "business_section.txt", business)?;
                let mut dump = String::new();
                for (i, t) in table::parse_tables(business).iter().enumerate() {
                    dump.push_str(&format!("--- table {} ({} rows) ---\n", i, t.rows.len()));
                    for row in &t.rows {
                        dump.push_str(&format!("{:?}\n", row));
                    }
                }
                storage.save_debug_text(&args.ticker, &args.period, "candidate_tables.txt", &dump)?;
            }
            None => tracing::warn!("Debug: business chapter markers not found in document"),
        }
    }

    // 6. Run the extraction
    let facts = extractor.extract(&document_text, &args.period)?;
    tracing::info!(
        "Extracted {} segment records, {} narratives, R&D figure: {:?}",
        facts.segments.len(),
        facts.narratives.len(),
        facts.rnd_expense
    );

    if facts.segments.is_empty() && facts.narratives.is_empty() && facts.rnd_expense.is_none() {
        tracing::warn!("No facts extracted; the filing layout may not match the configured markers");
    }

    // 7. Save results
    let out_dir = storage.save_facts(&args.ticker, &args.period, &facts)?;
    tracing::info!("Results written to {}", out_dir.display());

    Ok(())
}
