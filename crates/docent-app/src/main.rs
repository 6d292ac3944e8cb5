//! Docent application binary - composition root.
//!
//! Ties the library crates together into a small CLI:
//! 1. Load configuration from TOML
//! 2. Build and seed the in-memory knowledge store
//! 3. Construct the chat orchestrator around it
//! 4. Run one subcommand (ask / search / stats / export)
//!
//! The intent classifier and the language model are external collaborators
//! in the real deployment; here the `--intent` flag stands in for the
//! classifier and generic turns go through the fallback branch.

mod cli;

use clap::Parser;

use docent_chat::{ChatOrchestrator, TurnRequest};
use docent_core::types::{Category, Intent, IntentClassification};
use docent_core::DocentConfig;
use docent_knowledge::{seed_store, KnowledgeStore, SearchEngine, SearchOptions};

use cli::{CliArgs, Command};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_path = args.resolve_config_path();
    let config = DocentConfig::load_or_default(&config_path);

    // Tracing.
    let log_level = args.resolve_log_level(&config.general.log_level);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    tracing::info!("Starting Docent v{}", env!("CARGO_PKG_VERSION"));

    // Knowledge store, seeded from the fixed in-code set.
    let store = KnowledgeStore::new();
    let report = seed_store(&store)?;
    tracing::info!(entries = report.imported, "Knowledge store ready");

    match args.command {
        Command::Ask {
            message,
            intent,
            session,
        } => {
            let intent = Intent::parse(&intent)
                .ok_or_else(|| format!("unknown intent '{intent}'"))?;
            let orchestrator = ChatOrchestrator::new(store, &config);

            let mut request =
                TurnRequest::new(message, IntentClassification::new(intent, 0.9));
            request.session_id = session;

            let (response, session_id) = orchestrator.handle(request)?;
            tracing::info!(session = %session_id, "turn composed");
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Search {
            query,
            category,
            limit,
        } => {
            let category = match category {
                Some(ref name) => Some(
                    Category::parse(name)
                        .ok_or_else(|| format!("unknown category '{name}'"))?,
                ),
                None => None,
            };
            let options = SearchOptions {
                category,
                limit: limit.unwrap_or(config.search.default_limit),
                min_score: config.search.min_score,
            };

            let results = SearchEngine::new().search(&store, &query, &options)?;
            if results.is_empty() {
                println!("No matches.");
            }
            for result in results {
                println!(
                    "{:.3}  [{}]  {}",
                    result.score,
                    result.entry.category.as_str(),
                    result.entry.question
                );
            }
        }
        Command::Stats => {
            let stats = store.stats()?;
            println!("Entries:  {}", stats.total_entries);
            println!("Keywords: {}", stats.distinct_keywords);
            for category in Category::ALL {
                let count = stats.per_category.get(&category).copied().unwrap_or(0);
                println!("  {:<16} {}", category.as_str(), count);
            }
            if let Some(last) = stats.last_modified {
                println!("Last modified: {last}");
            }
        }
        Command::Export => {
            let entries = store.export()?;
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
    }

    Ok(())
}
