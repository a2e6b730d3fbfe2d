use anyhow::Result;
use clap::Parser;
use colored::*;

use mcrag_astra::{AstraClient, AstraConfig};
use mcrag_core::{CollectionOutcome, Query, RetrievalResult};
use mcrag_retriever::MultiCollectionRetriever;

#[derive(Parser)]
#[command(name = "mcrag")]
#[command(about = "Retrieve passages from several Astra DB collections at once", long_about = None)]
struct Cli {
    /// Query text to search for
    query: Option<String>,

    /// Passages requested from each collection
    #[arg(short = 'k', long)]
    top_k: Option<usize>,

    /// Restrict the search to these collections (repeatable)
    #[arg(short, long = "collection")]
    collections: Vec<String>,

    /// Print the full retrieval result as JSON
    #[arg(long)]
    json: bool,

    /// List the configured collections and exit
    #[arg(long)]
    list: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let config = AstraConfig::from_env()?;
    log::debug!("Loaded configuration: {:?}", config);
    let mut registry = config.registry()?;
    if !cli.collections.is_empty() {
        registry = registry.subset(cli.collections.as_slice())?;
    }

    if cli.list {
        for identifier in registry.identifiers() {
            println!("{}", identifier);
        }
        return Ok(());
    }

    let Some(text) = cli.query else {
        anyhow::bail!("a query is required (see --help)");
    };

    let client = AstraClient::from_config(&config)?;
    let retriever = MultiCollectionRetriever::new(registry, client);
    let query = Query::new(text).with_top_k(cli.top_k.unwrap_or(config.top_k));

    let result = retriever.retrieve(&query).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result);
    }

    Ok(())
}

fn print_result(result: &RetrievalResult) {
    if result.passages.is_empty() {
        println!("{}", "No relevant passages found.".yellow());
    }

    for (i, passage) in result.passages.iter().enumerate() {
        println!(
            "{} {} {}",
            format!("{}.", i + 1).bold(),
            format!("[{}]", passage.source_collection).cyan(),
            passage.content
        );
    }

    println!();
    for (identifier, outcome) in &result.outcomes {
        match outcome {
            CollectionOutcome::Success { passages, skipped } => {
                let mut line = format!("{} {}: {} passage(s)", "✅".green(), identifier, passages);
                if *skipped > 0 {
                    line.push_str(&format!(", {} skipped", skipped));
                }
                println!("{}", line);
            }
            CollectionOutcome::Failed { reason } => {
                println!("{} {}: {}", "❌".red(), identifier, reason);
            }
        }
    }
}
