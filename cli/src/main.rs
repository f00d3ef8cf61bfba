use anyhow::Result;
use clap::{Parser, Subcommand};
use newsradar_core::{Corpus, Error, MatchResult, PublishedState};
use std::io::{self, BufRead, Write};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "newsradar")]
#[command(about = "Find the most relevant headline in a news corpus", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the best match for one keyword
    Query {
        /// Corpus file (.csv, .jsonl or .json)
        #[arg(long, default_value = "./news.csv")]
        corpus: String,
        #[arg(long)]
        keyword: String,
        /// Add an alert for this location
        #[arg(long)]
        location: Option<String>,
        /// Print the result as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print corpus and index statistics
    Stats {
        #[arg(long, default_value = "./news.csv")]
        corpus: String,
    },
    /// Menu-driven search loop on stdin
    Interactive {
        #[arg(long, default_value = "./news.csv")]
        corpus: String,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).with_writer(io::stderr).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Query { corpus, keyword, location, json } => {
            let state = open(&corpus)?;
            let result = state.query(Some(&keyword), location.as_deref())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_result(&result);
            }
            Ok(())
        }
        Commands::Stats { corpus } => {
            let (loaded, report) = Corpus::load_path(&corpus)?;
            let state = PublishedState::from_corpus(loaded)?;
            let snap = state.current();
            println!("documents: {}", snap.index().num_docs());
            println!("dropped:   {}", report.dropped);
            println!("terms:     {}", snap.index().num_terms());
            Ok(())
        }
        Commands::Interactive { corpus } => interactive(&open(&corpus)?),
    }
}

fn open(path: &str) -> Result<PublishedState> {
    let (corpus, report) = Corpus::load_path(path)?;
    tracing::info!(path, loaded = report.loaded, dropped = report.dropped, "loaded corpus");
    Ok(PublishedState::from_corpus(corpus)?)
}

fn print_result(result: &MatchResult) {
    println!("Headline: {}", result.record.headline());
    println!("Link: {}", result.record.link());
    println!("Date: {}", result.record.date());
    println!("Relevance Score: {:.4}", result.score);
    if let Some(alert) = &result.alert {
        println!("Alert: {alert}");
    }
}

fn interactive(state: &PublishedState) -> Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut prompt = |text: &str| -> Result<Option<String>> {
        print!("{text}");
        io::stdout().flush()?;
        Ok(lines.next().transpose()?.map(|l| l.trim().to_string()))
    };

    loop {
        println!("\nMenu:");
        println!("1. Search for a headline");
        println!("2. Exit");
        let Some(choice) = prompt("Enter your choice: ")? else { return Ok(()) };
        match choice.as_str() {
            "1" => {
                let Some(keyword) = prompt("Enter a keyword: ")? else { return Ok(()) };
                let Some(location) = prompt("Location (optional): ")? else { return Ok(()) };
                match state.query(Some(&keyword), Some(&location)) {
                    Ok(result) => {
                        println!("\nMost Relevant Headline:");
                        print_result(&result);
                    }
                    Err(e @ (Error::NoData | Error::MissingKeyword)) => println!("{e}"),
                    Err(e) => return Err(e.into()),
                }
            }
            "2" => {
                println!("Exiting the program. Goodbye!");
                return Ok(());
            }
            _ => println!("Invalid choice. Please try again."),
        }
    }
}
