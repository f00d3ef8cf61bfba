use anyhow::{Context, Result};
use clap::Parser;
use newsradar_crawler::{write_csv, NewsSource, DEFAULT_SOURCE_URL, DEFAULT_USER_AGENT};
use std::fs::{self, File};
use std::io::BufWriter;
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "newsradar-crawler")]
#[command(about = "Fetch the latest headlines once and write them as CSV")]
struct Cli {
    /// Search results page to scrape
    #[arg(long, default_value = DEFAULT_SOURCE_URL)]
    url: String,
    /// Output CSV file path
    #[arg(long, default_value = "./news.csv")]
    output: String,
    /// Request timeout seconds
    #[arg(long, default_value_t = 12)]
    timeout_secs: u64,
    /// User-Agent string to send
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    user_agent: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Cli::parse();
    if let Some(dir) = std::path::Path::new(&args.output).parent() {
        fs::create_dir_all(dir).ok();
    }

    let source = NewsSource::new(&args.url, &args.user_agent, Duration::from_secs(args.timeout_secs))?;
    let records = source.fetch().await?;

    // Write-then-rename: readers of the output never observe a partial file.
    let tmp = format!("{}.tmp", args.output);
    let out = BufWriter::new(File::create(&tmp).with_context(|| format!("creating {tmp}"))?);
    write_csv(&records, out)?;
    fs::rename(&tmp, &args.output)?;

    tracing::info!(records = records.len(), output = %args.output, "wrote headlines");
    Ok(())
}
