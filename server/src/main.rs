use anyhow::Result;
use axum::Router;
use clap::Parser;
use newsradar_core::{Corpus, PublishedState, RefreshConfig, RefreshCoordinator, RefreshMonitor};
use newsradar_crawler::{NewsSource, DEFAULT_SOURCE_URL, DEFAULT_USER_AGENT};
use newsradar_server::{build_app, AppState};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Corpus file loaded at startup (.csv, .jsonl or .json)
    #[arg(long, default_value = "./news.csv")]
    corpus: String,
    /// Host to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 5000)]
    port: u16,
    /// Seconds between refreshes
    #[arg(long, default_value_t = 300)]
    refresh_secs: u64,
    /// Consecutive refresh failures before they are logged as errors
    #[arg(long, default_value_t = 3)]
    escalate_after: u32,
    /// Disable the background refresh and serve the startup corpus only
    #[arg(long, default_value_t = false)]
    no_refresh: bool,
    /// Search results page scraped on each refresh
    #[arg(long, default_value = DEFAULT_SOURCE_URL)]
    source_url: String,
    /// User-Agent sent by the refresh scraper
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    user_agent: String,
    /// Scraper request timeout seconds
    #[arg(long, default_value_t = 12)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let published = match Corpus::load_path(&args.corpus) {
        Ok((corpus, report)) => {
            tracing::info!(corpus = %args.corpus, loaded = report.loaded, dropped = report.dropped, "loaded startup corpus");
            PublishedState::from_corpus(corpus)?
        }
        Err(e) => {
            tracing::warn!(corpus = %args.corpus, error = %e, "startup corpus unavailable; serving no data until first refresh");
            PublishedState::default()
        }
    };

    let monitor = if args.no_refresh {
        RefreshMonitor::default()
    } else {
        let source = NewsSource::new(&args.source_url, &args.user_agent, Duration::from_secs(args.timeout_secs))?;
        let config = RefreshConfig { interval: Duration::from_secs(args.refresh_secs.max(1)), escalate_after: args.escalate_after };
        let coordinator = RefreshCoordinator::new(source, published.clone(), config);
        let monitor = coordinator.monitor();
        coordinator.spawn();
        tracing::info!(interval_secs = args.refresh_secs, url = %args.source_url, "refresh coordinator started");
        monitor
    };

    let app: Router = build_app(AppState::new(published, monitor));
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
