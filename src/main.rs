//! CLI entry point for the film feed.

use std::io::{self, IsTerminal, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use filmfeed_core::{
    DEFAULT_MAX_RETRIES, FeedConfig, FeedOrchestrator, FetchOutcome, Language, MediaWikiClient,
    RetryPolicy, WikiApi,
};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

mod app_config;
mod cli;
mod render;

use app_config::{FileConfig, load_default_file_config};
use cli::Args;

/// Pages in a row that may add nothing before the feed gives up.
const MAX_EMPTY_PAGES: u32 = 2;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    if args.list_languages {
        print!("{}", render::language_table());
        return Ok(());
    }

    let file_config = load_default_file_config()?.unwrap_or_default();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > config file > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => file_config.verbosity.map_or("info", |v| v.level()),
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    debug!(?args, ?file_config, "CLI arguments parsed");

    let language_id = args
        .language
        .clone()
        .or_else(|| file_config.language.clone())
        .unwrap_or_else(|| "en".to_string());
    let language = Language::find(&language_id).with_context(|| {
        format!("Unknown language '{language_id}'. Run with --list-languages to see the options")
    })?;
    info!(language = %language.id, api = %language.api, "Film feed starting");

    let feed_config = build_feed_config(&args, &file_config);
    let max_retries = args
        .max_retries
        .or(file_config.max_retries)
        .map_or(DEFAULT_MAX_RETRIES, u32::from);
    let retry_policy = RetryPolicy::with_max_attempts(max_retries);

    let client = MediaWikiClient::with_retry_policy(language, retry_policy)
        .context("Failed to create MediaWiki client")?
        .with_thumbnail_size(feed_config.thumbnail_size);
    let api: Arc<dyn WikiApi> = Arc::new(client);
    let feed = Arc::new(
        FeedOrchestrator::new(api, feed_config).context("Failed to create image preloader")?,
    );

    let use_spinner = !args.quiet && !args.json && io::stderr().is_terminal();
    let mut shown = 0usize;
    let mut empty_pages = 0u32;

    for page in 0..args.pages {
        let spinner = page_spinner(use_spinner, page);
        let outcome = next_page(&feed, page == 0).await;
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }
        debug!(page, ?outcome, "page finished");

        let articles = feed.articles();
        let fresh = articles.get(shown..).unwrap_or_default();
        print_articles(fresh, shown, args.json)?;
        shown = articles.len();

        if fresh.is_empty() {
            empty_pages += 1;
            if empty_pages >= MAX_EMPTY_PAGES {
                warn!(pages = page + 1, "Feed stopped growing, giving up");
                break;
            }
        } else {
            empty_pages = 0;
        }
    }

    let stats = feed.stats();
    info!(
        articles = shown,
        user_fetches = stats.user_fetches(),
        skipped = stats.skipped(),
        primary_attempts = stats.primary_attempts(),
        fallback_attempts = stats.fallback_attempts(),
        promotions = stats.promotions(),
        read_ahead_fetches = stats.read_ahead_fetches(),
        "Film feed finished"
    );

    Ok(())
}

fn build_feed_config(args: &Args, file: &FileConfig) -> FeedConfig {
    let mut config = FeedConfig::default();
    if let Some(years) = args.years.or(file.years_per_fetch) {
        config = config.with_years_per_fetch(usize::from(years));
    }
    if let Some(ms) = file.fetch_cooldown_ms {
        config = config.with_fetch_cooldown(Duration::from_millis(ms));
    }
    if let Some(ms) = file.read_ahead_delay_ms {
        config = config.with_read_ahead_delay(Duration::from_millis(ms));
    }
    let preload = !args.no_preload && file.preload.unwrap_or(true);
    config.with_preload(preload)
}

/// Pulls one page, waiting out the cooldown instead of skipping it.
async fn next_page(feed: &Arc<FeedOrchestrator>, first: bool) -> FetchOutcome {
    let mut outcome = if first {
        feed.fetch_articles().await
    } else {
        feed.get_more_articles().await
    };
    while let FetchOutcome::RateLimited { retry_in } = outcome {
        debug!(retry_in_ms = retry_in.as_millis(), "Waiting out fetch cooldown");
        tokio::time::sleep(retry_in).await;
        outcome = feed.get_more_articles().await;
    }
    outcome
}

fn page_spinner(enabled: bool, page: u16) -> Option<ProgressBar> {
    if !enabled {
        return None;
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("Loading page {}...", page + 1));
    spinner.enable_steady_tick(Duration::from_millis(100));
    Some(spinner)
}

fn print_articles(articles: &[filmfeed_core::Article], offset: usize, json: bool) -> Result<()> {
    let mut stdout = io::stdout().lock();
    for (index, article) in articles.iter().enumerate() {
        if json {
            writeln!(stdout, "{}", render::json_line(article)?)?;
        } else {
            writeln!(stdout, "{}", render::card(offset + index + 1, article))?;
        }
    }
    stdout.flush()?;
    Ok(())
}
