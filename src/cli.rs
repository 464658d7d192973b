//! CLI argument definitions using clap derive macros.

use clap::Parser;

/// Endless feed of Wikipedia film articles for the terminal.
///
/// Samples release years biased toward the present, lists their film
/// categories, and prints one card per article. Each page after the first
/// is served from a read-ahead buffer when one is ready.
#[derive(Parser, Debug)]
#[command(name = "filmfeed")]
#[command(author, version, about)]
pub struct Args {
    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Wikipedia edition or script variant (see --list-languages) [default: en]
    #[arg(short = 'L', long)]
    pub language: Option<String>,

    /// Number of feed pages to pull before exiting (1-1000)
    #[arg(short = 'p', long, default_value_t = 3, value_parser = clap::value_parser!(u16).range(1..=1000))]
    pub pages: u16,

    /// Print one JSON object per article instead of cards
    #[arg(long)]
    pub json: bool,

    /// Skip thumbnail preloading
    #[arg(long)]
    pub no_preload: bool,

    /// Maximum retry attempts for transient API failures (0-10) [default: 3]
    #[arg(short = 'r', long, value_parser = clap::value_parser!(u8).range(0..=10))]
    pub max_retries: Option<u8>,

    /// Release years queried concurrently per fetch (1-10) [default: 3]
    #[arg(short = 'y', long, value_parser = clap::value_parser!(u8).range(1..=10))]
    pub years: Option<u8>,

    /// List supported languages and exit
    #[arg(long)]
    pub list_languages: bool,
}
