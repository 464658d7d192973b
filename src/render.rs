//! Terminal presentation of feed articles.

use std::fmt::Write as _;

use filmfeed_core::{Article, Language};

/// Characters of extract shown on a card.
const PREVIEW_CHARS: usize = 280;

/// Renders one article as a plain-text card, numbered from 1.
pub(crate) fn card(position: usize, article: &Article) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "#{position} {}", article.title);
    if article.title != article.canonical_title {
        let _ = writeln!(out, "   ({})", article.canonical_title);
    }
    let preview = article.preview(PREVIEW_CHARS);
    if preview.len() < article.extract.len() {
        let _ = writeln!(out, "   {preview}...");
    } else {
        let _ = writeln!(out, "   {preview}");
    }
    if let Some(thumbnail) = &article.thumbnail {
        let _ = writeln!(
            out,
            "   image: {} ({}x{})",
            thumbnail.url, thumbnail.width, thumbnail.height
        );
    }
    let _ = writeln!(out, "   {}", article.url);
    out
}

/// Renders one article as a single NDJSON line (no trailing newline).
pub(crate) fn json_line(article: &Article) -> serde_json::Result<String> {
    serde_json::to_string(article)
}

/// Table printed by `--list-languages`.
pub(crate) fn language_table() -> String {
    let mut out = String::new();
    for language in Language::builtin() {
        let _ = writeln!(out, "{:<6} {:<24} {}", language.id, language.name, language.api);
    }
    out
}
