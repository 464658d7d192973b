//! Order-preserving deduplication and merging.
//!
//! Both functions are pure: they take the current lists by reference and
//! return new ones, so every mutation of the visible list and the read-ahead
//! buffer goes through them and can never introduce a duplicate id.

use std::collections::HashSet;

use crate::api::CategoryMember;
use crate::article::Article;

/// Something with a stable identifier.
pub trait Identified {
    /// The identifier duplicates are detected by.
    fn identifier(&self) -> &str;
}

impl Identified for Article {
    fn identifier(&self) -> &str {
        &self.id
    }
}

/// Discovery candidates are keyed by title; page ids are only unique
/// within one wiki and titles are what the detail query takes.
impl Identified for CategoryMember {
    fn identifier(&self) -> &str {
        &self.title
    }
}

/// Returns `items` with every repeat of an already-seen identifier removed,
/// keeping first-seen order.
#[must_use]
pub fn deduplicate<T: Identified + Clone>(items: &[T]) -> Vec<T> {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .iter()
        .filter(|item| seen.insert(item.identifier()))
        .cloned()
        .collect()
}

/// Returns `existing` unchanged, followed by the `incoming` items whose
/// identifiers are not yet present, in `incoming` order.
#[must_use]
pub fn merge<T: Identified + Clone>(existing: &[T], incoming: &[T]) -> Vec<T> {
    let mut combined = Vec::with_capacity(existing.len() + incoming.len());
    combined.extend_from_slice(existing);
    combined.extend_from_slice(incoming);
    deduplicate(&combined)
}
