//! The paragraph sequence narrated for one chapter.

use std::sync::Arc;

/// Ordered, immutable paragraphs of one chapter.
///
/// Cloning is cheap (shared `Arc<[String]>`), so the player, the prefetch
/// scheduler and the UI can all hold the same sequence read-only.
///
/// Empty and whitespace-only paragraphs are dropped at ingestion by
/// [`Paragraphs::from_chapter`]. The player never has to skip or reject a
/// blank entry mid-chapter when paragraphs arrive this way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraphs(Arc<[String]>);

impl Paragraphs {
    /// Build from scraped chapter text: trims each paragraph and drops the
    /// ones that are empty after trimming.
    pub fn from_chapter<I, S>(paragraphs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let kept: Vec<String> = paragraphs
            .into_iter()
            .filter_map(|p| {
                let trimmed = p.as_ref().trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .collect();
        Self(kept.into())
    }

    /// Build without any filtering.
    ///
    /// Blank entries survive and are rejected by the player at load time
    /// with an empty-input error.
    pub fn from_raw(paragraphs: Vec<String>) -> Self {
        Self(paragraphs.into())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

/// Normalize paragraph text for cache lookups: trim and collapse every
/// whitespace run to a single space.
#[must_use]
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
