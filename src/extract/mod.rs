//! Post extraction: prioritized-fallback selector scans over a rendered
//! page.
//!
//! The selector tables chase unstable third-party markup, so the scan is
//! deliberately forgiving: an invalid selector is logged and skipped, a
//! selector with no match falls through to the next one, and a full miss
//! yields an empty field rather than an error. Whether an empty `post_text`
//! is fatal is the caller's decision.

use crate::generate::types::ExtractedPost;
use crate::platform::{self, PlatformId};
use scraper::{Html, Selector};

/// A source of page text addressable by selector lists.
///
/// The selector-table-plus-first-match strategy lives behind this trait so
/// alternate backends (an accessibility-tree query, a test fixture) can be
/// substituted without touching the attacher or the prompt builder.
pub trait ExtractionBackend: Send {
    /// Walk `selectors` in priority order and return the first non-empty
    /// trimmed text, or `None` if every selector misses.
    fn first_text(&self, selectors: &[&str]) -> Option<String>;
}

/// Backend over a captured HTML document.
pub struct DomBackend {
    html: String,
}

impl DomBackend {
    pub fn parse(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }
}

impl ExtractionBackend for DomBackend {
    fn first_text(&self, selectors: &[&str]) -> Option<String> {
        let document = Html::parse_document(&self.html);

        for raw in selectors {
            let Ok(selector) = Selector::parse(raw) else {
                // A bad selector must never abort the scan of the rest.
                tracing::debug!(selector = *raw, "invalid selector, skipping");
                continue;
            };

            if let Some(element) = document.select(&selector).next() {
                let text = element.text().collect::<Vec<_>>().join(" ");
                let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
                if !normalized.is_empty() {
                    tracing::debug!(selector = *raw, "selector matched");
                    return Some(normalized);
                }
            }
        }

        None
    }
}

/// Extract post data for `platform` from the backend.
///
/// Fields that no selector can fill come back empty; generation knobs start
/// at their defaults (neutral sentiment, unset tone and length budget).
pub fn extract_post(backend: &dyn ExtractionBackend, platform: PlatformId) -> ExtractedPost {
    let set = platform::selectors(platform);

    let post_text = backend.first_text(set.post_text).unwrap_or_default();
    let author_handle = backend.first_text(set.author_name).unwrap_or_default();

    if post_text.is_empty() {
        tracing::warn!(%platform, "no selector yielded post text");
    }

    ExtractedPost {
        post_text,
        author_handle,
        ..ExtractedPost::new(platform)
    }
}
