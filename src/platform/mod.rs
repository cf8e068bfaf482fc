//! Supported social platforms: URL detection, DOM selector tables, and
//! per-platform generation defaults.
//!
//! The selector lists are duck-typed against third-party markup that changes
//! without notice, so every field carries several fallbacks tried in order.

use serde::{Deserialize, Serialize};

/// A supported social network, inferred once per page from the URL.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PlatformId {
    Linkedin,
    X,
    Instagram,
    Facebook,
    Reddit,
}

impl PlatformId {
    /// Infer the platform from a page URL.
    ///
    /// Fixed substring tests in fixed priority order, first match wins.
    /// `None` means "unsupported page" and callers must not attempt
    /// extraction.
    pub fn from_url(url: &str) -> Option<Self> {
        if url.contains("linkedin.com") {
            Some(Self::Linkedin)
        } else if url.contains("twitter.com") || url.contains("x.com") {
            Some(Self::X)
        } else if url.contains("instagram.com") {
            Some(Self::Instagram)
        } else if url.contains("facebook.com") {
            Some(Self::Facebook)
        } else if url.contains("reddit.com") {
            Some(Self::Reddit)
        } else {
            None
        }
    }
}

/// Ordered selector lists for locating the parts of a post on one platform.
///
/// Read-only static configuration; earlier entries are more specific and are
/// preferred, later entries are progressively broader fallbacks.
#[derive(Debug)]
pub struct SelectorSet {
    pub post_text: &'static [&'static str],
    pub author_name: &'static [&'static str],
    pub comment_box: &'static [&'static str],
}

/// Generation defaults applied when the caller leaves a field unset.
#[derive(Debug)]
pub struct PlatformDefaults {
    pub max_length_chars: u32,
    pub default_tone: &'static str,
    /// Style guidance embedded verbatim in the prompt.
    pub style_guidance: &'static str,
}

static LINKEDIN_SELECTORS: SelectorSet = SelectorSet {
    post_text: &[
        ".feed-shared-text",
        "[data-test-id='post-text']",
        ".feed-shared-update-v2__description",
        ".feed-shared-text__text",
        ".feed-shared-mini-update-v2__commentary",
        ".break-words",
    ],
    author_name: &[
        ".feed-shared-actor__name",
        "[data-test-id='actor-name']",
        ".feed-shared-actor__title",
        ".hoverable-link-text",
    ],
    comment_box: &[
        "[data-test-id='comments-comment-box-textarea']",
        ".ql-editor",
        ".comments-comment-textarea",
        ".feed-shared-text-input__container",
        ".mentions-text-editor__contenteditable",
    ],
};

static X_SELECTORS: SelectorSet = SelectorSet {
    post_text: &[
        "[data-testid='tweetText']",
        ".css-1dbjc4n.r-37qu5q.r-1qd0xha.r-a023e6.r-rjixqe.r-16dba41",
    ],
    author_name: &[
        "[data-testid='User-Name'] a",
        ".css-4rbku5.css-18t94o4.css-1dbjc4n.r-1loqt21.r-1wbh5a2.r-dnmrzs",
    ],
    comment_box: &[
        "[data-testid='tweetTextarea_0']",
        ".public-DraftEditorPlaceholder-root",
        ".css-1dbjc4n.r-1aw1wy-6.r-18u37iz",
    ],
};

static INSTAGRAM_SELECTORS: SelectorSet = SelectorSet {
    post_text: &["article div span", ".css-1q2y3gz", ".C4VMK"],
    author_name: &["article header a", ".css-1q2y3gz", ".C7VMK"],
    comment_box: &[
        "textarea[aria-label='Add a comment\u{2026}']",
        ".XQXOT",
        ".Ypffh",
    ],
};

static FACEBOOK_SELECTORS: SelectorSet = SelectorSet {
    post_text: &[
        "[data-testid='post_message']",
        ".x1lliihq.x6ikm8r.x10wlt62.x1n2onr6",
    ],
    author_name: &["[data-testid='story-subtitle']", ".x1lliihq.x6ikm8r.x10wlt62"],
    comment_box: &[
        "[data-testid='comment-Composer-Input']",
        ".x1lliihq.x6ikm8r.x10wlt62.x1n2onr6.xlyipyv",
    ],
};

static REDDIT_SELECTORS: SelectorSet = SelectorSet {
    post_text: &[
        "[data-testid='post-content'] h3",
        "h3[slot='title']",
        ".p13z-unf",
    ],
    author_name: &["[data-testid='post-content'] a[href*='/user/']", ".p13z-unf"],
    comment_box: &[
        "textarea[name='comment']",
        ".public-DraftEditorPlaceholder-root",
        ".comment-textarea",
    ],
};

/// Selector table lookup. Always non-empty for every supported platform.
pub fn selectors(platform: PlatformId) -> &'static SelectorSet {
    match platform {
        PlatformId::Linkedin => &LINKEDIN_SELECTORS,
        PlatformId::X => &X_SELECTORS,
        PlatformId::Instagram => &INSTAGRAM_SELECTORS,
        PlatformId::Facebook => &FACEBOOK_SELECTORS,
        PlatformId::Reddit => &REDDIT_SELECTORS,
    }
}

static LINKEDIN_DEFAULTS: PlatformDefaults = PlatformDefaults {
    max_length_chars: 300,
    default_tone: "professional",
    style_guidance: "formal, constructive, value-add, up to 300 chars. Prefer insights, \
                     questions, short bullets, or praise tied to a lesson.",
};

static X_DEFAULTS: PlatformDefaults = PlatformDefaults {
    max_length_chars: 280,
    default_tone: "short",
    style_guidance: "short (<=280 chars), sharp, witty or insightful; can include 1-2 emojis.",
};

static INSTAGRAM_DEFAULTS: PlatformDefaults = PlatformDefaults {
    max_length_chars: 2200,
    default_tone: "friendly",
    style_guidance: "warm, emoji-friendly, conversational, can be up to 2200 chars but keep \
                     it short for comments (<=250 recommended).",
};

static FACEBOOK_DEFAULTS: PlatformDefaults = PlatformDefaults {
    max_length_chars: 500,
    default_tone: "friendly",
    style_guidance: "friendly, conversational, slightly longer than X (<=500).",
};

static REDDIT_DEFAULTS: PlatformDefaults = PlatformDefaults {
    max_length_chars: 500,
    default_tone: "neutral",
    style_guidance: "follow subreddit tone; if unknown, be neutral and ask a clarifying \
                     question; avoid promotional content.",
};

pub fn defaults(platform: PlatformId) -> &'static PlatformDefaults {
    match platform {
        PlatformId::Linkedin => &LINKEDIN_DEFAULTS,
        PlatformId::X => &X_DEFAULTS,
        PlatformId::Instagram => &INSTAGRAM_DEFAULTS,
        PlatformId::Facebook => &FACEBOOK_DEFAULTS,
        PlatformId::Reddit => &REDDIT_DEFAULTS,
    }
}
