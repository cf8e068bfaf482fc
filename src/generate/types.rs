use crate::platform::PlatformId;
use serde::{Deserialize, Serialize};

/// Sentiment hint supplied alongside an extracted post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentHint {
    Positive,
    #[default]
    Neutral,
    Negative,
    Mixed,
}

/// Everything scraped from the page plus the caller's generation knobs.
///
/// Created fresh per extraction attempt, never persisted, handed whole to
/// the prompt builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedPost {
    pub platform: PlatformId,
    pub post_text: String,
    #[serde(default)]
    pub author_handle: String,
    #[serde(default)]
    pub author_role: String,
    #[serde(default)]
    pub sentiment_hint: SentimentHint,
    /// Empty means "use the platform default tone".
    #[serde(default)]
    pub desired_tone: String,
    /// Zero means "use the platform default length budget".
    #[serde(default)]
    pub max_length_chars: u32,
    #[serde(default)]
    pub avoid_keywords: Vec<String>,
    #[serde(default)]
    pub user_instruction: String,
}

impl ExtractedPost {
    /// An empty post shell for the given platform, all knobs at defaults.
    pub fn new(platform: PlatformId) -> Self {
        Self {
            platform,
            post_text: String::new(),
            author_handle: String::new(),
            author_role: String::new(),
            sentiment_hint: SentimentHint::Neutral,
            desired_tone: String::new(),
            max_length_chars: 0,
            avoid_keywords: Vec::new(),
            user_instruction: String::new(),
        }
    }

    /// Seed a post from user-selected text (context-menu flow); no DOM
    /// extraction involved.
    pub fn from_selection(platform: PlatformId, selection: &str) -> Self {
        Self {
            post_text: selection.trim().to_string(),
            ..Self::new(platform)
        }
    }
}

/// One generated comment option.
///
/// `tone` is optional: the provider schema has shipped both with and without
/// it, so absence is not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedComment {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
    pub text: String,
    pub length_chars: usize,
    pub rationale: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Ok,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub comment_id: i64,
}

/// The validated outcome of one generation request; the sole unit returned
/// across the service boundary. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub status: ResultStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<Recommendation>,
    #[serde(default)]
    pub comments: Vec<GeneratedComment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safety_notes: Option<String>,
}

impl GenerationResult {
    /// Check the structural invariants the rest of the system relies on:
    /// comments are empty exactly when rejected, and the recommendation
    /// (when present on an ok result) references an existing comment id.
    pub fn check_invariants(&self) -> Result<(), String> {
        match self.status {
            ResultStatus::Rejected => {
                if !self.comments.is_empty() {
                    return Err("rejected result carries comments".to_string());
                }
            }
            ResultStatus::Ok => {
                if self.comments.is_empty() {
                    return Err("ok result carries no comments".to_string());
                }
                if let Some(rec) = self.recommendation
                    && !self.comments.iter().any(|c| c.id == rec.comment_id)
                {
                    return Err(format!(
                        "recommendation references unknown comment id {}",
                        rec.comment_id
                    ));
                }
            }
        }
        Ok(())
    }

    /// The service self-reports `length_chars`; the measured character count
    /// of `text` wins on mismatch.
    pub fn normalize_lengths(&mut self) {
        for comment in &mut self.comments {
            let measured = comment.text.chars().count();
            if comment.length_chars != measured {
                tracing::warn!(
                    id = comment.id,
                    reported = comment.length_chars,
                    measured,
                    "comment length mismatch, using measured length"
                );
                comment.length_chars = measured;
            }
        }
    }

    /// The comment the service marked as best, if any.
    pub fn recommended(&self) -> Option<&GeneratedComment> {
        let rec = self.recommendation?;
        self.comments.iter().find(|c| c.id == rec.comment_id)
    }

    pub fn comment(&self, id: i64) -> Option<&GeneratedComment> {
        self.comments.iter().find(|c| c.id == id)
    }
}
