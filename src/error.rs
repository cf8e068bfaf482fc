use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for CommentCraft.
///
/// Each subsystem defines its own error variant. Library callers can match on
/// these to decide how to present a failure; binary code continues to use
/// `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum CraftError {
    #[error("extract: {0}")]
    Extract(#[from] ExtractError),

    #[error("generate: {0}")]
    Generate(#[from] GenerateError),

    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("service: {0}")]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Extraction errors ───────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported page: {url}")]
    UnsupportedPage { url: String },

    #[error("could not extract post content; try selecting the post text manually")]
    NoPostText,
}

// ─── Generation errors ───────────────────────────────────────────────────────

/// Failures of a single generation attempt. All are terminal: there is no
/// retry anywhere in the pipeline, the user re-triggers.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("API key not configured; run `commentcraft auth set-key` or set GEMINI_API_KEY")]
    MissingApiKey,

    #[error("generation request failed ({}): {message}", status_label(.status))]
    Transport {
        status: Option<u16>,
        message: String,
    },

    #[error("generation service returned no text; failed to generate")]
    ResponseShape,

    /// The raw payload is carried for diagnostics and logged at debug level,
    /// never rendered to the user.
    #[error("generation service returned an unusable payload; failed to generate")]
    MalformedPayload { raw: String },

    #[error("generation result is inconsistent ({detail}); failed to generate")]
    SchemaViolation { detail: String },
}

fn status_label(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!("HTTP {code}"),
        None => "no response".to_string(),
    }
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("failed to save config: {0}")]
    Save(String),

    #[error("credential store: {0}")]
    Credentials(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Service errors ──────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("generation service unavailable")]
    Unavailable,
}

// ─── Convenience re-exports ──────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, CraftError>;
