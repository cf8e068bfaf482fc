//! Turning the provider's raw text into a validated [`GenerationResult`].
//!
//! The model frequently wraps its JSON in a markdown code fence even when
//! asked not to, so exactly one leading/trailing fence is stripped before
//! parsing.

use super::types::GenerationResult;
use crate::error::GenerateError;

/// Strip exactly one leading/trailing markdown code fence, if present.
///
/// Handles both ```` ```json ```` and bare ```` ``` ```` openers. Anything
/// that is not a complete fence pair is returned untouched; nested fences
/// inside the payload are preserved.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();

    let rest = if let Some(rest) = trimmed.strip_prefix("```json") {
        rest
    } else if let Some(rest) = trimmed.strip_prefix("```") {
        rest
    } else {
        return trimmed;
    };

    let Some(inner) = rest.strip_suffix("```") else {
        return trimmed;
    };

    inner.trim()
}

/// Parse the (possibly fenced) generated text into a `GenerationResult`,
/// normalize self-reported lengths, and enforce the structural invariants.
pub fn parse_generation_result(text: &str) -> Result<GenerationResult, GenerateError> {
    let payload = strip_code_fence(text);

    let mut result: GenerationResult = serde_json::from_str(payload).map_err(|parse_err| {
        tracing::debug!(error = %parse_err, raw = %payload, "unparseable generation payload");
        GenerateError::MalformedPayload {
            raw: text.to_string(),
        }
    })?;

    result.normalize_lengths();

    result
        .check_invariants()
        .map_err(|detail| GenerateError::SchemaViolation { detail })?;

    Ok(result)
}
