//! The CommentCraft instruction prompt.
//!
//! Rendering is pure: the same post always produces a byte-identical prompt
//! (no randomness, no timestamps), which is what makes the builder testable.

use super::engine::TeraEngine;
use crate::generate::types::ExtractedPost;
use crate::platform;
use tera::Context;

const COMMENT_PROMPT_TEMPLATE: &str = r#"You are CommentCraft - an AI assistant specialized in writing short, high-quality comments for social media posts. Your job is to take post content plus minimal context and produce multiple safe, platform-appropriate comment options that a human can choose or edit. Be concise, helpful, and professional. Obey platform norms (LinkedIn: professional, X: short and punchy, Instagram: friendly/emoji-friendly, Reddit: community-aware, Facebook: conversational). Always follow the Safety & Policy rules below.

Input Schema:
- platform: "{{ platform }}"
- post_text: "{{ post_text }}"
- author_handle: "{{ author_handle }}"
- author_role: "{{ author_role }}"
- sentiment_hint: "{{ sentiment_hint }}"
- desired_tone: "{{ desired_tone }}"
- max_length_chars: {{ max_length_chars }}
- avoid_keywords: [{{ avoid_keywords_list }}]
- user_instruction: "{{ user_instruction }}"

Output Schema (JSON only):
{
  "status": "ok" | "rejected",
  "rejection_reason": optional string (if rejected),
  "recommendation": { "comment_id": int },
  "comments": [
    {
      "id": int,
      "tone": string,
      "text": string,
      "length_chars": int,
      "rationale": string
    },
    ...
  ],
  "safety_notes": optional string
}

Generation Rules:
1. Produce 3-5 distinct comment options unless content is disallowed.
2. Each comment must respect max_length_chars ({{ max_length_chars }}).
3. Label each comment with tone and provide 1-2 sentence rationale.
4. Pick one comment as "recommended" - set recommendation.comment_id.
5. Avoid inventing facts. No medical/legal/financial claims.
6. No harassment, hate speech, threats, doxxing, or targeted persuasion.
7. Avoid political persuasion. If political, return neutral comments or reject.
8. If post contains misinformation, provide cautious comments that ask clarifying questions.
9. Respect avoid_keywords: never include {{ avoid_keywords_clause }}.
10. Use platform-specific style for {{ platform }}.

Platform-specific style for {{ platform }}:
- {{ style_guidance }}

Safety & Policy (hard constraints):
- If the post clearly involves self-harm, medical emergencies, explicit illegal activity, or instructions to commit harm, return status "rejected" and set rejection_reason to an empathetic safety message.
- Never generate personal data exposures, private contact details, or anything violating privacy.
- If the post is overt hate/pornographic/extreme violence, reject.

Return JSON only exactly matching the Output Schema. Do not include extra commentary outside JSON."#;

const COMMENT_PROMPT_NAME: &str = "comment_prompt";

/// Ensure the prompt template is registered in the engine.
fn ensure_defaults(engine: &mut TeraEngine) -> anyhow::Result<()> {
    engine.add_template(COMMENT_PROMPT_NAME, COMMENT_PROMPT_TEMPLATE)
}

/// Build the generation instruction for one extracted post.
///
/// The effective length budget is the post's `max_length_chars` when
/// nonzero, else the platform default; the effective tone is the post's
/// `desired_tone` when non-empty, else the platform default.
pub fn build_comment_prompt(
    engine: &mut TeraEngine,
    post: &ExtractedPost,
) -> anyhow::Result<String> {
    ensure_defaults(engine)?;

    let defaults = platform::defaults(post.platform);
    let max_length = if post.max_length_chars > 0 {
        post.max_length_chars
    } else {
        defaults.max_length_chars
    };
    let desired_tone = if post.desired_tone.is_empty() {
        defaults.default_tone
    } else {
        post.desired_tone.as_str()
    };

    let avoid_keywords_list = post
        .avoid_keywords
        .iter()
        .map(|k| format!("\"{k}\""))
        .collect::<Vec<_>>()
        .join(", ");
    let avoid_keywords_clause = if post.avoid_keywords.is_empty() {
        "any forbidden phrases".to_string()
    } else {
        post.avoid_keywords.join(", ")
    };

    let mut ctx = Context::new();
    ctx.insert("platform", &post.platform.to_string());
    ctx.insert("post_text", &post.post_text);
    ctx.insert("author_handle", &post.author_handle);
    ctx.insert("author_role", &post.author_role);
    ctx.insert(
        "sentiment_hint",
        &serde_json::to_value(post.sentiment_hint)?
            .as_str()
            .unwrap_or("neutral")
            .to_string(),
    );
    ctx.insert("desired_tone", desired_tone);
    ctx.insert("max_length_chars", &max_length);
    ctx.insert("avoid_keywords_list", &avoid_keywords_list);
    ctx.insert("avoid_keywords_clause", &avoid_keywords_clause);
    ctx.insert("user_instruction", &post.user_instruction);
    ctx.insert("style_guidance", defaults.style_guidance);

    engine.render(COMMENT_PROMPT_NAME, &ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::types::SentimentHint;
    use crate::platform::PlatformId;

    fn fresh_engine() -> TeraEngine {
        TeraEngine::new().unwrap()
    }

    fn sample_post() -> ExtractedPost {
        ExtractedPost {
            post_text: "We just shipped v2.0!".into(),
            author_handle: "Ada".into(),
            ..ExtractedPost::new(PlatformId::Linkedin)
        }
    }

    #[test]
    fn same_input_renders_byte_identical_prompts() {
        let mut engine = fresh_engine();
        let post = sample_post();
        let first = build_comment_prompt(&mut engine, &post).unwrap();
        let second = build_comment_prompt(&mut engine, &post).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn zero_length_budget_falls_back_to_platform_default() {
        let mut engine = fresh_engine();
        let prompt = build_comment_prompt(&mut engine, &sample_post()).unwrap();
        assert!(prompt.contains("max_length_chars: 300"));
        assert!(prompt.contains("max_length_chars (300)"));
        assert!(prompt.contains("desired_tone: \"professional\""));
    }

    #[test]
    fn explicit_knobs_override_defaults() {
        let mut engine = fresh_engine();
        let post = ExtractedPost {
            max_length_chars: 120,
            desired_tone: "playful".into(),
            ..sample_post()
        };
        let prompt = build_comment_prompt(&mut engine, &post).unwrap();
        assert!(prompt.contains("max_length_chars: 120"));
        assert!(prompt.contains("desired_tone: \"playful\""));
        assert!(!prompt.contains("max_length_chars: 300"));
    }

    #[test]
    fn avoid_keywords_are_listed_and_enforced_in_rules() {
        let mut engine = fresh_engine();
        let post = ExtractedPost {
            avoid_keywords: vec!["synergy".into(), "guru".into()],
            ..sample_post()
        };
        let prompt = build_comment_prompt(&mut engine, &post).unwrap();
        assert!(prompt.contains(r#"avoid_keywords: ["synergy", "guru"]"#));
        assert!(prompt.contains("never include synergy, guru"));
    }

    #[test]
    fn empty_avoid_keywords_use_generic_clause() {
        let mut engine = fresh_engine();
        let prompt = build_comment_prompt(&mut engine, &sample_post()).unwrap();
        assert!(prompt.contains("avoid_keywords: []"));
        assert!(prompt.contains("never include any forbidden phrases"));
    }

    #[test]
    fn prompt_embeds_post_fields_and_schema() {
        let mut engine = fresh_engine();
        let post = ExtractedPost {
            sentiment_hint: SentimentHint::Positive,
            user_instruction: "mention the changelog".into(),
            ..sample_post()
        };
        let prompt = build_comment_prompt(&mut engine, &post).unwrap();
        assert!(prompt.contains("post_text: \"We just shipped v2.0!\""));
        assert!(prompt.contains("author_handle: \"Ada\""));
        assert!(prompt.contains("sentiment_hint: \"positive\""));
        assert!(prompt.contains("user_instruction: \"mention the changelog\""));
        assert!(prompt.contains("Output Schema (JSON only):"));
        assert!(prompt.contains("Return JSON only"));
    }

    #[test]
    fn platform_style_guidance_is_included() {
        let mut engine = fresh_engine();
        let post = ExtractedPost {
            post_text: "hot take".into(),
            ..ExtractedPost::new(PlatformId::Reddit)
        };
        let prompt = build_comment_prompt(&mut engine, &post).unwrap();
        assert!(prompt.contains("Platform-specific style for reddit:"));
        assert!(prompt.contains("follow subreddit tone"));
        assert!(prompt.contains("max_length_chars: 500"));
    }
}
