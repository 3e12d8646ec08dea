//! Fixed prompt text for the two-stage generation pipeline

/// System instruction for the prompt-optimization stage
pub const OPTIMIZER_SYSTEM_PROMPT: &str = r#"You are an internal DALL-E 3 prompt optimizer. Your job is to transform user prompts into detailed, high-quality DALL-E 3 prompts.

IMPORTANT RULES:
1. Add professional photography details: lighting, composition, camera settings, style
2. Include specific visual details: textures, colors, atmosphere, mood
3. Specify image quality: "photorealistic", "high resolution", "professional quality"
4. Add artistic style if not specified: "cinematic", "award-winning photography", etc.
5. Keep the user's core intent but enhance dramatically
6. Use 50-150 words for optimal results
7. Write in English even if the user writes in German
8. DO NOT use quotation marks in your response
9. If the prompt shows a person or a face, emphasize natural skin texture, realistic facial proportions and flattering portrait lighting
10. Focus on visual elements that DALL-E 3 understands well

Transform this user prompt into an optimized DALL-E 3 prompt:"#;

/// Quality-descriptor prefix used when the optimization call fails
pub const FALLBACK_PROMPT_PREFIX: &str = "Create a stunning, highly detailed, photorealistic image with professional lighting, sharp focus, vibrant colors, cinematic composition, award-winning photography quality. Subject: ";

/// Appended to the fallback when the prompt asks for a person or a face
pub const FACE_ENHANCEMENT_PHRASE: &str = " Render natural skin texture, realistic facial proportions, detailed expressive eyes and soft portrait lighting.";

/// Case-insensitive markers for prompts about people, English and German
pub const HUMAN_SUBJECT_KEYWORDS: &[&str] = &[
    "person", "face", "portrait", "people", "woman", "man", "girl", "boy", "child", "human",
    "gesicht", "frau", "mann", "kind", "mensch", "junge", "mädchen", "porträt",
];

/// Returns true when the prompt mentions a human subject
pub fn mentions_human_subject(prompt: &str) -> bool {
    let lower = prompt.to_lowercase();
    HUMAN_SUBJECT_KEYWORDS.iter().any(|k| lower.contains(k))
}

/// Deterministic local replacement for a failed optimization call.
///
/// Always contains the raw prompt verbatim so the user's intent survives
/// the degraded path.
pub fn fallback_prompt(raw_prompt: &str) -> String {
    let mut enhanced = format!("{}{}", FALLBACK_PROMPT_PREFIX, raw_prompt);
    if mentions_human_subject(raw_prompt) {
        enhanced.push_str(FACE_ENHANCEMENT_PHRASE);
    }
    enhanced
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_contains_raw_prompt() {
        let raw = "a red fox in snow";
        let enhanced = fallback_prompt(raw);
        assert!(enhanced.contains(raw));
        assert!(enhanced.starts_with(FALLBACK_PROMPT_PREFIX));
    }

    #[test]
    fn test_fallback_without_human_subject_has_no_face_phrase() {
        let enhanced = fallback_prompt("a red fox in snow");
        assert!(!enhanced.contains(FACE_ENHANCEMENT_PHRASE));
    }

    #[test]
    fn test_fallback_with_human_subject_has_face_phrase() {
        for raw in [
            "portrait of an old sailor",
            "a WOMAN reading in a cafe",
            "das Gesicht eines Kindes",
            "ein Mann im Regen",
        ] {
            let enhanced = fallback_prompt(raw);
            assert!(enhanced.contains(FACE_ENHANCEMENT_PHRASE), "missed: {}", raw);
            assert!(enhanced.contains(raw));
        }
    }

    #[test]
    fn test_keyword_match_is_case_insensitive() {
        assert!(mentions_human_subject("A Face In The Crowd"));
        assert!(mentions_human_subject("PORTRAIT"));
        assert!(!mentions_human_subject("a bowl of fruit"));
    }
}
