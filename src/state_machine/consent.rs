//! Consent detection for the scripted offer
//!
//! This is an exact vocabulary match, not a semantic classifier. "yes please"
//! and "ok." are refusals. Keep it that way: widening the match changes when
//! the offer is sent.

/// Replies that count as consent, compared case-insensitively
const AFFIRMATIVE: &[&str] = &["yes", "ok", "sure", "send", "send it", "okay"];

/// True when the trimmed text equals one of the affirmative words
pub fn is_affirmative(text: &str) -> bool {
    let text = text.trim();
    AFFIRMATIVE.iter().any(|word| text.eq_ignore_ascii_case(word))
}
