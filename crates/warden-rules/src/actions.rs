//! Mask and redact text transforms.
//!
//! Pure helpers used by the engine when applying rule actions. Each
//! snippet is replaced at its first occurrence only; rules later in
//! priority order operate on the already-mutated string, so overlapping
//! matches interact in a deterministic, priority-driven way.

/// Replacement token used by the redact action.
pub const REDACTED_TOKEN: &str = "[REDACTED]";

/// Interior mask length is capped so long snippets don't balloon output.
const MAX_MASK_CHARS: usize = 10;

/// Masks each snippet inside `text`: snippets of four chars or fewer
/// become `****`; longer ones keep their first two and last two chars
/// with a starred interior.
pub fn apply_mask(text: &str, snippets: &[String]) -> String {
    let mut result = text.to_string();
    for snippet in snippets {
        result = result.replacen(snippet.as_str(), &mask_snippet(snippet), 1);
    }
    result
}

/// Replaces each snippet inside `text` with [`REDACTED_TOKEN`].
pub fn apply_redact(text: &str, snippets: &[String]) -> String {
    let mut result = text.to_string();
    for snippet in snippets {
        result = result.replacen(snippet.as_str(), REDACTED_TOKEN, 1);
    }
    result
}

/// Builds the masked form of one snippet. Operates on chars, not bytes,
/// so multibyte snippets mask cleanly.
fn mask_snippet(snippet: &str) -> String {
    let chars: Vec<char> = snippet.chars().collect();
    if chars.len() <= 4 {
        return "****".to_string();
    }
    let stars = (chars.len() - 4).min(MAX_MASK_CHARS);
    let mut masked = String::with_capacity(4 + stars);
    masked.extend(&chars[..2]);
    masked.extend(std::iter::repeat('*').take(stars));
    masked.extend(&chars[chars.len() - 2..]);
    masked
}
