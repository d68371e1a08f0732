//! Out-of-band evaluation of `ai_detect` rules.
//!
//! The synchronous rule engine deliberately skips `ai_detect` rules; this
//! module runs them against already-captured content - typically from a
//! background task over logged requests - and folds the classifier's
//! answers into ordinary [`MatchResult`]s for the audit store.
//!
//! Every failure mode (transport error, empty answer, non-contract JSON)
//! fails open to "no match". A best-effort classifier must never block
//! the pipeline or surface an error to callers.

use warden_rules::{CustomDataRule, MatchResult, MatchType};

use crate::Classifier;

/// Longest text prefix forwarded to the classifier, in chars. Bounds both
/// token cost and provider latency.
pub const MAX_CLASSIFY_CHARS: usize = 2000;

/// Runs every active `ai_detect` rule over `text` using `classifier`.
///
/// Returns one [`MatchResult`] per rule the classifier matched,
/// preserving priority order (descending, ties in snapshot order) for
/// consistency with the synchronous engine's audit trail.
pub async fn process_ai_detect_rules<C: Classifier + ?Sized>(
    text: &str,
    rules: &[CustomDataRule],
    classifier: &C,
) -> Vec<MatchResult> {
    let mut ai_rules: Vec<&CustomDataRule> = rules
        .iter()
        .filter(|r| r.match_type == MatchType::AiDetect && r.is_active)
        .collect();
    ai_rules.sort_by_key(|r| std::cmp::Reverse(r.priority));

    let prefix = char_prefix(text, MAX_CLASSIFY_CHARS);
    let mut results = Vec::new();

    for rule in ai_rules {
        match classifier.classify(prefix, &rule.pattern).await {
            Ok(classification) if classification.matched => {
                tracing::debug!(
                    rule = %rule.name,
                    snippets = classification.snippets.len(),
                    "ai_detect rule matched"
                );
                results.push(MatchResult {
                    matched: true,
                    snippets: classification.snippets,
                    rule: rule.clone(),
                });
            }
            Ok(_) => {}
            Err(err) => {
                // Fail open: availability of the pipeline outranks this
                // one rule's findings.
                tracing::warn!(rule = %rule.name, %err, "ai_detect classification failed, treating as no match");
            }
        }
    }

    results
}

/// First `max_chars` chars of `text` as a slice, never splitting a char.
fn char_prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
