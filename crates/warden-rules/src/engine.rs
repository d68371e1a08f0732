//! Rule-engine orchestration.
//!
//! One pass over a snapshot of rules: sort by priority (descending,
//! stable), evaluate every active synchronous rule against the original
//! text, and apply each matching rule's action in that order against a
//! running copy of the content. Evaluation never short-circuits - a block
//! match is recorded as a veto flag and later rules still run, so the
//! audit trail always shows the complete set of matches.
//!
//! Determinism: for a fixed `(text, rules)` pair repeated passes yield
//! byte-identical content and identical match order. Auditability depends
//! on this.

use serde_json::Value;

use crate::actions::{apply_mask, apply_redact};
use crate::rule::{CustomDataRule, MatchResult, ProcessedContent, RuleAction};

/// Evaluates all active synchronous rules against `text` and applies
/// their actions. `json` supplies structured input for `json_path` rules;
/// without it those rules report no match.
///
/// `ai_detect` rules are skipped here by design - their external call
/// belongs out of the hot path. See `warden-classify`.
pub fn process_rules(
    text: &str,
    rules: &[CustomDataRule],
    json: Option<&Value>,
) -> ProcessedContent {
    let mut ordered: Vec<&CustomDataRule> = rules.iter().collect();
    // Stable sort: equal priorities keep their snapshot order.
    ordered.sort_by_key(|r| std::cmp::Reverse(r.priority));

    let mut content = text.to_string();
    let mut matched_rules: Vec<MatchResult> = Vec::new();
    let mut should_block = false;

    for rule in ordered {
        if !rule.is_active {
            continue;
        }

        let hit = rule.match_type.evaluate(rule, text, json);
        if !hit.matched {
            tracing::trace!(rule = %rule.name, "no match");
            continue;
        }

        tracing::debug!(
            rule = %rule.name,
            match_type = ?rule.match_type,
            action = ?rule.action,
            snippets = hit.snippets.len(),
            "custom rule matched"
        );

        match rule.action {
            RuleAction::Block => should_block = true,
            RuleAction::Mask => content = apply_mask(&content, &hit.snippets),
            RuleAction::Redact => content = apply_redact(&content, &hit.snippets),
        }

        matched_rules.push(MatchResult {
            matched: true,
            snippets: hit.snippets,
            rule: rule.clone(),
        });
    }

    ProcessedContent {
        content,
        was_processed: !matched_rules.is_empty(),
        matched_rules,
        should_block,
    }
}
