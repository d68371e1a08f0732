//! Matchers for each rule type.
//!
//! Dispatch is an enum method on [`MatchType`] - one table, no branches
//! scattered across call sites; adding a match type means adding a variant
//! and an arm here.
//!
//! A malformed user pattern (bad regex, nonsense path) is never allowed to
//! take down the batch: it is logged and the rule simply contributes no
//! match.

use regex::RegexBuilder;
use serde_json::Value;

use crate::rule::{CustomDataRule, MatchType, RuleMatch};

/// Context window captured around a keyword hit, in bytes on each side.
/// Masking a recognizable span beats masking the bare keyword.
const KEYWORD_WINDOW: usize = 10;

impl MatchType {
    /// Evaluates `rule` against `text` (and `json`, when structured input
    /// was supplied). The synchronous entry point: `AiDetect` rules always
    /// report no match here and are handled out-of-band by the classifier
    /// path.
    pub fn evaluate(&self, rule: &CustomDataRule, text: &str, json: Option<&Value>) -> RuleMatch {
        match self {
            MatchType::Keywords => match_keywords(text, &rule.pattern, rule.case_sensitive),
            MatchType::Regex => match_regex(text, &rule.pattern, rule.case_sensitive),
            MatchType::JsonPath => match json {
                Some(json) => match_json_path(json, &rule.pattern),
                None => RuleMatch::none(),
            },
            MatchType::AiDetect => RuleMatch::none(),
        }
    }
}

/// Matches a comma-separated keyword list. Each found keyword contributes
/// one snippet: the hit plus up to [`KEYWORD_WINDOW`] bytes of surrounding
/// context (clamped to char boundaries), taken at the first occurrence.
/// Snippets are always literal substrings of `text`, so downstream masking
/// and redaction can locate them.
pub fn match_keywords(text: &str, keywords: &str, case_sensitive: bool) -> RuleMatch {
    // Case folding can change byte lengths for some scripts, so the folded
    // haystack carries a map from each of its bytes back to the byte offset
    // of the originating char in `text`.
    let (haystack, offsets) = if case_sensitive {
        (text.to_string(), None)
    } else {
        let mut folded = String::with_capacity(text.len());
        let mut map = Vec::with_capacity(text.len() + 1);
        for (idx, ch) in text.char_indices() {
            for low in ch.to_lowercase() {
                for _ in 0..low.len_utf8() {
                    map.push(idx);
                }
                folded.push(low);
            }
        }
        map.push(text.len());
        (folded, Some(map))
    };

    let mut snippets = Vec::new();
    for keyword in keywords.split(',') {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            continue;
        }
        let needle = if case_sensitive {
            keyword.to_string()
        } else {
            keyword.to_lowercase()
        };
        if let Some(idx) = haystack.find(&needle) {
            let (hit_start, hit_end) = match &offsets {
                Some(map) => (map[idx], map[idx + needle.len()]),
                None => (idx, idx + needle.len()),
            };
            let start = floor_char_boundary(text, hit_start.saturating_sub(KEYWORD_WINDOW));
            let end = ceil_char_boundary(text, (hit_end + KEYWORD_WINDOW).min(text.len()));
            snippets.push(text[start..end].to_string());
        }
    }

    RuleMatch::from_snippets(snippets)
}

/// Matches a user-supplied regex. Compilation failure is recovered
/// locally: the rule contributes no match and the rest of the batch is
/// unaffected.
pub fn match_regex(text: &str, pattern: &str, case_sensitive: bool) -> RuleMatch {
    let regex = match RegexBuilder::new(pattern)
        .case_insensitive(!case_sensitive)
        .build()
    {
        Ok(regex) => regex,
        Err(err) => {
            tracing::warn!(pattern, %err, "invalid regex in custom rule, treating as no match");
            return RuleMatch::none();
        }
    };

    let snippets: Vec<String> = regex
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect();
    RuleMatch::from_snippets(snippets)
}

/// Matches comma-separated dot paths against parsed JSON. A present,
/// non-null value is a match; snippets are synthetic `path=value` strings
/// describing structured fields, not substrings of the freeform text, so
/// downstream masking is not expected to locate them.
pub fn match_json_path(json: &Value, paths: &str) -> RuleMatch {
    let mut snippets = Vec::new();
    for path in paths.split(',') {
        let path = path.trim();
        if path.is_empty() {
            continue;
        }
        if let Some(value) = value_at_path(json, path) {
            if !value.is_null() {
                snippets.push(format!("{path}={value}"));
            }
        }
    }
    RuleMatch::from_snippets(snippets)
}

/// Walks a dot-separated path, tolerating an optional `$.` prefix.
fn value_at_path<'a>(json: &'a Value, path: &str) -> Option<&'a Value> {
    let clean = path.strip_prefix("$.").unwrap_or(path);
    let mut current = json;
    for part in clean.split('.') {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

fn floor_char_boundary(text: &str, mut idx: usize) -> usize {
    while idx > 0 && !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn ceil_char_boundary(text: &str, mut idx: usize) -> usize {
    while idx < text.len() && !text.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}
