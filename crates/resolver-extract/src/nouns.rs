//! Capitalised-word extraction with optional schema-aware filtering —
//! drives the "name/entity" extraction category and the cross-clause
//! context pool used by conjunction splitting.

use std::collections::HashSet;

use resolver_types::ToolSchema;

use crate::matcher::STOP_WORDS;
use crate::tokenize::{similar, tokenize, STRIP_CHARS};

/// Per-tool derived filter: `base` is stop words union schema words;
/// `schema_words` is the schema-only subset used for prefix fuzzy matching
/// in `should_strip`.
#[derive(Debug, Clone)]
pub struct StripSet {
    pub base: HashSet<String>,
    pub schema_words: HashSet<String>,
}

/// Builds a tool's strip set: stop words plus name segments, description
/// tokens, and parameter description tokens (parameter *names* are not
/// included — only their prose).
pub fn build_strip_set(tool: &ToolSchema) -> StripSet {
    let mut schema_words: HashSet<String> = tool.name.split('_').map(|w| w.to_lowercase()).collect();
    schema_words.extend(tokenize(&tool.description));
    for param in &tool.parameters {
        schema_words.extend(tokenize(&param.description));
    }

    let mut base = STOP_WORDS.iter().map(|w| w.to_string()).collect::<HashSet<_>>();
    base.extend(schema_words.iter().cloned());

    StripSet { base, schema_words }
}

/// A lowercase word should be excluded from "remaining text" if it's in the
/// strip set outright, or if it's at least three characters and fuzzily
/// `similar` to some schema word.
pub fn should_strip(word_lower: &str, strip: &StripSet) -> bool {
    if strip.base.contains(word_lower) {
        return true;
    }
    word_lower.len() >= 3 && strip.schema_words.iter().any(|sw| similar(word_lower, sw))
}

fn is_all_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// Extracts proper nouns from the original-cased `text`. The first
/// whitespace-separated word is always skipped (sentence-initial
/// capitalisation isn't a noun signal). A word is accepted if, after
/// stripping surrounding punctuation, its first character is uppercase, it
/// isn't purely digits, and it isn't `AM`/`PM`. When `strip` is given,
/// words whose lowercase form `should_strip` accepts are excluded too.
/// Encounter order is preserved.
pub fn extract_proper_nouns(text: &str, strip: Option<&StripSet>) -> Vec<String> {
    text.split_whitespace()
        .enumerate()
        .skip(1)
        .filter_map(|(_, word)| {
            let cleaned = word.trim_matches(STRIP_CHARS);
            if cleaned.is_empty() {
                return None;
            }
            let first = cleaned.chars().next().unwrap();
            if !first.is_uppercase() {
                return None;
            }
            if is_all_digits(cleaned) {
                return None;
            }
            if cleaned == "AM" || cleaned == "PM" {
                return None;
            }
            if let Some(strip) = strip {
                if should_strip(&cleaned.to_lowercase(), strip) {
                    return None;
                }
            }
            Some(cleaned.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use resolver_types::{ParamType, ParameterSchema};

    #[test]
    fn skips_sentence_initial_word() {
        let nouns = extract_proper_nouns("What is the weather in San Francisco?", None);
        assert_eq!(nouns, vec!["San", "Francisco"]);
    }

    #[test]
    fn excludes_am_pm_and_pure_digits() {
        let nouns = extract_proper_nouns("Wake me at 7 AM near 5", None);
        assert!(nouns.is_empty());
    }

    #[test]
    fn strip_set_excludes_schema_vocabulary() {
        let tool = ToolSchema {
            name: "send_message".into(),
            description: "send a message to a recipient".into(),
            parameters: vec![ParameterSchema {
                name: "recipient".into(),
                param_type: ParamType::String,
                description: String::new(),
            }],
            required: vec!["recipient".into()],
        };
        let strip = build_strip_set(&tool);
        let nouns = extract_proper_nouns("Please Message Tom about the plan", Some(&strip));
        assert_eq!(nouns, vec!["Tom"]);
    }
}
