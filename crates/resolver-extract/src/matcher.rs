//! Ranks tools against a query by bag-of-words overlap between the query
//! and a tool's schema-derived vocabulary (name, description, parameter
//! names and descriptions).

use std::collections::HashSet;
use std::sync::LazyLock;

use resolver_types::ToolSchema;

use crate::tokenize::{similar, tokenize};

pub static STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "a", "an", "the", "to", "for", "of", "in", "is", "and", "or", "my", "me", "i", "it", "be",
        "at", "on", "with", "from", "by", "do", "can", "you", "please", "some", "this", "that",
        "what", "how", "which", "these", "should", "about", "up", "him", "her",
    ]
    .into_iter()
    .collect()
});

static SYNONYMS: LazyLock<Vec<(&'static str, &'static str)>> = LazyLock::new(|| {
    vec![
        ("text", "message"),
        ("mail", "message"),
        ("wake", "alarm"),
        ("tune", "music"),
        ("track", "music"),
        ("song", "music"),
    ]
});

fn snake_case_parts(s: &str) -> Vec<String> {
    s.split('_').map(|w| w.to_lowercase()).collect()
}

/// Builds a tool's schema-derived vocabulary: name segments, description
/// tokens, parameter name segments, and parameter description tokens, minus
/// stop words.
pub fn tool_words(tool: &ToolSchema) -> HashSet<String> {
    let mut words = HashSet::new();
    words.extend(snake_case_parts(&tool.name));
    words.extend(tokenize(&tool.description));
    for param in &tool.parameters {
        words.extend(snake_case_parts(&param.name));
        words.extend(tokenize(&param.description));
    }
    words.retain(|w| !STOP_WORDS.contains(w.as_str()));
    words
}

/// Expands `query_words` with the fixed synonym map (`text`→`message`,
/// `mail`→`message`, `wake`→`alarm`, `tune`/`track`/`song`→`music`) so a
/// synonym in the query can still match a tool's literal vocabulary.
pub fn expand_with_synonyms(query_words: &HashSet<String>) -> HashSet<String> {
    let mut expanded = query_words.clone();
    for word in query_words {
        for (from, to) in SYNONYMS.iter() {
            if word == from {
                expanded.insert((*to).to_string());
            }
        }
    }
    expanded
}

/// Fraction of `query_words` (after synonym expansion) that have at least
/// one fuzzy (`similar`) partner in the tool's vocabulary.
pub fn tool_relevance(tool: &ToolSchema, query_words: &HashSet<String>) -> f64 {
    let words = tool_words(tool);
    let expanded = expand_with_synonyms(query_words);
    let matches = expanded
        .iter()
        .filter(|qw| words.iter().any(|tw| similar(qw, tw)))
        .count();
    matches as f64 / (words.len().max(1) as f64)
}

/// Highest-scoring tool for `user_text`, or `None` if no tool scores above
/// the `0.05` relevance floor.
pub fn find_best_tool<'a>(user_text: &str, tools: &'a [ToolSchema]) -> Option<&'a ToolSchema> {
    let query_words: HashSet<String> = tokenize(user_text).into_iter().collect();
    let mut best: Option<(&ToolSchema, f64)> = None;
    for tool in tools {
        let score = tool_relevance(tool, &query_words);
        if best.as_ref().map(|(_, b)| score > *b).unwrap_or(true) {
            best = Some((tool, score));
        }
    }
    best.filter(|(_, score)| *score > 0.05).map(|(tool, _)| tool)
}

/// Counts, per tool, how many of its name segments appear as a substring of
/// `response_text` (case-insensitive); returns the tool with the highest
/// count, ties broken by catalog order, or `None` if every count is zero.
pub fn identify_tool_from_text<'a>(
    response_text: &str,
    tools: &'a [ToolSchema],
) -> Option<&'a ToolSchema> {
    let text_lower = response_text.to_lowercase();
    let mut best: Option<(&ToolSchema, usize)> = None;
    for tool in tools {
        let count = tool
            .name
            .split('_')
            .filter(|part| text_lower.contains(&part.to_lowercase()))
            .count();
        if best.as_ref().map(|(_, b)| count > *b).unwrap_or(true) {
            best = Some((tool, count));
        }
    }
    best.filter(|(_, count)| *count > 0).map(|(tool, _)| tool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use resolver_types::{ParamType, ParameterSchema};

    fn get_weather() -> ToolSchema {
        ToolSchema {
            name: "get_weather".into(),
            description: "check the current weather for a location".into(),
            parameters: vec![ParameterSchema {
                name: "location".into(),
                param_type: ParamType::String,
                description: "city name".into(),
            }],
            required: vec!["location".into()],
        }
    }

    fn set_alarm() -> ToolSchema {
        ToolSchema {
            name: "set_alarm".into(),
            description: "wake the user up at a given time".into(),
            parameters: vec![
                ParameterSchema {
                    name: "hour".into(),
                    param_type: ParamType::Integer,
                    description: String::new(),
                },
                ParameterSchema {
                    name: "minute".into(),
                    param_type: ParamType::Integer,
                    description: String::new(),
                },
            ],
            required: vec!["hour".into(), "minute".into()],
        }
    }

    #[test]
    fn find_best_tool_picks_highest_scorer_above_floor() {
        let tools = vec![get_weather(), set_alarm()];
        let best = find_best_tool("what's the weather in San Francisco", &tools).unwrap();
        assert_eq!(best.name, "get_weather");
    }

    #[test]
    fn find_best_tool_applies_wake_synonym() {
        let tools = vec![get_weather(), set_alarm()];
        let best = find_best_tool("please wake me at 7", &tools).unwrap();
        assert_eq!(best.name, "set_alarm");
    }

    #[test]
    fn find_best_tool_returns_none_below_floor() {
        let tools = vec![get_weather()];
        assert!(find_best_tool("do a barrel roll", &tools).is_none());
    }

    #[test]
    fn identify_tool_from_text_counts_name_segment_hits() {
        let tools = vec![get_weather(), set_alarm()];
        let best = identify_tool_from_text("I'll set that alarm now", &tools).unwrap();
        assert_eq!(best.name, "set_alarm");
    }
}
