//! Scores how well a candidate call's arguments are backed by the literal
//! utterance text. Arbitrates between the model's guess and the schema
//! extractor's guess for the same tool, and between schema-extracted
//! candidates across different tools.

use resolver_types::{ArgValue, Call, ToolSchema};

use crate::tokenize::tokenize;

/// Accumulates an integer score for `calls` against `utterance`. Positive
/// contributions reward arguments that are literally present in the text
/// or in `extra_nouns`; negative contributions penalise unsupported
/// guesses. Not a probability — only used to rank competing candidates.
pub fn overlap_score(calls: &[Call], utterance: &str, tools: &[ToolSchema], extra_nouns: &[String]) -> i64 {
    let text_lower = utterance.to_lowercase();
    let nouns_lower: Vec<String> = extra_nouns.iter().map(|n| n.to_lowercase()).collect();

    let mut score = 0i64;
    for call in calls {
        let tool_name_words: Vec<String> = call.name.split('_').map(|w| w.to_string()).collect();
        let _ = tools; // tool catalog kept for signature symmetry with the source; unused here.

        for value in call.arguments.values() {
            score += score_one_value(value, &text_lower, &nouns_lower, &tool_name_words);
        }
    }
    score
}

fn score_one_value(value: &ArgValue, text_lower: &str, nouns_lower: &[String], tool_name_words: &[String]) -> i64 {
    match value {
        ArgValue::I64(i) => {
            if *i == 0 {
                return 0;
            }
            if text_lower.contains(&i.to_string()) {
                2
            } else {
                -1
            }
        }
        ArgValue::Str(s) if s.len() > 1 => {
            let lower = s.to_lowercase();
            if text_lower.contains(&lower) {
                if tool_name_words.iter().any(|w| w == &lower) {
                    return 0;
                }
                return 3;
            }
            if nouns_lower.iter().any(|n| n == &lower) {
                return 3;
            }
            let words = tokenize(&lower);
            let hits = words
                .iter()
                .filter(|w| w.len() >= 2 && !tool_name_words.contains(w))
                .filter(|w| text_lower.contains(w.as_str()) || nouns_lower.iter().any(|n| n == *w))
                .count() as i64;
            if hits > 0 {
                hits
            } else {
                -1
            }
        }
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn call(name: &str, args: &[(&str, ArgValue)]) -> Call {
        let mut arguments = BTreeMap::new();
        for (k, v) in args {
            arguments.insert(k.to_string(), v.clone());
        }
        Call {
            name: name.to_string(),
            arguments,
        }
    }

    #[test]
    fn rewards_literal_integer_match() {
        let calls = vec![call("set_timer", &[("minutes", ArgValue::I64(5))])];
        assert_eq!(overlap_score(&calls, "set a 5 minute timer", &[], &[]), 2);
    }

    #[test]
    fn penalizes_unsupported_integer() {
        let calls = vec![call("set_timer", &[("minutes", ArgValue::I64(5))])];
        assert_eq!(overlap_score(&calls, "set a ten minute timer", &[], &[]), -1);
    }

    #[test]
    fn zero_integer_is_neutral() {
        let calls = vec![call("set_timer", &[("minutes", ArgValue::I64(0))])];
        assert_eq!(overlap_score(&calls, "set a timer", &[], &[]), 0);
    }

    #[test]
    fn suppresses_trivial_self_match_against_tool_name() {
        let calls = vec![call("play_music", &[("song", ArgValue::Str("music".into()))])];
        assert_eq!(overlap_score(&calls, "play some music", &[], &[]), 0);
    }

    #[test]
    fn rewards_literal_string_match() {
        let calls = vec![call(
            "get_weather",
            &[("location", ArgValue::Str("San Francisco".into()))],
        )];
        assert_eq!(
            overlap_score(&calls, "what is the weather in San Francisco", &[], &[]),
            3
        );
    }

    #[test]
    fn rewards_context_pool_match() {
        let calls = vec![call(
            "send_message",
            &[("recipient", ArgValue::Str("Tom".into()))],
        )];
        let extra_nouns = vec!["Tom".to_string()];
        assert_eq!(overlap_score(&calls, "send him a message", &[], &extra_nouns), 3);
    }
}
