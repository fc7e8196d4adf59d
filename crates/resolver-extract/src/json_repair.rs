//! Salvages tool-call JSON out of a small on-device model's raw output.
//!
//! The model is expected to emit `{"function_calls": [...], "total_time_ms":
//! ..., "confidence": ..., "response": ...}`, but small models routinely
//! emit near-misses: leftover template tags, full-width punctuation from a
//! CJK-biased tokenizer, trailing commas, or dangling `"key": }` slots where
//! a value got truncated. This mirrors the repair ladder in
//! `native_tools.rs`'s `try_parse_with_fixups` — try the raw text, then a
//! widening sequence of textual fixups, then give up on structure entirely
//! and regex-scrape whatever `"name"`/`"arguments"` pairs are still legible.
//!
//! Argument values stay as raw `serde_json::Value` here — type coercion
//! against a tool's declared parameter types happens one stage later, in
//! `coerce`, once a schema is available to coerce against.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

/// A tool call as recovered from model output, before schema coercion.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCall {
    pub name: String,
    pub arguments: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RepairedOutput {
    pub calls: Vec<RawCall>,
    pub confidence: f64,
    pub total_time_ms: u64,
    pub response: String,
}

static FULL_WIDTH_COLON: &str = "\u{FF1A}";

static TEMPLATE_TAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<escape>|<start_function[^>]*>|<end_function[^>]*>").unwrap());

static EMPTY_VALUE_SLOT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r":\s*([}\]])").unwrap());

static TRAILING_COMMA: LazyLock<Regex> = LazyLock::new(|| Regex::new(r",\s*([}\]])").unwrap());

static NAME_ARGUMENTS_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""name"\s*:\s*"(\w+)"\s*,\s*"arguments"\s*:\s*\{([^}]*)\}"#).unwrap()
});

static ARGUMENT_ENTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""(\w+)"\s*:\s*(?:"([^"]*)"|([-\d.]+))"#).unwrap());

/// Attempts to recover a `RepairedOutput` from `raw`. Returns `None` only
/// when neither a direct parse, a fixed-up parse, nor structured salvage
/// recovers anything — the caller treats that as an empty attempt, not an
/// error (malformed model output is never surfaced as an error).
pub fn repair(raw: &str) -> Option<RepairedOutput> {
    if let Ok(value) = serde_json::from_str::<Value>(raw) {
        return Some(from_value(&value));
    }

    let fixed = apply_fixups(raw);
    if let Ok(value) = serde_json::from_str::<Value>(&fixed) {
        return Some(from_value(&value));
    }

    structured_salvage(raw)
}

fn apply_fixups(raw: &str) -> String {
    let s = raw.replace(FULL_WIDTH_COLON, ":");
    let s = TEMPLATE_TAGS.replace_all(&s, "").into_owned();
    let s = EMPTY_VALUE_SLOT.replace_all(&s, ":\"\"$1").into_owned();
    TRAILING_COMMA.replace_all(&s, "$1").into_owned()
}

fn from_value(value: &Value) -> RepairedOutput {
    let calls = value
        .get("function_calls")
        .and_then(Value::as_array)
        .map(|arr| arr.iter().filter_map(call_from_value).collect())
        .unwrap_or_default();

    RepairedOutput {
        calls,
        confidence: value.get("confidence").and_then(Value::as_f64).unwrap_or(0.0),
        total_time_ms: value
            .get("total_time_ms")
            .and_then(Value::as_u64)
            .unwrap_or(0),
        response: value
            .get("response")
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string(),
    }
}

fn call_from_value(value: &Value) -> Option<RawCall> {
    let name = value.get("name")?.as_str()?.to_string();
    let arguments = value
        .get("arguments")
        .and_then(Value::as_object)
        .map(|obj| obj.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        .unwrap_or_default();
    Some(RawCall { name, arguments })
}

fn structured_salvage(raw: &str) -> Option<RepairedOutput> {
    let mut calls = Vec::new();
    for caps in NAME_ARGUMENTS_PAIR.captures_iter(raw) {
        let name = caps[1].to_string();
        let args_str = &caps[2];
        let mut arguments = BTreeMap::new();
        for arg_caps in ARGUMENT_ENTRY.captures_iter(args_str) {
            let key = arg_caps[1].to_string();
            let value = if let Some(s) = arg_caps.get(2) {
                Value::String(s.as_str().to_string())
            } else {
                parse_numeric(&arg_caps[3])
            };
            arguments.insert(key, value);
        }
        calls.push(RawCall { name, arguments });
    }

    if calls.is_empty() {
        return None;
    }

    Some(RepairedOutput {
        calls,
        confidence: 0.5,
        total_time_ms: 0,
        response: String::new(),
    })
}

fn parse_numeric(raw: &str) -> Value {
    if !raw.contains('.') {
        if let Ok(i) = raw.parse::<i64>() {
            return Value::from(i);
        }
    }
    match raw.parse::<f64>() {
        Ok(f) => serde_json::Number::from_f64(f).map(Value::Number).unwrap_or_else(|| Value::String(raw.to_string())),
        Err(_) => Value::String(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_response_directly() {
        let raw = r#"{"function_calls":[{"name":"get_weather","arguments":{"location":"Boston"}}],"total_time_ms":42,"confidence":0.9,"response":""}"#;
        let out = repair(raw).unwrap();
        assert_eq!(out.calls.len(), 1);
        assert_eq!(out.calls[0].name, "get_weather");
        assert_eq!(out.total_time_ms, 42);
        assert_eq!(out.confidence, 0.9);
    }

    #[test]
    fn fixes_full_width_colon_and_template_tags() {
        let raw = "{\"function_calls\"\u{FF1A}[{<start_function_call>\"name\":\"set_timer\",\"arguments\":{\"minutes\":5}}],\"total_time_ms\":0}<end_function_call>";
        let out = repair(raw).unwrap();
        assert_eq!(out.calls[0].name, "set_timer");
    }

    #[test]
    fn fixes_trailing_comma_and_empty_value_slot() {
        let raw = r#"{"function_calls":[{"name":"set_alarm","arguments":{"hour":7,"minute":}}],}"#;
        let out = repair(raw).unwrap();
        assert_eq!(out.calls[0].name, "set_alarm");
        assert_eq!(
            out.calls[0].arguments.get("minute"),
            Some(&Value::String(String::new()))
        );
    }

    #[test]
    fn structured_salvage_recovers_name_and_arguments_pairs() {
        let raw = "garbage before \"name\":\"play_music\", \"arguments\":{\"song\": \"jazz\", \"volume\": 5} trailing garbage";
        let out = repair(raw).unwrap();
        assert_eq!(out.confidence, 0.5);
        assert_eq!(out.total_time_ms, 0);
        assert_eq!(out.calls[0].name, "play_music");
        assert_eq!(
            out.calls[0].arguments.get("song"),
            Some(&Value::String("jazz".into()))
        );
        assert_eq!(out.calls[0].arguments.get("volume"), Some(&Value::from(5)));
    }

    #[test]
    fn returns_none_when_nothing_is_recoverable() {
        assert!(repair("the model rambled without any json at all").is_none());
    }
}
