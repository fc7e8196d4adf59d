//! Type coercion of raw (schema-agnostic) call arguments into the typed
//! `ArgValue`s a tool schema declares, plus the filter and dedup passes
//! that turn a repaired candidate list into valid, unique calls.

use std::collections::HashSet;

use resolver_types::{ArgValue, Call, ParamType, ToolSchema};
use serde_json::Value;

use crate::json_repair::RawCall;

/// Coerces one raw call's arguments against `tool`'s parameter types.
/// Arguments with no matching parameter are kept, converted with
/// best-effort fidelity, so the call can still be inspected later — only
/// `filter_valid` decides whether a call survives.
pub fn coerce_call(raw: &RawCall, tool: &ToolSchema) -> Call {
    let mut call = Call::new(raw.name.clone());
    for (key, value) in &raw.arguments {
        let coerced = match tool.param(key) {
            Some(param) => coerce_value(value, key, param.param_type),
            None => json_value_to_argvalue(value),
        };
        call.arguments.insert(key.clone(), coerced);
    }
    call
}

/// Coerces a single JSON value against a declared parameter type. Unwraps
/// the model's occasional `{"location": {"location": "Boston"}}` nesting
/// before casting. A cast failure leaves the value as its naive conversion
/// rather than dropping it.
fn coerce_value(value: &Value, key: &str, param_type: ParamType) -> ArgValue {
    let value = unwrap_nested(value, key);

    match param_type {
        ParamType::Integer => value_as_f64(value)
            .map(|f| ArgValue::I64((f as i64).abs()))
            .unwrap_or_else(|| json_value_to_argvalue(value)),
        ParamType::Number => value_as_f64(value)
            .map(ArgValue::F64)
            .unwrap_or_else(|| json_value_to_argvalue(value)),
        ParamType::Boolean => {
            let text = value_as_text(value).to_lowercase();
            ArgValue::Bool(matches!(text.as_str(), "true" | "1" | "yes"))
        }
        ParamType::String => ArgValue::Str(value_as_text(value)),
        ParamType::Object | ParamType::Array => json_value_to_argvalue(value),
    }
}

/// The model sometimes nests a parameter's value under the same key, e.g.
/// `"location": {"location": "Boston"}`. Unwrap one level when the object
/// has an entry keyed by the parameter's own name.
fn unwrap_nested<'a>(value: &'a Value, key: &str) -> &'a Value {
    if let Value::Object(map) = value {
        if let Some(inner) = map.get(key) {
            return inner;
        }
    }
    value
}

fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

fn value_as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn json_value_to_argvalue(value: &Value) -> ArgValue {
    match value {
        Value::Null => ArgValue::Null,
        Value::Bool(b) => ArgValue::Bool(*b),
        Value::String(s) => ArgValue::Str(s.clone()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                ArgValue::I64(i)
            } else {
                ArgValue::F64(n.as_f64().unwrap_or(0.0))
            }
        }
        other => ArgValue::Str(other.to_string()),
    }
}

/// Drops any call whose name isn't in `tools`, or that is missing a
/// required parameter under `ArgValue::is_valid` (non-null, non-empty
/// string; zero and `false` are valid).
pub fn filter_valid(calls: Vec<Call>, tools: &[ToolSchema]) -> Vec<Call> {
    calls
        .into_iter()
        .filter(|call| {
            let Some(tool) = tools.iter().find(|t| t.name == call.name) else {
                return false;
            };
            tool.required.iter().all(|req| {
                call.arguments
                    .get(req)
                    .map(ArgValue::is_valid)
                    .unwrap_or(false)
            })
        })
        .collect()
}

/// Keeps the first occurrence of each `(name, canonical-args)` key.
pub fn dedup(calls: Vec<Call>) -> Vec<Call> {
    let mut seen = HashSet::new();
    calls
        .into_iter()
        .filter(|call| seen.insert(call.dedup_key()))
        .collect()
}

/// Convenience pipeline: coerce each raw call against its matching tool
/// (dropping the lookup for calls naming an unknown tool, which `filter_valid`
/// would reject anyway), then filter and dedup.
pub fn coerce_filter_dedup(raw_calls: Vec<RawCall>, tools: &[ToolSchema]) -> Vec<Call> {
    let coerced: Vec<Call> = raw_calls
        .into_iter()
        .map(|raw| match tools.iter().find(|t| t.name == raw.name) {
            Some(tool) => coerce_call(&raw, tool),
            None => {
                let mut call = Call::new(raw.name);
                for (k, v) in raw.arguments {
                    call.arguments.insert(k, json_value_to_argvalue(&v));
                }
                call
            }
        })
        .collect();
    dedup(filter_valid(coerced, tools))
}
