//! Schema-driven argument extraction: fills a tool's parameters straight
//! from utterance text when the model can't be trusted to. Four phases run
//! in order — integers, proper nouns, description-keyword categories for
//! string parameters, and whatever text is left over — each parameter is
//! assigned at most once, by the first phase that claims it.

use std::collections::HashSet;

use resolver_types::{ArgValue, Call, ParamType, ParameterSchema, ToolSchema};

use crate::nouns::{build_strip_set, extract_proper_nouns, should_strip, StripSet};
use crate::tokenize::STRIP_CHARS;

const NUMERIC_STRIP: &[char] = &['.', ',', '!', '?', ';'];

const BLACKLIST_PARAMS: &[&str] = &[
    "channel",
    "id",
    "url",
    "uri",
    "email",
    "phone",
    "uuid",
    "database_id",
    "block_id",
    "page_id",
];

fn is_all_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

fn is_colon_digit_pair(s: &str) -> bool {
    s.contains(':') && {
        let parts: Vec<&str> = s.split(':').collect();
        parts.len() >= 2 && parts.iter().all(|p| is_all_digits(p))
    }
}

/// Attempts to build one fully-typed `Call` for `tool` from `utterance`
/// alone. `extra_nouns` is the cross-clause context pool the hybrid router
/// propagates when it splits a conjoined utterance. Returns `None` if any
/// required parameter ends up missing or invalid.
pub fn extract_from_schema(utterance: &str, tool: &ToolSchema, extra_nouns: &[String]) -> Option<Call> {
    let mut call = Call::new(tool.name.clone());

    assign_integers(utterance, tool, &mut call);

    let strip = build_strip_set(tool);
    let local_nouns = extract_proper_nouns(utterance, Some(&strip));
    let all_nouns = combine_nouns(&local_nouns, extra_nouns);

    let mut pn_used: HashSet<String> = HashSet::new();
    let mut content_marker_pos = utterance.len();
    let mut filled: HashSet<String> = HashSet::new();

    let string_params: Vec<&ParameterSchema> = tool
        .parameters
        .iter()
        .filter(|p| p.param_type == ParamType::String)
        .collect();

    for param in &string_params {
        let desc = format!("{} {}", param.description, param.name).to_lowercase();

        if contains_any(&desc, &["time", "when", "schedule"]) {
            call.arguments
                .insert(param.name.clone(), ArgValue::Str(extract_time(utterance)));
            filled.insert(param.name.clone());
            continue;
        }
        if contains_any(&desc, &["location", "city", "place"]) {
            call.arguments
                .insert(param.name.clone(), ArgValue::Str(extract_location(utterance)));
            filled.insert(param.name.clone());
            continue;
        }
        if contains_any(&desc, &["name", "person", "contact", "recipient"]) {
            let is_person = contains_any(&desc, &["person", "contact", "recipient"]);
            let pool: &[String] = if is_person { &all_nouns } else { &local_nouns };
            let chosen = pool.iter().find(|n| !pn_used.contains(&n.to_lowercase())).cloned();
            if let Some(noun) = &chosen {
                pn_used.insert(noun.to_lowercase());
            }
            call.arguments
                .insert(param.name.clone(), ArgValue::Str(chosen.unwrap_or_default()));
            filled.insert(param.name.clone());
            continue;
        }
        if contains_any(&desc, &["content", "message", "text", "query"]) {
            let (value, marker_pos) = extract_content(utterance);
            if let Some(pos) = marker_pos {
                content_marker_pos = content_marker_pos.min(pos);
            }
            call.arguments.insert(param.name.clone(), ArgValue::Str(value));
            filled.insert(param.name.clone());
            continue;
        }
        if contains_any(&desc, &["title", "subject", "topic"]) {
            call.arguments
                .insert(param.name.clone(), ArgValue::Str(extract_title(utterance)));
            filled.insert(param.name.clone());
            continue;
        }
        if contains_any(&desc, &["channel", "mention", "recipient"]) {
            call.arguments
                .insert(param.name.clone(), ArgValue::Str(extract_handle(utterance)));
            filled.insert(param.name.clone());
        }
    }

    let remaining = compute_remaining_text(utterance, content_marker_pos, &strip, &pn_used);
    if let Some(param) = string_params
        .iter()
        .find(|p| !filled.contains(&p.name) && !BLACKLIST_PARAMS.contains(&p.name.as_str()))
    {
        call.arguments.insert(param.name.clone(), ArgValue::Str(remaining));
    }

    let valid = tool.required.iter().all(|req| {
        call.arguments
            .get(req)
            .map(ArgValue::is_valid)
            .unwrap_or(false)
    });
    valid.then_some(call)
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

fn combine_nouns(local: &[String], extra: &[String]) -> Vec<String> {
    let mut all = local.to_vec();
    let mut seen: HashSet<String> = local.iter().map(|n| n.to_lowercase()).collect();
    for n in extra {
        if seen.insert(n.to_lowercase()) {
            all.push(n.clone());
        }
    }
    all
}

// TODO: positional zip below can misassign when a tool declares more than
// one integer parameter and the utterance has more than one unrelated
// number (e.g. "at 5 PM for 3 minutes").
fn assign_integers(utterance: &str, tool: &ToolSchema, call: &mut Call) {
    let mut numbers: Vec<i64> = Vec::new();
    for raw in utterance.split_whitespace() {
        let cleaned = raw.trim_matches(NUMERIC_STRIP);
        if is_all_digits(cleaned) {
            if let Ok(n) = cleaned.parse::<i64>() {
                numbers.push(n);
            }
        }
    }
    for raw in utterance.split_whitespace() {
        let cleaned = raw.trim_matches(NUMERIC_STRIP);
        if cleaned.contains(':') {
            let parts: Vec<&str> = cleaned.split(':').collect();
            if parts.len() == 2 && is_all_digits(parts[0]) && is_all_digits(parts[1]) {
                if let (Ok(a), Ok(b)) = (parts[0].parse::<i64>(), parts[1].parse::<i64>()) {
                    numbers.push(a);
                    numbers.push(b);
                }
            }
        }
    }

    let int_params: Vec<&ParameterSchema> = tool
        .parameters
        .iter()
        .filter(|p| p.param_type == ParamType::Integer)
        .collect();
    for (i, param) in int_params.iter().enumerate() {
        let value = numbers.get(i).copied().unwrap_or(0).abs();
        call.arguments.insert(param.name.clone(), ArgValue::I64(value));
    }
}

fn extract_time(utterance: &str) -> String {
    let lower = utterance.to_lowercase();
    let Some(idx) = lower.find(" at ") else {
        return String::new();
    };
    let after = &utterance[idx + 4..];

    let mut time_parts: Vec<&str> = Vec::new();
    for tok in after.split_whitespace() {
        let cleaned = tok.trim_matches(STRIP_CHARS);
        if cleaned.is_empty() {
            continue;
        }
        let starts_digit = cleaned.chars().next().map(|c| c.is_ascii_digit()).unwrap_or(false);
        let is_ampm = cleaned.eq_ignore_ascii_case("AM") || cleaned.eq_ignore_ascii_case("PM");
        if starts_digit || is_ampm {
            time_parts.push(cleaned);
        } else if !time_parts.is_empty() {
            break;
        }
    }
    time_parts.join(" ")
}

fn extract_location(utterance: &str) -> String {
    let lower = utterance.to_lowercase();
    let marker = [" in ", " at "].into_iter().find(|m| lower.contains(m));
    let Some(marker) = marker else {
        return String::new();
    };
    let Some(idx) = lower.find(marker) else {
        return String::new();
    };
    let after = &utterance[idx + marker.len()..];
    truncate_at_first(after, &[" and ", ", ", " saying "])
        .trim_matches(STRIP_CHARS)
        .trim()
        .to_string()
}

fn extract_content(utterance: &str) -> (String, Option<usize>) {
    let lower = utterance.to_lowercase();
    let marker_hit = [" saying ", " that says "]
        .into_iter()
        .filter_map(|m| lower.find(m).map(|pos| (pos, m)))
        .min_by_key(|(pos, _)| *pos);
    let Some((pos, marker)) = marker_hit else {
        return (String::new(), None);
    };
    let after = &utterance[pos + marker.len()..];
    let value = truncate_at_first(after, &[" and ", ", and "]).trim().to_string();
    (value, Some(pos))
}

fn extract_title(utterance: &str) -> String {
    let lower = utterance.to_lowercase();
    let marker = [" about ", " to ", " called "]
        .into_iter()
        .find(|m| lower.contains(m));
    let Some(marker) = marker else {
        return String::new();
    };
    let Some(idx) = lower.find(marker) else {
        return String::new();
    };
    let after = &utterance[idx + marker.len()..];
    let truncated = truncate_at_first(after, &[" at ", " and ", ", "]).trim();
    strip_leading_article(truncated)
}

fn extract_handle(utterance: &str) -> String {
    utterance
        .split_whitespace()
        .map(|tok| tok.trim_matches(STRIP_CHARS))
        .find(|tok| tok.starts_with('#') || tok.starts_with('@'))
        .unwrap_or("")
        .to_string()
}

fn truncate_at_first<'a>(text: &'a str, markers: &[&str]) -> &'a str {
    let cut = markers.iter().filter_map(|m| text.find(m)).min();
    match cut {
        Some(pos) => &text[..pos],
        None => text,
    }
}

fn strip_leading_article(text: &str) -> String {
    let lower = text.to_lowercase();
    for article in ["the ", "an ", "a "] {
        if lower.starts_with(article) {
            return text[article.len()..].to_string();
        }
    }
    text.to_string()
}

fn compute_remaining_text(
    utterance: &str,
    content_marker_pos: usize,
    strip: &StripSet,
    pn_used: &HashSet<String>,
) -> String {
    let end = content_marker_pos.min(utterance.len());
    let prefix = &utterance[..end];

    let mut kept: Vec<&str> = Vec::new();
    let mut last_kept = false;
    for raw_tok in prefix.split_whitespace() {
        let cleaned = raw_tok.trim_matches(STRIP_CHARS);
        if cleaned.is_empty() {
            last_kept = false;
            continue;
        }
        if is_colon_digit_pair(cleaned) {
            last_kept = false;
            continue;
        }
        let lower = cleaned.to_lowercase();
        if is_all_digits(cleaned) || pn_used.contains(&lower) || cleaned == "AM" || cleaned == "PM" {
            last_kept = false;
            continue;
        }

        let stripped = should_strip(&lower, strip);
        let keep = !stripped || last_kept;
        if keep {
            kept.push(raw_tok);
            last_kept = true;
        } else {
            last_kept = false;
        }
    }
    kept.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use resolver_types::ParamType;

    fn get_weather() -> ToolSchema {
        ToolSchema {
            name: "get_weather".into(),
            description: "get the current weather".into(),
            parameters: vec![ParameterSchema {
                name: "location".into(),
                param_type: ParamType::String,
                description: "the city to check".into(),
            }],
            required: vec!["location".into()],
        }
    }

    fn set_alarm() -> ToolSchema {
        ToolSchema {
            name: "set_alarm".into(),
            description: "wake the user at a time".into(),
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

    fn create_reminder() -> ToolSchema {
        ToolSchema {
            name: "create_reminder".into(),
            description: "remind the user to do something".into(),
            parameters: vec![
                ParameterSchema {
                    name: "title".into(),
                    param_type: ParamType::String,
                    description: "what to remind about".into(),
                },
                ParameterSchema {
                    name: "time".into(),
                    param_type: ParamType::String,
                    description: "when to remind".into(),
                },
            ],
            required: vec!["title".into()],
        }
    }

    fn send_message() -> ToolSchema {
        ToolSchema {
            name: "send_message".into(),
            description: "send a message to a recipient".into(),
            parameters: vec![
                ParameterSchema {
                    name: "recipient".into(),
                    param_type: ParamType::String,
                    description: "who receives it".into(),
                },
                ParameterSchema {
                    name: "message".into(),
                    param_type: ParamType::String,
                    description: "content of the message".into(),
                },
            ],
            required: vec!["recipient".into(), "message".into()],
        }
    }

    #[test]
    fn s1_location_fills_remaining_text_param() {
        let call = extract_from_schema(
            "What is the weather in San Francisco?",
            &get_weather(),
            &[],
        )
        .unwrap();
        assert_eq!(
            call.arguments.get("location"),
            Some(&ArgValue::Str("San Francisco".into()))
        );
    }

    #[test]
    fn location_extraction_stops_before_saying_without_eating_the_preceding_word() {
        let call = extract_from_schema(
            "What's the weather in Boston saying hello",
            &get_weather(),
            &[],
        )
        .unwrap();
        assert_eq!(
            call.arguments.get("location"),
            Some(&ArgValue::Str("Boston".into()))
        );
    }

    #[test]
    fn s2_colon_pair_fills_hour_and_minute() {
        let call = extract_from_schema("Set an alarm for 7:30 AM", &set_alarm(), &[]).unwrap();
        assert_eq!(call.arguments.get("hour"), Some(&ArgValue::I64(7)));
        assert_eq!(call.arguments.get("minute"), Some(&ArgValue::I64(30)));
    }

    #[test]
    fn extracts_time_category_after_at_marker() {
        let call = extract_from_schema(
            "Remind Tom to buy milk at 5 PM",
            &create_reminder(),
            &[],
        )
        .unwrap();
        assert_eq!(call.arguments.get("time"), Some(&ArgValue::Str("5 PM".into())));
        assert_eq!(
            call.arguments.get("title"),
            Some(&ArgValue::Str("buy milk".into()))
        );
    }

    #[test]
    fn name_category_draws_from_context_pool_for_pronoun_resolution() {
        let extra_nouns = vec!["Tom".to_string()];
        let call = extract_from_schema("send him a message saying hello", &send_message(), &extra_nouns)
            .unwrap();
        assert_eq!(
            call.arguments.get("recipient"),
            Some(&ArgValue::Str("Tom".into()))
        );
        assert_eq!(
            call.arguments.get("message"),
            Some(&ArgValue::Str("hello".into()))
        );
    }

    #[test]
    fn missing_required_param_yields_none() {
        let tool = send_message();
        assert!(extract_from_schema("hello there", &tool, &[]).is_none());
    }
}
