//! The on-device resolution strategy: three escalating attempts against the
//! local model handle before giving up and leaving the cloud handoff
//! decision to the caller (`hybrid_router`).
//!
//! Attempt 1 offers the model the whole catalog with a system prompt asking
//! it to call every relevant tool. If that comes back empty (or the schema
//! matcher disagrees strongly enough with the model's choice), attempt 2
//! narrows the catalog to a single best-guess tool and retries at
//! temperature zero. Attempt 3 drops the model entirely and extracts
//! arguments straight out of the utterance against the tool schema.

use std::collections::HashSet;

use resolver_extract::{
    coerce_filter_dedup, extract_from_schema, find_best_tool, identify_tool_from_text,
    overlap_score, post_process_args, repair, tokenize, tool_relevance,
};
use resolver_types::{Call, ChatTurn, Role, ToolSchema};

use crate::model::{ModelHandle, ModelOptions, ModelRequest};

const SYSTEM_PROMPT: &str = "You are a helpful assistant that can use tools. When the user asks for multiple things, call all the relevant tools. Extract arguments from the user's request exactly as written.";

#[derive(Debug, Clone)]
pub struct LocalResolution {
    pub calls: Vec<Call>,
    pub confidence: f64,
    pub total_time_ms: u64,
}

impl LocalResolution {
    fn empty(total_time_ms: u64) -> Self {
        Self {
            calls: Vec::new(),
            confidence: 0.0,
            total_time_ms,
        }
    }
}

/// Runs the three-attempt strategy against `model` for `user_text`. `turns`
/// supplies the chat history; only attempt 1 prefixes it with the system
/// prompt, attempt 2's single-tool retry sends `turns` as-is. `extra_nouns`
/// is the cross-clause context pool the hybrid router supplies when it has
/// split the utterance into sub-intents; pass an empty slice for a
/// whole-utterance call.
pub async fn resolve_locally(
    model: &mut dyn ModelHandle,
    turns: &[ChatTurn],
    user_text: &str,
    tools: &[ToolSchema],
    extra_nouns: &[String],
) -> LocalResolution {
    let mut total_time_ms = 0u64;
    let mut messages = Vec::with_capacity(turns.len() + 1);
    messages.push(ChatTurn {
        role: Role::System,
        content: SYSTEM_PROMPT.to_string(),
    });
    messages.extend_from_slice(turns);

    // Attempt 1: full catalog.
    model.reset().await;
    let raw1 = model
        .complete(ModelRequest {
            messages: &messages,
            tools,
            options: ModelOptions::default(),
        })
        .await;
    let repaired1 = repair(&raw1);
    let model_text = repaired1
        .as_ref()
        .map(|r| r.response.clone())
        .unwrap_or_default();
    total_time_ms += repaired1.as_ref().map_or(0, |r| r.total_time_ms);
    let confidence1 = repaired1.as_ref().map_or(0.0, |r| r.confidence);
    let mut calls1 = repaired1
        .map(|r| coerce_filter_dedup(r.calls, tools))
        .unwrap_or_default();

    if !calls1.is_empty() && tools.len() > 1 {
        apply_schema_override(&mut calls1, user_text, tools);
    }

    if !calls1.is_empty() {
        calls1 = maybe_prefer_schema(calls1, user_text, tools, extra_nouns);
        return LocalResolution {
            calls: post_process_args(calls1),
            confidence: confidence1,
            total_time_ms,
        };
    }

    // Target selection for attempts 2 and 3.
    let schema_best = find_best_tool(user_text, tools);
    let mut target_reliable = schema_best.is_some();
    let mut target = schema_best;
    if target.is_none() {
        target = identify_tool_from_text(&model_text, tools);
    }
    if target.is_none() && tools.len() == 1 {
        target = tools.first();
        target_reliable = true;
    }

    let Some(target_tool) = target else {
        return LocalResolution::empty(total_time_ms);
    };

    // Attempt 2: single-tool retry at temperature zero.
    model.reset().await;
    let single_tool = std::slice::from_ref(target_tool);
    let raw2 = model
        .complete(ModelRequest {
            messages: turns,
            tools: single_tool,
            options: ModelOptions {
                temperature: Some(0.0),
                ..ModelOptions::default()
            },
        })
        .await;
    let repaired2 = repair(&raw2);
    total_time_ms += repaired2.as_ref().map_or(0, |r| r.total_time_ms);
    let confidence2 = repaired2.as_ref().map_or(0.5, |r| r.confidence);
    let mut calls2 = repaired2
        .map(|r| coerce_filter_dedup(r.calls, single_tool))
        .unwrap_or_default();

    if !calls2.is_empty() {
        calls2 = maybe_prefer_schema(calls2, user_text, single_tool, extra_nouns);
        return LocalResolution {
            calls: post_process_args(calls2),
            confidence: confidence2,
            total_time_ms,
        };
    }

    // Attempt 3: pure schema extraction.
    let target_call = extract_from_schema(user_text, target_tool, extra_nouns);
    if let Some(tc) = &target_call {
        if target_reliable {
            return LocalResolution {
                calls: post_process_args(vec![tc.clone()]),
                confidence: 0.5,
                total_time_ms,
            };
        }
    }

    let mut best_all: Option<Call> = None;
    let mut best_all_score = 0i64;
    for tool in tools {
        if let Some(call) = extract_from_schema(user_text, tool, extra_nouns) {
            let score = overlap_score(std::slice::from_ref(&call), user_text, tools, extra_nouns);
            if score > best_all_score {
                best_all = Some(call);
                best_all_score = score;
            }
        }
    }

    match (target_call, best_all) {
        (Some(tc), Some(ba)) => {
            let target_score =
                overlap_score(std::slice::from_ref(&tc), user_text, tools, extra_nouns);
            let winner = if best_all_score > target_score { ba } else { tc };
            LocalResolution {
                calls: post_process_args(vec![winner]),
                confidence: 0.5,
                total_time_ms,
            }
        }
        (None, Some(ba)) if best_all_score > 0 => LocalResolution {
            calls: post_process_args(vec![ba]),
            confidence: 0.5,
            total_time_ms,
        },
        (Some(tc), _) => LocalResolution {
            calls: post_process_args(vec![tc]),
            confidence: 0.5,
            total_time_ms,
        },
        _ => LocalResolution::empty(total_time_ms),
    }
}

/// Discards attempt 1's calls when the schema matcher disagrees strongly
/// enough with the model's chosen tool: the model's own relevance score is
/// near zero while the schema's preferred tool scores comfortably above the
/// matcher's floor. Both thresholds are untuned (see DESIGN.md).
fn apply_schema_override(calls: &mut Vec<Call>, user_text: &str, tools: &[ToolSchema]) {
    let Some(first) = calls.first() else {
        return;
    };
    let Some(schema_best) = find_best_tool(user_text, tools) else {
        return;
    };
    if schema_best.name == first.name {
        return;
    }

    let query_words: HashSet<String> = tokenize(user_text).into_iter().collect();
    let model_tool = tools.iter().find(|t| t.name == first.name);
    let m_rel = model_tool.map_or(0.0, |t| tool_relevance(t, &query_words));
    let s_rel = tool_relevance(schema_best, &query_words);

    // TODO: both thresholds are untuned; no data has driven these constants.
    if m_rel < 0.01 && s_rel > 0.15 {
        log::debug!(
            "schema override: discarding model choice {} in favor of {}",
            first.name,
            schema_best.name
        );
        calls.clear();
    }
}

/// For each model-produced call, checks whether the schema extractor would
/// fill the same tool with a higher-overlap-scoring set of arguments, and
/// swaps in the schema version when it strictly outscores the model's.
fn maybe_prefer_schema(
    calls: Vec<Call>,
    user_text: &str,
    tools: &[ToolSchema],
    extra_nouns: &[String],
) -> Vec<Call> {
    calls
        .into_iter()
        .map(|call| {
            let Some(tool) = tools.iter().find(|t| t.name == call.name) else {
                return call;
            };
            let Some(schema_call) = extract_from_schema(user_text, tool, extra_nouns) else {
                return call;
            };
            let model_score =
                overlap_score(std::slice::from_ref(&call), user_text, tools, extra_nouns);
            let schema_score =
                overlap_score(std::slice::from_ref(&schema_call), user_text, tools, extra_nouns);
            if schema_score > model_score {
                log::debug!("schema-improve: preferring schema extraction for {}", tool.name);
                schema_call
            } else {
                call
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use resolver_types::{ArgValue, ParamType, ParameterSchema};

    struct ScriptedModel {
        responses: Vec<String>,
        next: usize,
    }

    impl ScriptedModel {
        fn new(responses: Vec<&str>) -> Self {
            Self {
                responses: responses.into_iter().map(str::to_string).collect(),
                next: 0,
            }
        }
    }

    #[async_trait::async_trait]
    impl ModelHandle for ScriptedModel {
        async fn complete(&mut self, _request: ModelRequest<'_>) -> String {
            let response = self.responses.get(self.next).cloned().unwrap_or_default();
            self.next += 1;
            response
        }

        async fn reset(&mut self) {}
    }

    fn weather_tool() -> ToolSchema {
        ToolSchema {
            name: "get_weather".into(),
            description: "get the current weather for a city".into(),
            parameters: vec![ParameterSchema {
                name: "location".into(),
                param_type: ParamType::String,
                description: "the city to check".into(),
            }],
            required: vec!["location".into()],
        }
    }

    fn user_turns(text: &str) -> Vec<ChatTurn> {
        vec![ChatTurn {
            role: Role::User,
            content: text.to_string(),
        }]
    }

    #[tokio::test]
    async fn attempt_one_returns_well_formed_model_call() {
        let mut model = ScriptedModel::new(vec![
            r#"{"function_calls":[{"name":"get_weather","arguments":{"location":"San Francisco"}}],"total_time_ms":10,"confidence":0.9,"response":""}"#,
        ]);
        let turns = user_turns("what's the weather in San Francisco");
        let tools = vec![weather_tool()];
        let result = resolve_locally(&mut model, &turns, "what's the weather in San Francisco", &tools, &[]).await;
        assert_eq!(result.calls.len(), 1);
        assert_eq!(result.calls[0].name, "get_weather");
        assert_eq!(
            result.calls[0].arguments.get("location"),
            Some(&ArgValue::Str("San Francisco".into()))
        );
    }

    #[tokio::test]
    async fn falls_through_to_schema_extraction_when_model_is_empty() {
        let mut model = ScriptedModel::new(vec![
            "the model rambled without json",
            "still nothing useful",
        ]);
        let turns = user_turns("what's the weather in Boston");
        let tools = vec![weather_tool()];
        let result = resolve_locally(&mut model, &turns, "what's the weather in Boston", &tools, &[]).await;
        assert_eq!(result.calls.len(), 1);
        assert_eq!(result.calls[0].name, "get_weather");
        assert_eq!(
            result.calls[0].arguments.get("location"),
            Some(&ArgValue::Str("Boston".into()))
        );
    }
}
