//! Top-level entry point: runs the local resolver once over the whole
//! utterance, attempts multi-intent recovery when a conjunction suggests
//! more than one request went unanswered, and falls back to the cloud
//! adapter when local resolution produces nothing at all.

use std::sync::LazyLock;

use regex::Regex;

use resolver_extract::extract_proper_nouns;
use resolver_types::{Call, ChatTurn, ResolutionResult, ResolutionSource, Role, ToolSchema};

use crate::cloud::CloudAdapter;
use crate::error::ResolverError;
use crate::local_resolver::resolve_locally;
use crate::model::ModelHandle;

// TODO: the bare `,\s+` branch over-segments list arguments, e.g. "buy eggs,
// milk, and bread" splits into three parts instead of one.
static CONJUNCTION_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+and\s+|,\s*and\s+|,\s+").unwrap());

/// Runs the full hybrid strategy for one request: local resolution, then
/// conjunction-based multi-intent recovery, then cloud fallback if local
/// still has nothing.
pub async fn resolve(
    turns: &[ChatTurn],
    tools: &[ToolSchema],
    confidence_threshold: f64,
    model: &mut dyn ModelHandle,
    cloud: &dyn CloudAdapter,
) -> Result<ResolutionResult, ResolverError> {
    let user_text = resolver_types::query_text(turns);

    let mut local = resolve_locally(model, turns, &user_text, tools, &[]).await;

    let parts: Vec<&str> = CONJUNCTION_SPLIT
        .split(&user_text)
        .map(str::trim)
        .filter(|part| part.len() > 5)
        .collect();
    let expected = parts.len().max(1);

    if parts.len() > 1 && local.calls.len() < expected {
        log::debug!(
            "split: {} clauses found, only {} call(s) resolved from the whole utterance",
            parts.len(),
            local.calls.len()
        );
        let context_pool = extract_proper_nouns(&user_text, None);
        let mut sub_calls: Vec<Call> = Vec::new();
        for part in &parts {
            let sub_turns = [ChatTurn {
                role: Role::User,
                content: (*part).to_string(),
            }];
            let sub = resolve_locally(model, &sub_turns, part, tools, &context_pool).await;
            local.total_time_ms += sub.total_time_ms;
            for call in sub.calls {
                if !sub_calls.iter().any(|c| c.dedup_key() == call.dedup_key()) {
                    sub_calls.push(call);
                }
            }
        }

        let mut merged = sub_calls;
        for call in &local.calls {
            let tool_already_present = merged.iter().any(|c| c.name == call.name);
            if !tool_already_present {
                merged.push(call.clone());
            }
        }
        let mut deduped: Vec<Call> = Vec::new();
        for call in merged {
            if !deduped.iter().any(|c| c.dedup_key() == call.dedup_key()) {
                deduped.push(call);
            }
        }

        if deduped.len() > local.calls.len() {
            log::debug!(
                "merge: {} call(s) after merging split results (was {})",
                deduped.len(),
                local.calls.len()
            );
            local.calls = deduped;
        }
    }

    if !local.calls.is_empty() {
        return Ok(ResolutionResult {
            function_calls: local.calls,
            total_time_ms: local.total_time_ms,
            confidence: local.confidence,
            source: ResolutionSource::OnDevice,
            local_confidence: None,
            confidence_threshold,
        });
    }

    match cloud.generate(turns, tools).await {
        Ok(response) => Ok(ResolutionResult {
            function_calls: response.function_calls,
            total_time_ms: local.total_time_ms + response.total_time_ms,
            confidence: 0.0,
            source: ResolutionSource::CloudFallback,
            local_confidence: Some(local.confidence),
            confidence_threshold,
        }),
        Err(reason) => Err(ResolverError::CloudUnavailable {
            reason,
            local_result: Box::new(ResolutionResult {
                function_calls: Vec::new(),
                total_time_ms: local.total_time_ms,
                confidence: local.confidence,
                source: ResolutionSource::OnDevice,
                local_confidence: Some(local.confidence),
                confidence_threshold,
            }),
        }),
    }
}
