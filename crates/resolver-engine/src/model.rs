//! The on-device model boundary: an opaque, stateful oracle that turns a
//! chat history plus a tool catalog into a raw JSON string. Concrete
//! implementations wrap whatever inference runtime the host application
//! uses; this crate only needs the two operations below.

use resolver_types::{ChatTurn, ToolSchema};

#[derive(Debug, Clone)]
pub struct ModelOptions {
    pub force_tools: bool,
    pub max_tokens: u32,
    pub stop_sequences: Vec<String>,
    pub temperature: Option<f32>,
    pub tool_rag_top_k: u32,
    pub confidence_threshold: f64,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            force_tools: true,
            max_tokens: 512,
            stop_sequences: vec!["<|im_end|>".to_string(), "<end_of_turn>".to_string()],
            temperature: None,
            tool_rag_top_k: 0,
            confidence_threshold: 0.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModelRequest<'a> {
    pub messages: &'a [ChatTurn],
    pub tools: &'a [ToolSchema],
    pub options: ModelOptions,
}

/// A process-wide, non-re-entrant model handle. Callers must `reset` before
/// each `complete` call — the handle carries no guarantee that prior
/// context doesn't bleed into the next generation otherwise.
#[async_trait::async_trait]
pub trait ModelHandle: Send {
    async fn complete(&mut self, request: ModelRequest<'_>) -> String;
    async fn reset(&mut self);
}
