//! The cloud fallback boundary. Invoked only when every local attempt in
//! `local_resolver` comes back empty. The adapter owns schema translation
//! to whatever the cloud provider expects — this crate only needs its
//! request/response shape.

use resolver_types::{Call, ChatTurn, ToolSchema};

#[derive(Debug, Clone)]
pub struct CloudResponse {
    pub function_calls: Vec<Call>,
    pub response: String,
    pub total_time_ms: u64,
}

#[async_trait::async_trait]
pub trait CloudAdapter: Send + Sync {
    async fn generate(&self, messages: &[ChatTurn], tools: &[ToolSchema]) -> Result<CloudResponse, String>;
}
