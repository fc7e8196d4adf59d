//! Environment configuration for the collaborators the core resolver stays
//! agnostic to: Notion/Slack tool executors and the cloud LLM adapter. The
//! resolver crates never read these directly — only this binary's wiring
//! does, when it constructs a concrete `CloudAdapter`.

use std::env;

#[derive(Debug, Clone, Default)]
pub struct RouterConfig {
    pub notion_api_key: Option<String>,
    pub slack_bot_token: Option<String>,
    pub gemini_api_key: Option<String>,
    pub functional_model_path: Option<String>,
}

impl RouterConfig {
    pub fn from_env() -> Self {
        Self {
            notion_api_key: env::var("NOTION_API_KEY").ok(),
            slack_bot_token: env::var("SLACK_BOT_TOKEN").ok(),
            gemini_api_key: env::var("GEMINI_API_KEY").ok(),
            functional_model_path: env::var("FUNCTIONAL_MODEL_PATH").ok(),
        }
    }

    pub fn cloud_configured(&self) -> bool {
        self.gemini_api_key.is_some()
    }
}
