//! Shared data model for the hybrid function-call router: tool schemas,
//! chat turns, tagged argument values, and the result types returned by
//! the resolver pipeline.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A tool-call argument value. The on-device model, JSON repair, and the
/// schema extractor all produce values of unknown provenance (string,
/// number, bool, or absent) before coercion narrows them to the type the
/// tool schema declares — so this stays a tagged sum rather than a single
/// numeric/string field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgValue {
    Null,
    Bool(bool),
    I64(i64),
    F64(f64),
    Str(String),
}

impl ArgValue {
    pub fn is_valid(&self) -> bool {
        match self {
            ArgValue::Null => false,
            ArgValue::Str(s) => !s.trim().is_empty(),
            _ => true,
        }
    }

    /// Best-effort stringification used by coercion and by extractors that
    /// need to compare a value against raw utterance text.
    pub fn as_display_string(&self) -> String {
        match self {
            ArgValue::Null => String::new(),
            ArgValue::Bool(b) => b.to_string(),
            ArgValue::I64(i) => i.to_string(),
            ArgValue::F64(f) => f.to_string(),
            ArgValue::Str(s) => s.clone(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ArgValue::I64(i) => Some(*i),
            _ => None,
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display_string())
    }
}

/// The JSON-Schema-ish primitive type a tool parameter declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
    /// Declarable by a tool schema but never produced by coercion; the
    /// extractor and coercion stages only ever fill scalar parameters.
    Object,
    Array,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: ParamType,
    #[serde(default)]
    pub description: String,
}

/// A tool definition as exposed to the resolver: name, description, its
/// parameters in declaration order, and which of them are required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub parameters: Vec<ParameterSchema>,
    #[serde(default)]
    pub required: Vec<String>,
}

impl ToolSchema {
    pub fn param(&self, name: &str) -> Option<&ParameterSchema> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }
}

/// Role of a chat-history turn. Only `system`/`user`/`assistant` content
/// feeds the resolver; the most recent `user` turn is the utterance under
/// analysis (see `Utterance::from_turns`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

/// A resolved tool call: a name plus its (by then coerced) arguments in
/// schema declaration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    pub name: String,
    pub arguments: BTreeMap<String, ArgValue>,
}

impl Call {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: BTreeMap::new(),
        }
    }

    /// Canonical key used for deduplication: name plus arguments serialized
    /// with sorted keys, so two calls built in different argument orders
    /// still collide. `BTreeMap` already sorts by key, so this is just the
    /// JSON encoding of the struct.
    pub fn dedup_key(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Where a `ResolutionResult`'s calls ultimately came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResolutionSource {
    OnDevice,
    CloudFallback,
}

/// The resolver's final answer for one utterance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionResult {
    pub function_calls: Vec<Call>,
    pub total_time_ms: u64,
    pub confidence: f64,
    pub source: ResolutionSource,
    /// Confidence the local attempt reported before falling back to cloud;
    /// only meaningful when `source` is `CloudFallback`.
    pub local_confidence: Option<f64>,
    /// Echoes the caller-supplied threshold back for compatibility; the
    /// resolver never branches on it (see DESIGN.md Open Question: the
    /// original accepts this parameter but its local-vs-cloud decision is
    /// driven entirely by whether any local calls were produced).
    pub confidence_threshold: f64,
}

/// The query text every component in this crate calls "the utterance": the
/// concatenation of all user-turn contents, joined by single spaces,
/// original casing preserved.
pub fn query_text(turns: &[ChatTurn]) -> String {
    turns
        .iter()
        .filter(|t| t.role == Role::User)
        .map(|t| t.content.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
