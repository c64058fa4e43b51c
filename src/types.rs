//! Core data types for a3s-workbench
//!
//! All types use camelCase JSON serialization for wire compatibility with the
//! browser pages and the stored JSON documents.

use serde::{Deserialize, Serialize};

/// Backend kind of an integration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegrationKind {
    /// Ollama-style endpoint called directly by the server
    #[serde(alias = "ollama")]
    Local,
    /// Hosted endpoint reached only through the proxy forwarder
    #[serde(alias = "nutanix")]
    Proxied,
}

impl IntegrationKind {
    /// Parse a wire `type` value, accepting the legacy backend names
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" | "ollama" => Some(Self::Local),
            "proxied" | "nutanix" => Some(Self::Proxied),
            _ => None,
        }
    }

    /// Whether integrations of this kind must carry a credential
    pub fn requires_credential(&self) -> bool {
        !matches!(self, Self::Local)
    }

    /// Display name of the upstream service, used in error messages
    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::Local => "Ollama",
            Self::Proxied => "Nutanix",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Proxied => "proxied",
        }
    }
}

impl std::fmt::Display for IntegrationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A configured connection to one inference backend
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Integration {
    /// Opaque identifier (time-based)
    pub id: String,

    /// User-facing name
    pub name: String,

    /// Backend kind
    #[serde(rename = "type")]
    pub kind: IntegrationKind,

    /// Base URL of the backend
    pub endpoint: String,

    /// Bearer credential; always empty for local integrations
    #[serde(rename = "apiKey", default)]
    pub credential: String,

    /// Whether this integration is enabled
    #[serde(default)]
    pub active: bool,
}

impl Integration {
    /// Endpoint with any trailing slash removed
    pub fn base_url(&self) -> &str {
        self.endpoint.trim_end_matches('/')
    }
}

impl std::fmt::Debug for Integration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Integration")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("endpoint", &self.endpoint)
            .field("credential", &"[REDACTED]")
            .field("active", &self.active)
            .finish()
    }
}

/// Registration request for a new integration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIntegration {
    #[serde(default)]
    pub name: String,

    /// Kind as sent on the wire; validated by the registry
    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default)]
    pub endpoint: String,

    #[serde(default)]
    pub api_key: Option<String>,
}

/// Author of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    #[serde(alias = "bot")]
    Assistant,
}

/// One message in a transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// A persisted, ordered conversation transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,

    pub title: String,

    /// Turns in conversation order
    #[serde(rename = "messages", default)]
    pub turns: Vec<Turn>,

    /// Bumped on every effective change
    #[serde(default)]
    pub version: u64,
}

impl Session {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            turns: Vec::new(),
            version: 0,
        }
    }
}

/// The two independent session collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Chat,
    Codegen,
}

impl Collection {
    /// Title given to sessions created without one
    pub fn default_title(&self) -> &'static str {
        match self {
            Collection::Chat => "New Chat",
            Collection::Codegen => "New CodeGen Session",
        }
    }

    /// File name of the stored document
    pub fn file_name(&self) -> &'static str {
        match self {
            Collection::Chat => "chatbot.json",
            Collection::Codegen => "codeGen.json",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Chat => "chat",
            Collection::Codegen => "codegen",
        }
    }
}

/// Requested reply length for conversation tasks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenSize {
    Small,
    #[default]
    Medium,
    Large,
    Xl,
}

impl TokenSize {
    pub fn max_tokens(&self) -> u32 {
        match self {
            TokenSize::Small => 256,
            TokenSize::Medium => 512,
            TokenSize::Large => 1024,
            TokenSize::Xl => 2048,
        }
    }
}

/// Milliseconds since the Unix epoch, used as the id source
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Allocate a time-based id that does not collide with `taken`
pub fn next_id<'a>(taken: impl Iterator<Item = &'a str> + Clone) -> String {
    let mut candidate = now_millis();
    while taken.clone().any(|id| id == candidate.to_string()) {
        candidate += 1;
    }
    candidate.to_string()
}
