//! # a3s-workbench
//!
//! Server half of an internal-tools workbench: chat, code generation, policy
//! simplification, translation and support-ticket drafting, all backed by
//! pluggable AI integrations.
//!
//! ## Overview
//!
//! An *integration* is a configured connection to one inference backend,
//! either a local Ollama-style endpoint called directly or a hosted
//! chat-completions endpoint reached through the same-origin proxy. Chat and
//! code-generation *sessions* persist as flat JSON documents that are read and
//! rewritten whole on every mutation.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use a3s_workbench::{server, WorkbenchConfig};
//!
//! # async fn example() -> a3s_workbench::Result<()> {
//! let config = WorkbenchConfig {
//!     port: 8080,
//!     ..Default::default()
//! };
//! server::start(config).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - **IntegrationRegistry**: id → backend connection, active flags
//! - **Inference** trait: one prompt in, one plain-text reply out
//! - **ProxyForwarder**: relays bodies to hosted endpoints with the credential attached
//! - **SessionStore** trait: file-backed and in-memory transcript storage
//! - **ConversationController**: prompt rendering, inference and persistence per task

pub mod api;
pub mod cli;
pub mod config;
pub mod controller;
pub mod dirs;
pub mod error;
pub mod forwarder;
pub mod inference;
pub mod prompts;
pub mod registry;
pub mod server;
pub mod store;
pub mod types;

// Re-export core types
pub use config::WorkbenchConfig;
pub use controller::{ConversationController, Exchange};
pub use error::{Result, WorkbenchError};
pub use forwarder::{ProxiedResponse, ProxyForwarder};
pub use inference::{Inference, InferenceAdapter};
pub use prompts::{IssueType, Segment, SegmentKind, Task, TicketDraft, TranslationDirection};
pub use registry::IntegrationRegistry;
pub use store::{
    FileIntegrationStore, FileSessionStore, IntegrationStore, MemoryIntegrationStore,
    MemorySessionStore, SessionStore, SessionUpdate,
};
pub use types::{
    Collection, Integration, IntegrationKind, NewIntegration, Role, Session, TokenSize, Turn,
};
