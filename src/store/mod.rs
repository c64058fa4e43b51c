//! Persistence for sessions and integrations

mod document;
pub mod integration;
pub mod session;

pub use document::JsonDocument;
pub use integration::{FileIntegrationStore, IntegrationStore, MemoryIntegrationStore};
pub use session::{FileSessionStore, MemorySessionStore, SessionStore, SessionUpdate};
