//! Conversation controller
//!
//! Session tasks share one skeleton: resolve the integration and session,
//! persist the user turn, render the prompt, infer, then persist the
//! assistant turn. Inference failures never abort a conversation; they become
//! the assistant's reply (or the one-shot output).

use crate::error::{Result, WorkbenchError};
use crate::inference::Inference;
use crate::prompts::{
    parse_code_segments, split_ticket, IssueType, Segment, Task, TicketDraft,
    TranslationDirection, SUGGESTIONS_UNAVAILABLE,
};
use crate::registry::IntegrationRegistry;
use crate::store::{SessionStore, SessionUpdate};
use crate::types::{Collection, Integration, Session, TokenSize, Turn};
use serde::Serialize;
use std::sync::Arc;

/// Result of one session exchange
#[derive(Debug, Clone, Serialize)]
pub struct Exchange {
    pub session: Session,
    /// Reply split into prose and code (codegen only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segments: Option<Vec<Segment>>,
}

/// Orchestrates sessions, prompts and inference
pub struct ConversationController {
    registry: Arc<IntegrationRegistry>,
    chat: Arc<dyn SessionStore>,
    codegen: Arc<dyn SessionStore>,
    inference: Arc<dyn Inference>,
}

impl ConversationController {
    pub fn new(
        registry: Arc<IntegrationRegistry>,
        chat: Arc<dyn SessionStore>,
        codegen: Arc<dyn SessionStore>,
        inference: Arc<dyn Inference>,
    ) -> Self {
        Self {
            registry,
            chat,
            codegen,
            inference,
        }
    }

    /// Store serving `collection`
    pub fn sessions(&self, collection: Collection) -> &Arc<dyn SessionStore> {
        match collection {
            Collection::Chat => &self.chat,
            Collection::Codegen => &self.codegen,
        }
    }

    pub fn registry(&self) -> &Arc<IntegrationRegistry> {
        &self.registry
    }

    /// Send one user message in a chat or codegen session
    pub async fn send(
        &self,
        collection: Collection,
        session_id: &str,
        integration_id: &str,
        text: &str,
        token_size: TokenSize,
    ) -> Result<Exchange> {
        if session_id.trim().is_empty() {
            return Err(WorkbenchError::Validation(
                "Missing session id".to_string(),
            ));
        }
        require_text(text, "Message text")?;
        let integration = self.resolve(integration_id).await?;
        let store = self.sessions(collection);
        let session = store.get(session_id).await?;

        let mut turns = session.turns;
        turns.push(Turn::user(text));
        let session = store
            .replace(
                session_id,
                SessionUpdate {
                    turns,
                    title: None,
                    expected_version: Some(session.version),
                },
            )
            .await?;

        let task = match collection {
            Collection::Chat => Task::Chat { text },
            Collection::Codegen => Task::Codegen { request: text },
        };
        let reply = self
            .run(&integration, task, Some(token_size.max_tokens()))
            .await
            .unwrap_or_else(|e| e.to_string());

        let segments = match collection {
            Collection::Codegen => Some(parse_code_segments(&reply)),
            Collection::Chat => None,
        };

        let session = append_reply(&**store, session, Turn::assistant(reply)).await?;

        tracing::info!(
            collection = collection.as_str(),
            session = %session.id,
            integration = %integration.id,
            turns = session.turns.len(),
            "Exchange completed"
        );
        Ok(Exchange { session, segments })
    }

    /// Rewrite text between corporate and everyday register
    pub async fn translate(
        &self,
        integration_id: &str,
        text: &str,
        direction: TranslationDirection,
    ) -> Result<String> {
        require_text(text, "Text")?;
        let integration = self.resolve(integration_id).await?;
        let task = Task::Translate { text, direction };
        Ok(self
            .run(&integration, task, task.max_tokens())
            .await
            .unwrap_or_else(|e| e.to_string()))
    }

    /// Plain-language policy with commentary
    pub async fn simplify_policy(&self, integration_id: &str, text: &str) -> Result<String> {
        require_text(text, "Policy text")?;
        let integration = self.resolve(integration_id).await?;
        let task = Task::Policy { text };
        Ok(self
            .run(&integration, task, task.max_tokens())
            .await
            .unwrap_or_else(|e| e.to_string()))
    }

    /// Ideas for making a ticket description more complete
    pub async fn ticket_suggestions(
        &self,
        integration_id: &str,
        description: &str,
    ) -> Result<String> {
        require_text(description, "Description")?;
        let integration = self.resolve(integration_id).await?;
        let task = Task::TicketSuggestions { description };
        match self.run(&integration, task, task.max_tokens()).await {
            Ok(reply) => Ok(reply.trim().to_string()),
            Err(_) => Ok(SUGGESTIONS_UNAVAILABLE.to_string()),
        }
    }

    /// Draft a support ticket and reviewer recommendations
    pub async fn draft_ticket(
        &self,
        integration_id: &str,
        issue_type: IssueType,
        urgency: u8,
        description: &str,
    ) -> Result<TicketDraft> {
        require_text(description, "Description")?;
        if !(1..=5).contains(&urgency) {
            return Err(WorkbenchError::Validation(format!(
                "Urgency must be between 1 and 5, got {}",
                urgency
            )));
        }
        let integration = self.resolve(integration_id).await?;
        let task = Task::Ticket {
            issue_type,
            urgency,
            description,
        };
        match self.run(&integration, task, task.max_tokens()).await {
            Ok(reply) => Ok(split_ticket(&reply)),
            Err(e) => Ok(TicketDraft {
                final_ticket: e.to_string(),
                recommendations: String::new(),
            }),
        }
    }

    async fn resolve(&self, integration_id: &str) -> Result<Integration> {
        if integration_id.trim().is_empty() {
            return Err(WorkbenchError::Validation(
                "Please select an integration".to_string(),
            ));
        }
        self.registry.get(integration_id).await
    }

    async fn run(
        &self,
        integration: &Integration,
        task: Task<'_>,
        max_tokens: Option<u32>,
    ) -> Result<String> {
        let prompt = task.render();
        self.inference.infer(integration, &prompt, max_tokens).await
    }
}

/// Attempts at persisting a reply before a concurrent writer wins
const APPEND_ATTEMPTS: usize = 3;

/// Persist the assistant turn after the transcript `written` was stored.
///
/// Edits made while inference ran (a rename, say) bump the version. The reply
/// is re-applied on top of them as long as the stored transcript still begins
/// with `written`'s turns; otherwise the conflict is returned.
async fn append_reply(
    store: &dyn SessionStore,
    written: Session,
    reply: Turn,
) -> Result<Session> {
    let mut base = written.clone();
    let mut attempt = 1;
    loop {
        let mut turns = base.turns.clone();
        turns.push(reply.clone());
        let update = SessionUpdate {
            turns,
            title: None,
            expected_version: Some(base.version),
        };

        match store.replace(&written.id, update).await {
            Err(conflict @ WorkbenchError::Conflict { .. }) => {
                let current = store.get(&written.id).await?;
                if attempt >= APPEND_ATTEMPTS || !current.turns.starts_with(&written.turns) {
                    return Err(conflict);
                }
                tracing::debug!(
                    session = %written.id,
                    version = current.version,
                    "Session changed during exchange, reapplying reply"
                );
                base = current;
                attempt += 1;
            }
            other => return other,
        }
    }
}

fn require_text(text: &str, field: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(WorkbenchError::Validation(format!("{} is required", field)));
    }
    Ok(())
}
