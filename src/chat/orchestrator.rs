use serde::Serialize;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::chat::{ChatError, ContextBuilder};
use crate::config::ChatConfig;
use crate::db::{Message, MessageStore, Role};
use crate::llm::LlmProvider;

/// What one completed turn hands back to the transport layer. The caller
/// must keep `session_id` and send it with the next message.
#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub session_id: Uuid,
    pub user_message: Message,
    pub assistant_message: Message,
}

/// Entry point for one user turn: validate, resolve the session, persist
/// both sides of the exchange, and never let a model failure dead-end the
/// conversation.
pub struct Orchestrator {
    store: MessageStore,
    llm: Arc<dyn LlmProvider>,
    context: ContextBuilder,
    max_message_chars: usize,
    fallback_reply: String,
}

impl Orchestrator {
    pub fn new(store: MessageStore, llm: Arc<dyn LlmProvider>, cfg: &ChatConfig) -> Self {
        Self {
            context: ContextBuilder::new(cfg),
            max_message_chars: cfg.max_message_chars,
            fallback_reply: cfg.fallback_reply.clone(),
            store,
            llm,
        }
    }

    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    pub async fn handle_user_message(
        &self,
        session_token: Option<Uuid>,
        text: &str,
    ) -> Result<ChatReply, ChatError> {
        let text = self.validate(text)?;

        let session = self.store.get_or_create_session(session_token)?;

        // Context is assembled before the user message is stored, so the
        // window holds prior history only and the new text rides as the
        // final turn.
        let turns = self.context.build(&self.store, session.id, text)?;

        let user_message = self.store.append_message(session.id, Role::User, text)?;

        // The DB lock is not held here; concurrent sessions proceed while
        // this one awaits the model.
        let reply_text = match self.llm.complete(&turns).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Completion failed for session {}: {}", session.id, e);
                self.fallback_reply.clone()
            }
        };

        let assistant_message = self
            .store
            .append_message(session.id, Role::Assistant, &reply_text)?;

        Ok(ChatReply {
            session_id: session.id,
            user_message,
            assistant_message,
        })
    }

    /// Full ordered transcript for the UI to repopulate on reload. An absent
    /// or unknown token yields an empty history, not an error.
    pub fn history(&self, session_token: Option<Uuid>) -> Result<Vec<Message>, ChatError> {
        let Some(id) = session_token else {
            return Ok(Vec::new());
        };
        if self.store.get_session(id)?.is_none() {
            return Ok(Vec::new());
        }
        Ok(self.store.history(id)?)
    }

    fn validate<'a>(&self, text: &'a str) -> Result<&'a str, ChatError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ChatError::Validation("message cannot be empty".into()));
        }
        if trimmed.chars().count() > self.max_message_chars {
            return Err(ChatError::Validation(format!(
                "message exceeds {} characters",
                self.max_message_chars
            )));
        }
        Ok(trimmed)
    }
}
