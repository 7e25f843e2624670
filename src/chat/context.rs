use uuid::Uuid;

use crate::config::ChatConfig;
use crate::db::{MessageStore, StorageError};
use crate::llm::models::Turn;

/// Assembles the bounded turn list the completion collaborator sees:
/// one system directive, up to `history_window` stored messages
/// (oldest-first), then the not-yet-persisted user text.
pub struct ContextBuilder {
    system_prompt: String,
    history_window: usize,
}

impl ContextBuilder {
    pub fn new(cfg: &ChatConfig) -> Self {
        Self {
            system_prompt: cfg.system_prompt.clone(),
            history_window: cfg.history_window,
        }
    }

    pub fn build(
        &self,
        store: &MessageStore,
        session_id: Uuid,
        new_user_text: &str,
    ) -> Result<Vec<Turn>, StorageError> {
        let mut turns = Vec::with_capacity(self.history_window + 2);
        turns.push(Turn::system(&self.system_prompt));

        for msg in store.recent_messages(session_id, self.history_window)? {
            turns.push(Turn::from(&msg));
        }

        turns.push(Turn::user(new_user_text));
        Ok(turns)
    }
}
