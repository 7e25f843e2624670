#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use candychat::chat::{ChatError, Orchestrator};
    use candychat::config::{ChatConfig, DatabaseConfig};
    use candychat::db::{get_connection, MessageStore, Role};
    use candychat::llm::models::{Turn, TurnRole};
    use candychat::llm::{CompletionError, LlmProvider};
    use std::sync::{Arc, Mutex};
    use uuid::Uuid;

    const FALLBACK: &str = "Sorry, I'm unavailable right now. Please try again in a moment.";

    /// Scripted stand-in for the hosted model. Records every turn list it
    /// receives so tests can inspect the context window.
    struct MockProvider {
        reply: Result<String, ()>,
        seen: Mutex<Vec<Vec<Turn>>>,
    }

    impl MockProvider {
        fn replying(text: &str) -> Arc<Self> {
            Arc::new(Self { reply: Ok(text.to_string()), seen: Mutex::new(Vec::new()) })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self { reply: Err(()), seen: Mutex::new(Vec::new()) })
        }

        fn last_request(&self) -> Vec<Turn> {
            self.seen.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl LlmProvider for MockProvider {
        fn name(&self) -> &str {
            "mock"
        }

        async fn complete(&self, turns: &[Turn]) -> Result<String, CompletionError> {
            self.seen.lock().unwrap().push(turns.to_vec());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(()) => Err(CompletionError::Api("scripted failure".into())),
            }
        }

        fn supported_models(&self) -> Vec<&str> {
            vec!["mock-1"]
        }
    }

    fn chat_config() -> ChatConfig {
        ChatConfig {
            system_prompt: "You are a helpful blog assistant.".into(),
            history_window: 10,
            max_message_chars: 4000,
            fallback_reply: FALLBACK.into(),
        }
    }

    fn build(llm: Arc<dyn LlmProvider>) -> Orchestrator {
        let pool = get_connection(&DatabaseConfig { path: ":memory:".to_string() }).unwrap();
        Orchestrator::new(MessageStore::new(pool), llm, &chat_config())
    }

    #[tokio::test]
    async fn first_message_creates_session_and_persists_both_turns() {
        let llm = MockProvider::replying("It's a tech blog about programming.");
        let orchestrator = build(llm.clone());

        let reply = orchestrator
            .handle_user_message(None, "Hello, what is this blog about?")
            .await
            .unwrap();

        assert!(!reply.session_id.is_nil());
        assert_eq!(reply.user_message.role, Role::User);
        assert_eq!(reply.user_message.content, "Hello, what is this blog about?");
        assert_eq!(reply.assistant_message.role, Role::Assistant);
        assert_eq!(reply.assistant_message.content, "It's a tech blog about programming.");

        let history = orchestrator.history(Some(reply.session_id)).unwrap();
        assert_eq!(history.len(), 2);
    }

    #[tokio::test]
    async fn same_token_appends_to_same_session() {
        let orchestrator = build(MockProvider::replying("ok"));

        let first = orchestrator.handle_user_message(None, "one").await.unwrap();
        let second = orchestrator
            .handle_user_message(Some(first.session_id), "two")
            .await
            .unwrap();

        assert_eq!(first.session_id, second.session_id);
        assert_eq!(orchestrator.history(Some(first.session_id)).unwrap().len(), 4);
    }

    #[tokio::test]
    async fn omitted_token_always_creates_fresh_session() {
        let orchestrator = build(MockProvider::replying("ok"));

        let first = orchestrator.handle_user_message(None, "one").await.unwrap();
        let second = orchestrator.handle_user_message(None, "two").await.unwrap();

        assert_ne!(first.session_id, second.session_id);
    }

    #[tokio::test]
    async fn completion_failure_falls_back_and_is_persisted() {
        let orchestrator = build(MockProvider::failing());

        let reply = orchestrator.handle_user_message(None, "hello").await.unwrap();
        assert_eq!(reply.assistant_message.content, FALLBACK);

        // The fallback is written through the normal persistence path
        let history = orchestrator.history(Some(reply.session_id)).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].role, Role::Assistant);
        assert_eq!(history[1].content, FALLBACK);
    }

    #[tokio::test]
    async fn validation_rejects_without_touching_the_store() {
        let orchestrator = build(MockProvider::replying("ok"));

        for bad in ["", "   \t\n", &"x".repeat(4001)] {
            let result = orchestrator.handle_user_message(None, bad).await;
            assert!(matches!(result, Err(ChatError::Validation(_))));
        }

        // No session was created for any rejected input
        assert!(orchestrator.store().list_sessions(50, 0).unwrap().is_empty());
    }

    #[tokio::test]
    async fn context_window_carries_at_most_ten_history_turns() {
        let llm = MockProvider::replying("ok");
        let orchestrator = build(llm.clone());

        let session = orchestrator.store().get_or_create_session(None).unwrap();
        for i in 0..12 {
            let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
            orchestrator
                .store()
                .append_message(session.id, role, &format!("turn {}", i))
                .unwrap();
        }

        orchestrator
            .handle_user_message(Some(session.id), "latest question")
            .await
            .unwrap();

        let request = llm.last_request();
        // 1 system + 10 history + 1 new user turn
        assert_eq!(request.len(), 12);
        assert_eq!(request[0].role, TurnRole::System);
        assert_eq!(request[1].content, "turn 2");
        assert_eq!(request[11].role, TurnRole::User);
        assert_eq!(request[11].content, "latest question");
    }

    #[tokio::test]
    async fn context_grows_with_history_until_the_cap() {
        let llm = MockProvider::replying("ok");
        let orchestrator = build(llm.clone());

        // Brand-new session: system + new user turn only
        let reply = orchestrator.handle_user_message(None, "hi").await.unwrap();
        assert_eq!(llm.last_request().len(), 2);

        // Second turn sees the first exchange as history
        orchestrator
            .handle_user_message(Some(reply.session_id), "again")
            .await
            .unwrap();
        assert_eq!(llm.last_request().len(), 4);
    }

    #[tokio::test]
    async fn history_is_empty_for_missing_or_unknown_token() {
        let orchestrator = build(MockProvider::replying("ok"));

        assert!(orchestrator.history(None).unwrap().is_empty());
        assert!(orchestrator.history(Some(Uuid::new_v4())).unwrap().is_empty());
    }

    #[tokio::test]
    async fn input_is_trimmed_before_persistence() {
        let orchestrator = build(MockProvider::replying("ok"));

        let reply = orchestrator
            .handle_user_message(None, "  hello there  ")
            .await
            .unwrap();
        assert_eq!(reply.user_message.content, "hello there");
    }
}
