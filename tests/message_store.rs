#[cfg(test)]
mod tests {
    use candychat::config::DatabaseConfig;
    use candychat::db::{get_connection, MessageStore, Role, StorageError};
    use uuid::Uuid;

    // In-memory database just for tests
    fn get_test_store() -> MessageStore {
        let pool = get_connection(&DatabaseConfig { path: ":memory:".to_string() }).unwrap();
        MessageStore::new(pool)
    }

    #[test]
    fn test_session_resolution() {
        let store = get_test_store();

        // Omitted token creates a fresh session
        let first = store.get_or_create_session(None).unwrap();
        let second = store.get_or_create_session(None).unwrap();
        assert_ne!(first.id, second.id);

        // A known token resolves to the same session
        let resolved = store.get_or_create_session(Some(first.id)).unwrap();
        assert_eq!(resolved.id, first.id);

        // An unknown token falls through to creation
        let unknown = Uuid::new_v4();
        let created = store.get_or_create_session(Some(unknown)).unwrap();
        assert_ne!(created.id, unknown);
    }

    #[test]
    fn test_message_lifecycle() {
        let store = get_test_store();
        let session = store.get_or_create_session(None).unwrap();

        let msg1 = store.append_message(session.id, Role::User, "Hello!").unwrap();
        let msg2 = store.append_message(session.id, Role::Assistant, "Hi there.").unwrap();

        assert_eq!(msg1.role, Role::User);
        assert_eq!(msg1.session_id, session.id);
        assert!(msg2.id > msg1.id);

        let history = store.history(session.id).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].content, "Hello!");
        assert_eq!(history[1].content, "Hi there.");

        // Stored timestamps come back as written, not as read time
        assert_eq!(history[0].created_at, msg1.created_at);
        std::thread::sleep(std::time::Duration::from_millis(50));
        let reread = store.history(session.id).unwrap();
        assert_eq!(reread[0].created_at, history[0].created_at);
        assert_eq!(reread[1].created_at, history[1].created_at);
    }

    #[test]
    fn test_append_rejects_unknown_session() {
        let store = get_test_store();
        let result = store.append_message(Uuid::new_v4(), Role::User, "hello?");
        assert!(matches!(result, Err(StorageError::UnknownSession(_))));
    }

    #[test]
    fn test_recent_messages_window() {
        let store = get_test_store();
        let session = store.get_or_create_session(None).unwrap();

        // Empty session yields an empty window
        assert!(store.recent_messages(session.id, 10).unwrap().is_empty());

        for i in 0..12 {
            store.append_message(session.id, Role::User, &format!("m{}", i)).unwrap();
        }

        let recent = store.recent_messages(session.id, 10).unwrap();
        assert_eq!(recent.len(), 10);
        // Oldest-first, holding the 10 most recent
        assert_eq!(recent[0].content, "m2");
        assert_eq!(recent[9].content, "m11");
    }

    #[test]
    fn test_history_is_strictly_ordered() {
        let store = get_test_store();
        let session = store.get_or_create_session(None).unwrap();

        for i in 0..5 {
            store.append_message(session.id, Role::User, &format!("m{}", i)).unwrap();
        }

        let history = store.history(session.id).unwrap();
        for pair in history.windows(2) {
            assert!(pair[0].id < pair[1].id);
            assert!(pair[0].created_at <= pair[1].created_at);
        }
    }

    #[test]
    fn test_list_sessions_newest_first() {
        let store = get_test_store();
        let older = store.get_or_create_session(None).unwrap();
        // Spread creation times so the ordering is unambiguous
        std::thread::sleep(std::time::Duration::from_millis(10));
        let newer = store.get_or_create_session(None).unwrap();

        let sessions = store.list_sessions(50, 0).unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].id, newer.id);
        assert_eq!(sessions[1].id, older.id);
        assert!(sessions[0].created_at >= sessions[1].created_at);

        let limited = store.list_sessions(1, 0).unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].id, newer.id);
    }
}
