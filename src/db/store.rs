use crate::db::models::{Message, Role, Session};
use crate::db::{DbPool, StorageError};
use chrono::{DateTime, NaiveDateTime, Utc};
use duckdb::{params, Connection, Result as DbResult, Row};
use uuid::Uuid;

/// Durable record of sessions and their ordered messages. All writes are
/// append-only; ordering within a session comes from the store-assigned
/// message id, so concurrent sends on one session cannot interleave.
#[derive(Clone)]
pub struct MessageStore {
    pool: DbPool,
}

impl MessageStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    // Timestamps are selected as VARCHAR; the duckdb driver's native
    // timestamp type does not map onto chrono without an extra feature.
    // DuckDB prints them naive and space-separated, e.g.
    // "2026-08-30 12:11:31.351", which chrono's FromStr does not accept.
    fn parse_timestamp(idx: usize, s: &str) -> DbResult<DateTime<Utc>> {
        s.parse::<DateTime<Utc>>()
            .or_else(|_| {
                NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f").map(|n| n.and_utc())
            })
            .map_err(|e| {
                duckdb::Error::FromSqlConversionFailure(
                    idx,
                    duckdb::types::Type::Text,
                    Box::new(e),
                )
            })
    }

    fn parse_uuid(idx: usize, s: &str) -> DbResult<Uuid> {
        s.parse().map_err(|e: uuid::Error| {
            duckdb::Error::FromSqlConversionFailure(idx, duckdb::types::Type::Text, Box::new(e))
        })
    }

    fn row_to_session(row: &Row) -> DbResult<Session> {
        let id_str: String = row.get(0)?;
        let created_str: String = row.get(1)?;

        Ok(Session {
            id: Self::parse_uuid(0, &id_str)?,
            created_at: Self::parse_timestamp(1, &created_str)?,
        })
    }

    fn row_to_message(row: &Row) -> DbResult<Message> {
        let session_str: String = row.get(1)?;
        let role_str: String = row.get(2)?;
        let created_str: String = row.get(4)?;

        Ok(Message {
            id: row.get(0)?,
            session_id: Self::parse_uuid(1, &session_str)?,
            role: Role::parse(&role_str).unwrap_or(Role::Assistant),
            content: row.get(3)?,
            created_at: Self::parse_timestamp(4, &created_str)?,
        })
    }

    fn fetch_session(conn: &Connection, id: Uuid) -> Result<Option<Session>, StorageError> {
        let mut stmt = conn.prepare(
            "SELECT id, CAST(created_at AS VARCHAR) FROM sessions WHERE id = ?",
        )?;
        let mut rows = stmt.query_map(params![id.to_string()], Self::row_to_session)?;

        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// Resolve `token` to an existing session, or create a fresh one when the
    /// token is absent or unknown.
    pub fn get_or_create_session(&self, token: Option<Uuid>) -> Result<Session, StorageError> {
        let conn = self.pool.lock().unwrap();

        if let Some(id) = token {
            if let Some(session) = Self::fetch_session(&conn, id)? {
                return Ok(session);
            }
        }

        let id = Uuid::new_v4();
        conn.execute("INSERT INTO sessions (id) VALUES (?)", params![id.to_string()])?;

        Self::fetch_session(&conn, id)?.ok_or(StorageError::UnknownSession(id))
    }

    pub fn get_session(&self, id: Uuid) -> Result<Option<Session>, StorageError> {
        let conn = self.pool.lock().unwrap();
        Self::fetch_session(&conn, id)
    }

    pub fn list_sessions(&self, limit: usize, offset: usize) -> Result<Vec<Session>, StorageError> {
        let conn = self.pool.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, CAST(created_at AS VARCHAR) FROM sessions \
             ORDER BY created_at DESC LIMIT ? OFFSET ?",
        )?;
        let rows = stmt.query_map(params![limit as i64, offset as i64], Self::row_to_session)?;

        let mut sessions = Vec::new();
        for row in rows {
            sessions.push(row?);
        }
        Ok(sessions)
    }

    /// Append one message with the next sequence-assigned position. Fails if
    /// the session does not exist.
    pub fn append_message(
        &self,
        session_id: Uuid,
        role: Role,
        content: &str,
    ) -> Result<Message, StorageError> {
        let conn = self.pool.lock().unwrap();

        if Self::fetch_session(&conn, session_id)?.is_none() {
            return Err(StorageError::UnknownSession(session_id));
        }

        conn.execute(
            "INSERT INTO messages (session_id, role, content) VALUES (?, ?, ?)",
            params![session_id.to_string(), role.as_str(), content],
        )?;

        // Fetch the row we just inserted (id comes from the sequence).
        let mut stmt = conn.prepare(
            "SELECT id, session_id, role, content, CAST(created_at AS VARCHAR) \
             FROM messages WHERE session_id = ? ORDER BY id DESC LIMIT 1",
        )?;
        let mut rows = stmt.query_map(params![session_id.to_string()], Self::row_to_message)?;

        match rows.next() {
            Some(row) => Ok(row?),
            None => Err(StorageError::UnknownSession(session_id)),
        }
    }

    /// Up to `limit` most recent messages, returned oldest-first. Empty for a
    /// session with no messages.
    pub fn recent_messages(
        &self,
        session_id: Uuid,
        limit: usize,
    ) -> Result<Vec<Message>, StorageError> {
        let conn = self.pool.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, session_id, role, content, CAST(created_at AS VARCHAR) \
             FROM messages WHERE session_id = ? ORDER BY id DESC LIMIT ?",
        )?;
        let rows = stmt.query_map(
            params![session_id.to_string(), limit as i64],
            Self::row_to_message,
        )?;

        let mut messages = Vec::new();
        for row in rows {
            messages.push(row?);
        }
        messages.reverse();
        Ok(messages)
    }

    /// Full ordered transcript for a session, oldest-first.
    pub fn history(&self, session_id: Uuid) -> Result<Vec<Message>, StorageError> {
        let conn = self.pool.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, session_id, role, content, CAST(created_at AS VARCHAR) \
             FROM messages WHERE session_id = ? ORDER BY id ASC",
        )?;
        let rows = stmt.query_map(params![session_id.to_string()], Self::row_to_message)?;

        let mut messages = Vec::new();
        for row in rows {
            messages.push(row?);
        }
        Ok(messages)
    }
}
