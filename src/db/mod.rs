pub mod connection;
pub mod models;
pub mod store;

use thiserror::Error;

pub use connection::{get_connection, DbPool};
pub use models::*;
pub use store::MessageStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("session {0} does not exist")]
    UnknownSession(uuid::Uuid),
    #[error("database error: {0}")]
    Database(#[from] duckdb::Error),
}
