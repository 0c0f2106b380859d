mod memory;
mod postgres;
mod rest;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use rest::RestStore;

use async_trait::async_trait;

use std::sync::Arc;

use crate::{
    config::StoreSettings,
    models::{NewNote, Note, NotePatch},
};

/// Name of the table notes live in, for every backend.
pub const TABLE: &str = "posts";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("request to note store failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("note store responded with {status}: {message}")]
    Status { status: u16, message: String },

    #[error("note store returned no row")]
    MissingRow,

    #[error("malformed row: {0}")]
    Decode(String),

    #[error("database error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("failed to migrate database: {0}")]
    Migration(#[from] refinery::Error),
}

/// The table of notes the board is persisted to.
#[async_trait]
pub trait NoteStore: Send + Sync {
    /// All notes, newest first.
    async fn list_notes(&self) -> Result<Vec<Note>, StoreError>;

    /// Inserts one note and returns the stored row.
    async fn insert_note(&self, note: NewNote) -> Result<Note, StoreError>;

    /// Returns `None` when no note has this id.
    async fn update_note(&self, id: i64, patch: NotePatch) -> Result<Option<Note>, StoreError>;

    /// Returns whether a row was removed.
    async fn delete_note(&self, id: i64) -> Result<bool, StoreError>;
}

/// Opens the configured store, migrating it if needed.
pub async fn open(settings: &StoreSettings) -> Result<Arc<dyn NoteStore>, StoreError> {
    match settings {
        StoreSettings::Rest {
            url,
            api_key,
            timeout,
        } => {
            tracing::info!("Using hosted note store at {}", url);
            Ok(Arc::new(RestStore::new(url, api_key.clone(), *timeout)?))
        }
        StoreSettings::Postgres { dsn } => {
            let mut store = PostgresStore::connect(dsn).await?;
            store.migrate().await?;
            Ok(Arc::new(store))
        }
        StoreSettings::Memory => {
            tracing::warn!("Using in-memory note store, notes are lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
