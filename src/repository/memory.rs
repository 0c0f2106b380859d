use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{NoteStore, StoreError};
use crate::models::{NewNote, Note, NotePatch};

#[derive(Default)]
struct Table {
    notes: Vec<Note>,
    last_id: i64,
}

/// Keeps notes in process memory only.
#[derive(Default)]
pub struct MemoryStore {
    table: RwLock<Table>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NoteStore for MemoryStore {
    async fn list_notes(&self) -> Result<Vec<Note>, StoreError> {
        let mut notes = self.table.read().await.notes.clone();
        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(notes)
    }

    async fn insert_note(&self, note: NewNote) -> Result<Note, StoreError> {
        let mut table = self.table.write().await;
        table.last_id += 1;

        let note = Note {
            id: table.last_id,
            title: note.title,
            content: note.content,
            color: note.color,
            rotation: note.rotation,
            created_at: Utc::now(),
            updated_at: None,
            pinned: note.pinned,
        };
        table.notes.push(note.clone());

        Ok(note)
    }

    async fn update_note(&self, id: i64, patch: NotePatch) -> Result<Option<Note>, StoreError> {
        let mut table = self.table.write().await;

        Ok(table.notes.iter_mut().find(|n| n.id == id).map(|note| {
            patch.apply(note);
            note.clone()
        }))
    }

    async fn delete_note(&self, id: i64) -> Result<bool, StoreError> {
        let mut table = self.table.write().await;
        let before = table.notes.len();
        table.notes.retain(|n| n.id != id);

        Ok(table.notes.len() + 1 == before)
    }
}
