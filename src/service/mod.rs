//! Board controller: the in-memory list of notes plus the UI state around
//! it (search term, editor, pending delete, error banner).
//!
//! The local list only changes after the store acknowledges a mutation. A
//! failed store call leaves the list untouched and puts the error message
//! in the banner.

use std::sync::Arc;

use crate::{
    layout,
    models::{NewNote, Note, NotePatch},
    repository::{NoteStore, StoreError},
};

pub type SharedBoard = Arc<tokio::sync::Mutex<Board>>;

#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Please fill in at least one field")]
    BlankNote,

    #[error("note {0} not found")]
    NotFound(i64),

    #[error("no delete is waiting for confirmation")]
    NothingToConfirm,

    #[error("the editor is not open")]
    EditorClosed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditorMode {
    #[default]
    Closed,
    New,
    Editing(i64),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub title: String,
    pub content: String,
}

impl Draft {
    fn is_blank(&self) -> bool {
        is_blank(&self.title, &self.content)
    }
}

fn is_blank(title: &str, content: &str) -> bool {
    title.trim().is_empty() && content.trim().is_empty()
}

pub struct Board {
    store: Arc<dyn NoteStore>,
    notes: Vec<Note>,
    search: String,
    editor: EditorMode,
    draft: Draft,
    pending_delete: Option<i64>,
    error: Option<String>,
    loading: bool,
}

impl Board {
    pub fn new(store: Arc<dyn NoteStore>) -> Self {
        Self {
            store,
            notes: Vec::new(),
            search: String::new(),
            editor: EditorMode::Closed,
            draft: Draft::default(),
            pending_delete: None,
            error: None,
            loading: false,
        }
    }

    pub fn shared(self) -> SharedBoard {
        Arc::new(tokio::sync::Mutex::new(self))
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub const fn editor(&self) -> EditorMode {
        self.editor
    }

    pub const fn draft(&self) -> &Draft {
        &self.draft
    }

    pub const fn pending_delete(&self) -> Option<i64> {
        self.pending_delete
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Notes matching the search term, pinned first, newest first.
    pub fn visible(&self) -> Vec<&Note> {
        layout::visible_notes(&self.notes, &self.search)
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search = term.into();
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    fn find(&self, id: i64) -> Result<&Note, BoardError> {
        self.notes
            .iter()
            .find(|n| n.id == id)
            .ok_or(BoardError::NotFound(id))
    }

    fn position(&self, id: i64) -> Option<usize> {
        self.notes.iter().position(|n| n.id == id)
    }

    /// Logs the failure and shows it in the banner.
    fn fail<T>(&mut self, action: &str, err: impl Into<BoardError>) -> Result<T, BoardError> {
        let err = err.into();
        tracing::error!("failed to {}: {}", action, err);
        self.error = Some(err.to_string());
        Err(err)
    }

    fn replace(&mut self, note: Note) -> Result<Note, BoardError> {
        let Some(idx) = self.position(note.id) else {
            return self.fail("replace note", BoardError::NotFound(note.id));
        };
        self.notes[idx] = note.clone();
        self.error = None;
        Ok(note)
    }

    pub async fn load(&mut self) -> Result<(), BoardError> {
        let store = self.begin_load();
        let result = store.list_notes().await;
        self.finish_load(result)
    }

    /// Loads through a shared board without holding its lock while the
    /// store is queried, so readers see `loading` in the meantime.
    pub async fn load_shared(board: &SharedBoard) -> Result<(), BoardError> {
        let store = board.lock().await.begin_load();
        let result = store.list_notes().await;
        board.lock().await.finish_load(result)
    }

    fn begin_load(&mut self) -> Arc<dyn NoteStore> {
        self.loading = true;
        Arc::clone(&self.store)
    }

    fn finish_load(&mut self, result: Result<Vec<Note>, StoreError>) -> Result<(), BoardError> {
        self.loading = false;

        match result {
            Ok(notes) => {
                tracing::info!("Loaded {} notes", notes.len());
                self.notes = notes;
                self.error = None;
                Ok(())
            }
            Err(e) => self.fail("load notes", e),
        }
    }

    /// Returns `Ok(None)` without touching the store when both fields are
    /// blank.
    pub async fn create(&mut self, title: &str, content: &str) -> Result<Option<Note>, BoardError> {
        if is_blank(title, content) {
            return Ok(None);
        }

        let new = NewNote::random(title.to_string(), content.to_string());
        match self.store.insert_note(new).await {
            Ok(note) => {
                tracing::info!("Created note {}", note.id);
                self.notes.insert(0, note.clone());
                self.error = None;
                Ok(Some(note))
            }
            Err(e) => self.fail("create note", e),
        }
    }

    pub async fn update(
        &mut self,
        id: i64,
        title: &str,
        content: &str,
    ) -> Result<Note, BoardError> {
        if is_blank(title, content) {
            return self.fail("update note", BoardError::BlankNote);
        }
        if let Err(e) = self.find(id) {
            return self.fail("update note", e);
        }

        let patch = NotePatch::text(title.to_string(), content.to_string());
        match self.store.update_note(id, patch).await {
            Ok(Some(note)) => {
                tracing::info!("Updated note {}", id);
                self.replace(note)
            }
            Ok(None) => self.fail("update note", BoardError::NotFound(id)),
            Err(e) => self.fail("update note", e),
        }
    }

    pub async fn toggle_pin(&mut self, id: i64) -> Result<Note, BoardError> {
        let pinned = match self.find(id) {
            Ok(note) => note.pinned,
            Err(e) => return self.fail("toggle pin", e),
        };

        match self.store.update_note(id, NotePatch::pin(!pinned)).await {
            Ok(Some(note)) => {
                tracing::info!("Note {} pinned: {}", id, note.pinned);
                self.replace(note)
            }
            Ok(None) => self.fail("toggle pin", BoardError::NotFound(id)),
            Err(e) => self.fail("toggle pin", e),
        }
    }

    /// Asks for confirmation before deleting `id`.
    pub fn request_delete(&mut self, id: i64) -> Result<(), BoardError> {
        if let Err(e) = self.find(id) {
            return self.fail("request delete", e);
        }
        self.pending_delete = Some(id);
        Ok(())
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    pub async fn confirm_delete(&mut self) -> Result<i64, BoardError> {
        let Some(id) = self.pending_delete else {
            return self.fail("confirm delete", BoardError::NothingToConfirm);
        };
        self.delete(id).await?;
        Ok(id)
    }

    /// Deletes `id`; confirmation is assumed to have happened already.
    pub async fn delete(&mut self, id: i64) -> Result<(), BoardError> {
        match self.store.delete_note(id).await {
            Ok(true) => {
                if let Some(idx) = self.position(id) {
                    self.notes.remove(idx);
                }
                if self.pending_delete == Some(id) {
                    self.pending_delete = None;
                }
                tracing::info!("Deleted note {}", id);
                self.error = None;
                Ok(())
            }
            Ok(false) => self.fail("delete note", BoardError::NotFound(id)),
            Err(e) => self.fail("delete note", e),
        }
    }

    pub fn open_new(&mut self) {
        self.editor = EditorMode::New;
        self.draft = Draft::default();
    }

    /// Opens the editor prefilled with the note's current text.
    pub fn start_editing(&mut self, id: i64) -> Result<(), BoardError> {
        let draft = match self.find(id) {
            Ok(note) => Draft {
                title: note.title.clone(),
                content: note.content.clone(),
            },
            Err(e) => return self.fail("start editing", e),
        };
        self.editor = EditorMode::Editing(id);
        self.draft = draft;
        Ok(())
    }

    pub fn set_draft(&mut self, title: String, content: String) -> Result<(), BoardError> {
        if self.editor == EditorMode::Closed {
            return Err(BoardError::EditorClosed);
        }
        self.draft = Draft { title, content };
        Ok(())
    }

    pub fn close_editor(&mut self) {
        self.editor = EditorMode::Closed;
        self.draft = Draft::default();
    }

    /// Creates or updates from the draft. The editor closes unless the
    /// store call fails or an edit was left blank.
    pub async fn submit_editor(&mut self) -> Result<Option<Note>, BoardError> {
        let Draft { title, content } = self.draft.clone();

        let saved = match self.editor {
            EditorMode::Closed => return Err(BoardError::EditorClosed),
            EditorMode::New if self.draft.is_blank() => None,
            EditorMode::New => self.create(&title, &content).await?,
            EditorMode::Editing(id) => Some(self.update(id, &title, &content).await?),
        };

        self.close_editor();
        Ok(saved)
    }
}
