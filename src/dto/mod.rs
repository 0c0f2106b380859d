use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    layout::{self, NoteSize},
    models::{Note, NoteColor},
    service::{Board, EditorMode},
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NoteResponse {
    /// Note ID
    pub id: i64,
    pub title: String,
    pub content: String,
    pub color: NoteColor,
    /// Rotation in degrees
    pub rotation: i16,
    pub created_at: DateTime<Utc>,
    /// Set once the note was edited or (un)pinned
    pub updated_at: Option<DateTime<Utc>>,
    pub pinned: bool,
}

impl From<&Note> for NoteResponse {
    fn from(note: &Note) -> Self {
        Self {
            id: note.id,
            title: note.title.clone(),
            content: note.content.clone(),
            color: note.color,
            rotation: note.rotation,
            created_at: note.created_at,
            updated_at: note.updated_at,
            pinned: note.pinned,
        }
    }
}

/// A note as drawn on the board.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NoteCard {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub color: NoteColor,
    /// CSS classes for the card background
    pub color_class: String,
    pub rotation: i16,
    /// CSS transform, e.g. `rotate(-1deg)`
    pub rotation_css: String,
    pub size: NoteSize,
    pub grid_span: String,
    pub pinned: bool,
    pub created_label: String,
    /// Last edit date, absent for notes never edited
    pub edited_label: Option<String>,
    /// Creation date, plus the edit date when there is one
    pub footer: String,
}

impl From<&Note> for NoteCard {
    fn from(note: &Note) -> Self {
        let size = layout::classify_size(&note.title, &note.content);
        Self {
            id: note.id,
            title: note.title.clone(),
            content: note.content.clone(),
            color: note.color,
            color_class: layout::color_class(note.color),
            rotation: note.rotation,
            rotation_css: layout::rotation_css(note.rotation),
            size,
            grid_span: size.grid_span().to_string(),
            pinned: note.pinned,
            created_label: layout::date_label(note.created_at),
            edited_label: note.updated_at.map(layout::date_label),
            footer: layout::footer_label(note),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EditorKind {
    Closed,
    New,
    Editing,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EditorResponse {
    pub mode: EditorKind,
    /// Note being edited, when `mode` is `editing`
    pub note_id: Option<i64>,
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BoardResponse {
    /// Visible notes, pinned first, newest first
    pub notes: Vec<NoteCard>,
    pub search: String,
    pub loading: bool,
    /// Error banner
    pub error: Option<String>,
    pub editor: EditorResponse,
    /// Note awaiting delete confirmation
    pub pending_delete: Option<i64>,
    /// Shown instead of the grid when no notes are visible
    pub empty_message: Option<String>,
}

impl BoardResponse {
    /// Renders the board. `search` overrides the stored search term for
    /// this view only.
    pub fn render(board: &Board, search: Option<&str>) -> Self {
        let search = search.unwrap_or_else(|| board.search());
        let notes: Vec<NoteCard> = layout::visible_notes(board.notes(), search)
            .into_iter()
            .map(NoteCard::from)
            .collect();

        let (mode, note_id) = match board.editor() {
            EditorMode::Closed => (EditorKind::Closed, None),
            EditorMode::New => (EditorKind::New, None),
            EditorMode::Editing(id) => (EditorKind::Editing, Some(id)),
        };

        Self {
            empty_message: notes
                .is_empty()
                .then(|| layout::empty_message(search).to_string()),
            notes,
            search: search.to_string(),
            loading: board.is_loading(),
            error: board.error().map(str::to_string),
            editor: EditorResponse {
                mode,
                note_id,
                title: board.draft().title.clone(),
                content: board.draft().content.clone(),
            },
            pending_delete: board.pending_delete(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct CreateNoteRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateNoteRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct DraftRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct SearchRequest {
    /// Empty string clears the search
    #[serde(default)]
    pub term: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct OpenEditorRequest {
    /// Note to edit; omit to write a new note
    pub id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BoardQuery {
    /// Search term for this view, instead of the stored one
    pub search: Option<String>,
}
