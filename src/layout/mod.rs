//! Board layout: which notes are visible, in what order, and how big each
//! card is drawn. Everything here is a pure function of note data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use std::cmp::Ordering;

use crate::models::{Note, NoteColor};

const WIDE_FROM: usize = 100;
const TALL_FROM: usize = 200;
const EXTRA_LARGE_FROM: usize = 320;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum NoteSize {
    Regular,
    Wide,
    Tall,
    ExtraLarge,
}

impl NoteSize {
    /// Grid span classes for the card.
    pub const fn grid_span(self) -> &'static str {
        match self {
            Self::Regular => "col-span-1 row-span-1",
            Self::Wide => "col-span-2 row-span-1",
            Self::Tall => "col-span-1 row-span-2",
            Self::ExtraLarge => "col-span-2 row-span-2",
        }
    }
}

/// Classifies a card by the combined character count of its text.
pub fn classify_size(title: &str, content: &str) -> NoteSize {
    match title.chars().count() + content.chars().count() {
        n if n >= EXTRA_LARGE_FROM => NoteSize::ExtraLarge,
        n if n >= TALL_FROM => NoteSize::Tall,
        n if n >= WIDE_FROM => NoteSize::Wide,
        _ => NoteSize::Regular,
    }
}

pub fn color_class(color: NoteColor) -> String {
    format!("bg-{color}-200 shadow-md")
}

pub fn rotation_css(rotation: i16) -> String {
    format!("rotate({rotation}deg)")
}

pub fn date_label(at: DateTime<Utc>) -> String {
    at.format(DATE_FORMAT).to_string()
}

/// Footer line: creation date, plus the edit date once the note was touched.
pub fn footer_label(note: &Note) -> String {
    let created = date_label(note.created_at);
    match note.updated_at {
        Some(updated) => format!("{created} (edited: {})", date_label(updated)),
        None => created,
    }
}

/// Case-insensitive substring match on title or content. An empty term
/// matches everything.
pub fn matches_search(note: &Note, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let term = term.to_lowercase();
    note.title.to_lowercase().contains(&term) || note.content.to_lowercase().contains(&term)
}

/// Pinned notes first, newest first within each group.
pub fn board_order(a: &Note, b: &Note) -> Ordering {
    b.pinned
        .cmp(&a.pinned)
        .then_with(|| b.created_at.cmp(&a.created_at))
}

pub fn visible_notes<'a>(notes: &'a [Note], term: &str) -> Vec<&'a Note> {
    let mut visible: Vec<&Note> = notes
        .iter()
        .filter(|note| matches_search(note, term))
        .collect();
    visible.sort_by(|a, b| board_order(a, b));
    visible
}

pub fn empty_message(term: &str) -> &'static str {
    if term.is_empty() {
        "Add your first note!"
    } else {
        "No matching notes found."
    }
}
