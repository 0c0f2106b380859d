use chrono::{DateTime, Utc};
use rand::{Rng, rng};
use serde::{Deserialize, Deserializer, Serialize, de};
use utoipa::ToSchema;

use std::{fmt, str::FromStr};

/// Rotation offsets (degrees) a new note can be stuck on the board with.
pub const ROTATIONS: [i16; 5] = [-2, -1, 0, 1, 2];

/// Stored as the bare color name. Rows written as the full card class
/// (`bg-yellow-200 shadow-md`) are read as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum NoteColor {
    Yellow,
    Pink,
    Blue,
    Green,
    Purple,
    Orange,
}

impl NoteColor {
    pub const ALL: [Self; 6] = [
        Self::Yellow,
        Self::Pink,
        Self::Blue,
        Self::Green,
        Self::Purple,
        Self::Orange,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Yellow => "yellow",
            Self::Pink => "pink",
            Self::Blue => "blue",
            Self::Green => "green",
            Self::Purple => "purple",
            Self::Orange => "orange",
        }
    }

    pub fn random() -> Self {
        Self::ALL[rng().random_range(0..Self::ALL.len())]
    }
}

impl fmt::Display for NoteColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown note color '{0}'")]
pub struct UnknownColor(pub String);

impl FromStr for NoteColor {
    type Err = UnknownColor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s
            .split_whitespace()
            .find_map(|class| class.strip_prefix("bg-")?.strip_suffix("-200"))
            .unwrap_or_else(|| s.trim());

        Self::ALL
            .into_iter()
            .find(|color| color.as_str() == name)
            .ok_or_else(|| UnknownColor(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for NoteColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

pub fn random_rotation() -> i16 {
    ROTATIONS[rng().random_range(0..ROTATIONS.len())]
}

/// A row of the `posts` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub color: NoteColor,
    pub rotation: i16,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pinned: bool,
}

/// Insert payload; id and `created_at` are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewNote {
    pub title: String,
    pub content: String,
    pub color: NoteColor,
    pub rotation: i16,
    pub pinned: bool,
}

impl NewNote {
    /// Unpinned note with a random color and rotation.
    pub fn random(title: String, content: String) -> Self {
        Self {
            title,
            content,
            color: NoteColor::random(),
            rotation: random_rotation(),
            pinned: false,
        }
    }
}

/// Partial update. Absent fields keep their stored value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pinned: Option<bool>,
    pub updated_at: DateTime<Utc>,
}

impl NotePatch {
    pub fn text(title: String, content: String) -> Self {
        Self {
            title: Some(title),
            content: Some(content),
            pinned: None,
            updated_at: Utc::now(),
        }
    }

    pub fn pin(pinned: bool) -> Self {
        Self {
            title: None,
            content: None,
            pinned: Some(pinned),
            updated_at: Utc::now(),
        }
    }

    pub fn apply(&self, note: &mut Note) {
        if let Some(title) = &self.title {
            note.title.clone_from(title);
        }
        if let Some(content) = &self.content {
            note.content.clone_from(content);
        }
        if let Some(pinned) = self.pinned {
            note.pinned = pinned;
        }
        note.updated_at = Some(self.updated_at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_round_trips_through_str() {
        for color in NoteColor::ALL {
            assert_eq!(color.as_str().parse::<NoteColor>().unwrap(), color);
        }
        assert!("magenta".parse::<NoteColor>().is_err());
    }

    #[test]
    fn color_accepts_card_class() {
        assert_eq!(
            "bg-yellow-200 shadow-md".parse::<NoteColor>().unwrap(),
            NoteColor::Yellow
        );
        assert_eq!(
            "shadow-md bg-purple-200".parse::<NoteColor>().unwrap(),
            NoteColor::Purple
        );
        assert!("bg-magenta-200 shadow-md".parse::<NoteColor>().is_err());
    }

    #[test]
    fn note_decodes_row_with_card_class_color() {
        let row = serde_json::json!({
            "id": 3,
            "title": "legacy",
            "content": "written by the old board",
            "color": "bg-yellow-200 shadow-md",
            "rotation": 2,
            "created_at": "2024-03-01T10:00:00+00:00",
            "pinned": false
        });

        let note: Note = serde_json::from_value(row).unwrap();
        assert_eq!(note.color, NoteColor::Yellow);
        assert_eq!(
            serde_json::to_value(note.color).unwrap(),
            serde_json::json!("yellow")
        );
    }

    #[test]
    fn random_note_is_unpinned_with_allowed_rotation() {
        for _ in 0..50 {
            let note = NewNote::random("t".into(), "c".into());
            assert!(!note.pinned);
            assert!(ROTATIONS.contains(&note.rotation));
        }
    }

    #[test]
    fn patch_keeps_created_at_and_sets_updated_at() {
        let created = Utc::now();
        let mut note = Note {
            id: 1,
            title: "old".into(),
            content: "body".into(),
            color: NoteColor::Blue,
            rotation: 0,
            created_at: created,
            updated_at: None,
            pinned: false,
        };

        let patch = NotePatch::pin(true);
        patch.apply(&mut note);

        assert!(note.pinned);
        assert_eq!(note.title, "old");
        assert_eq!(note.created_at, created);
        assert_eq!(note.updated_at, Some(patch.updated_at));
    }

    #[test]
    fn note_decodes_from_table_row_json() {
        let row = serde_json::json!({
            "id": 7,
            "title": "groceries",
            "content": "milk",
            "color": "pink",
            "rotation": -1,
            "created_at": "2024-03-01T10:00:00+00:00",
            "updated_at": null,
            "pinned": true
        });

        let note: Note = serde_json::from_value(row).unwrap();
        assert_eq!(note.id, 7);
        assert_eq!(note.color, NoteColor::Pink);
        assert_eq!(note.rotation, -1);
        assert!(note.pinned);
        assert!(note.updated_at.is_none());
    }
}
