mod embedded {
    refinery::embed_migrations!("migrations");
}

use async_trait::async_trait;
use tokio_postgres::{Client, NoTls, Row};

use super::{NoteStore, StoreError, TABLE};
use crate::models::{NewNote, Note, NoteColor, NotePatch};

const COLUMNS: &str = "id, title, content, color, rotation, created_at, updated_at, pinned";

/// Direct connection to the database behind the hosted table.
pub struct PostgresStore {
    client: Client,
}

impl PostgresStore {
    pub async fn connect(database_dsn: &str) -> Result<Self, StoreError> {
        let (client, con) = tokio_postgres::connect(database_dsn, NoTls).await?;

        tokio::spawn(async move {
            if let Err(e) = con.await {
                tracing::error!("connection error: {}", e);
            }
        });

        Ok(Self { client })
    }

    pub async fn migrate(&mut self) -> Result<(), refinery::Error> {
        let migrations_report = embedded::migrations::runner()
            .run_async(&mut self.client)
            .await?;

        for migration in migrations_report.applied_migrations() {
            tracing::info!(
                "Migration Applied -  Name: {}, Version: {}",
                migration.name(),
                migration.version()
            );
        }

        tracing::info!("DB migrations finished!");

        Ok(())
    }
}

fn parse_color(raw: &str) -> Result<NoteColor, StoreError> {
    raw.parse()
        .map_err(|e: crate::models::UnknownColor| StoreError::Decode(e.to_string()))
}

fn note_from_row(row: &Row) -> Result<Note, StoreError> {
    let color: String = row.try_get("color")?;

    Ok(Note {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        color: parse_color(&color)?,
        rotation: row.try_get("rotation")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        pinned: row.try_get("pinned")?,
    })
}

#[async_trait]
impl NoteStore for PostgresStore {
    async fn list_notes(&self) -> Result<Vec<Note>, StoreError> {
        let rows = self
            .client
            .query(
                format!("SELECT {COLUMNS} FROM {TABLE} ORDER BY created_at DESC").as_str(),
                &[],
            )
            .await?;

        rows.iter().map(note_from_row).collect()
    }

    async fn insert_note(&self, note: NewNote) -> Result<Note, StoreError> {
        let row = self
            .client
            .query_one(
                format!(
                    "INSERT INTO {TABLE} (title, content, color, rotation, pinned) \
                     VALUES ($1, $2, $3, $4, $5) RETURNING {COLUMNS}"
                )
                .as_str(),
                &[
                    &note.title,
                    &note.content,
                    &note.color.as_str(),
                    &note.rotation,
                    &note.pinned,
                ],
            )
            .await?;

        note_from_row(&row)
    }

    async fn update_note(&self, id: i64, patch: NotePatch) -> Result<Option<Note>, StoreError> {
        let row = self
            .client
            .query_opt(
                format!(
                    "UPDATE {TABLE} SET \
                     title = COALESCE($1, title), \
                     content = COALESCE($2, content), \
                     pinned = COALESCE($3, pinned), \
                     updated_at = $4 \
                     WHERE id = $5 RETURNING {COLUMNS}"
                )
                .as_str(),
                &[
                    &patch.title,
                    &patch.content,
                    &patch.pinned,
                    &patch.updated_at,
                    &id,
                ],
            )
            .await?;

        row.as_ref().map(note_from_row).transpose()
    }

    async fn delete_note(&self, id: i64) -> Result<bool, StoreError> {
        let rows = self
            .client
            .execute(format!("DELETE FROM {TABLE} WHERE id = $1").as_str(), &[&id])
            .await?;

        Ok(rows == 1)
    }
}
