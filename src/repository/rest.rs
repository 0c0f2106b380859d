use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};

use std::time::Duration;

use super::{NoteStore, StoreError, TABLE};
use crate::models::{NewNote, Note, NotePatch};

/// Client for the hosted table, spoken to through its PostgREST API.
pub struct RestStore {
    http: Client,
    table_url: String,
    api_key: String,
}

impl RestStore {
    pub fn new(base_url: &str, api_key: String, timeout: Duration) -> Result<Self, StoreError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            table_url: format!("{}/rest/v1/{TABLE}", base_url.trim_end_matches('/')),
            api_key,
        })
    }

    fn request(&self, method: Method) -> RequestBuilder {
        self.http
            .request(method, &self.table_url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    fn returning(&self, method: Method) -> RequestBuilder {
        self.request(method).header("Prefer", "return=representation")
    }
}

async fn check(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    // PostgREST errors carry a human readable `message`
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or(body);

    Err(StoreError::Status {
        status: status.as_u16(),
        message,
    })
}

async fn rows(response: Response) -> Result<Vec<Note>, StoreError> {
    Ok(check(response).await?.json::<Vec<Note>>().await?)
}

fn id_filter(id: i64) -> [(&'static str, String); 1] {
    [("id", format!("eq.{id}"))]
}

#[async_trait]
impl NoteStore for RestStore {
    async fn list_notes(&self) -> Result<Vec<Note>, StoreError> {
        let response = self
            .request(Method::GET)
            .query(&[("select", "*"), ("order", "created_at.desc")])
            .send()
            .await?;

        rows(response).await
    }

    async fn insert_note(&self, note: NewNote) -> Result<Note, StoreError> {
        let response = self.returning(Method::POST).json(&note).send().await?;

        rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or(StoreError::MissingRow)
    }

    async fn update_note(&self, id: i64, patch: NotePatch) -> Result<Option<Note>, StoreError> {
        let response = self
            .returning(Method::PATCH)
            .query(&id_filter(id))
            .json(&patch)
            .send()
            .await?;

        Ok(rows(response).await?.into_iter().next())
    }

    async fn delete_note(&self, id: i64) -> Result<bool, StoreError> {
        let response = self
            .returning(Method::DELETE)
            .query(&id_filter(id))
            .send()
            .await?;

        // Only the count matters, the row is already gone
        let removed = check(response)
            .await?
            .json::<Vec<serde_json::Value>>()
            .await?;
        Ok(removed.len() == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::{
        Json, Router,
        extract::{Query, State},
        http::{HeaderMap, StatusCode},
        response::{IntoResponse, Response},
        routing::get,
    };
    use chrono::Utc;
    use serde_json::{Value, json};
    use tokio::sync::Mutex;

    use std::{collections::HashMap, sync::Arc};

    use crate::models::NoteColor;

    const KEY: &str = "anon-key";

    /// In-process stand-in for the hosted table.
    #[derive(Default)]
    struct FakeTable {
        rows: Vec<Value>,
        next_id: i64,
        seen_queries: Vec<HashMap<String, String>>,
        fail_with: Option<StatusCode>,
    }

    type Shared = Arc<Mutex<FakeTable>>;

    fn authorized(headers: &HeaderMap) -> bool {
        headers.get("apikey").and_then(|v| v.to_str().ok()) == Some(KEY)
            && headers.get("authorization").and_then(|v| v.to_str().ok())
                == Some(format!("Bearer {KEY}").as_str())
    }

    fn target_id(query: &HashMap<String, String>) -> Option<i64> {
        query.get("id")?.strip_prefix("eq.")?.parse().ok()
    }

    async fn guard(table: &Shared, headers: &HeaderMap) -> Option<Response> {
        if !authorized(headers) {
            let body = Json(json!({"message": "bad key"}));
            return Some((StatusCode::UNAUTHORIZED, body).into_response());
        }
        table
            .lock()
            .await
            .fail_with
            .map(|status| {
                let body = Json(json!({"message": "table is on fire"}));
                (status, body).into_response()
            })
    }

    async fn select(
        State(table): State<Shared>,
        headers: HeaderMap,
        Query(query): Query<HashMap<String, String>>,
    ) -> Response {
        if let Some(rejection) = guard(&table, &headers).await {
            return rejection;
        }
        let mut table = table.lock().await;
        table.seen_queries.push(query);
        let mut rows = table.rows.clone();
        rows.reverse();
        Json(rows).into_response()
    }

    async fn insert(
        State(table): State<Shared>,
        headers: HeaderMap,
        Json(mut row): Json<Value>,
    ) -> Response {
        if let Some(rejection) = guard(&table, &headers).await {
            return rejection;
        }
        assert_eq!(headers.get("prefer").unwrap(), "return=representation");
        let mut table = table.lock().await;
        table.next_id += 1;
        row["id"] = json!(table.next_id);
        row["created_at"] = json!(Utc::now());
        row["updated_at"] = Value::Null;
        table.rows.push(row.clone());
        (StatusCode::CREATED, Json(vec![row])).into_response()
    }

    async fn patch(
        State(table): State<Shared>,
        headers: HeaderMap,
        Query(query): Query<HashMap<String, String>>,
        Json(changes): Json<Value>,
    ) -> Response {
        if let Some(rejection) = guard(&table, &headers).await {
            return rejection;
        }
        let id = target_id(&query);
        let mut table = table.lock().await;
        let mut updated = Vec::new();
        for row in &mut table.rows {
            if Some(row["id"].as_i64().unwrap()) == id {
                for (k, v) in changes.as_object().unwrap() {
                    row[k] = v.clone();
                }
                updated.push(row.clone());
            }
        }
        Json(updated).into_response()
    }

    async fn remove(
        State(table): State<Shared>,
        headers: HeaderMap,
        Query(query): Query<HashMap<String, String>>,
    ) -> Response {
        if let Some(rejection) = guard(&table, &headers).await {
            return rejection;
        }
        let id = target_id(&query);
        let mut table = table.lock().await;
        let (gone, kept): (Vec<Value>, Vec<Value>) = table
            .rows
            .drain(..)
            .partition(|row| Some(row["id"].as_i64().unwrap()) == id);
        table.rows = kept;
        Json(gone).into_response()
    }

    async fn serve_fake() -> (String, Shared) {
        let table = Shared::default();
        let router = Router::new()
            .route(
                "/rest/v1/posts",
                get(select).post(insert).patch(patch).delete(remove),
            )
            .with_state(table.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        (format!("http://{addr}/"), table)
    }

    fn store(url: &str, key: &str) -> RestStore {
        RestStore::new(url, key.to_string(), Duration::from_secs(5)).unwrap()
    }

    fn new_note(title: &str) -> NewNote {
        NewNote {
            title: title.into(),
            content: "content".into(),
            color: NoteColor::Green,
            rotation: 1,
            pinned: false,
        }
    }

    #[tokio::test]
    async fn insert_returns_server_row() {
        let (url, _table) = serve_fake().await;
        let store = store(&url, KEY);

        let note = store.insert_note(new_note("first")).await.unwrap();
        assert_eq!(note.id, 1);
        assert_eq!(note.title, "first");
        assert_eq!(note.color, NoteColor::Green);
        assert!(note.updated_at.is_none());
    }

    #[tokio::test]
    async fn list_asks_for_newest_first() {
        let (url, table) = serve_fake().await;
        let store = store(&url, KEY);
        store.insert_note(new_note("a")).await.unwrap();
        store.insert_note(new_note("b")).await.unwrap();

        let notes = store.list_notes().await.unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].title, "b");

        let table = table.lock().await;
        let query = table.seen_queries.last().unwrap();
        assert_eq!(query.get("select").map(String::as_str), Some("*"));
        assert_eq!(query.get("order").map(String::as_str), Some("created_at.desc"));
    }

    #[tokio::test]
    async fn update_filters_by_id() {
        let (url, _table) = serve_fake().await;
        let store = store(&url, KEY);
        let first = store.insert_note(new_note("a")).await.unwrap();
        store.insert_note(new_note("b")).await.unwrap();

        let updated = store
            .update_note(first.id, NotePatch::pin(true))
            .await
            .unwrap()
            .unwrap();
        assert!(updated.pinned);
        assert!(updated.updated_at.is_some());
        assert_eq!(updated.title, "a");

        let missing = store.update_note(99, NotePatch::pin(true)).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn delete_removes_exactly_one_row() {
        let (url, table) = serve_fake().await;
        let store = store(&url, KEY);
        let first = store.insert_note(new_note("a")).await.unwrap();
        store.insert_note(new_note("b")).await.unwrap();

        assert!(store.delete_note(first.id).await.unwrap());
        assert!(!store.delete_note(first.id).await.unwrap());
        assert_eq!(table.lock().await.rows.len(), 1);
    }

    #[tokio::test]
    async fn reads_and_deletes_rows_with_card_class_colors() {
        let (url, table) = serve_fake().await;
        table.lock().await.rows.push(json!({
            "id": 41,
            "title": "from the old board",
            "content": "",
            "color": "bg-orange-200 shadow-md",
            "rotation": -2,
            "created_at": "2024-01-05T09:30:00Z",
            "updated_at": null,
            "pinned": false
        }));
        let store = store(&url, KEY);

        let notes = store.list_notes().await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].color, NoteColor::Orange);

        assert!(store.delete_note(41).await.unwrap());
        assert!(table.lock().await.rows.is_empty());
    }

    #[tokio::test]
    async fn error_status_carries_server_message() {
        let (url, table) = serve_fake().await;
        table.lock().await.fail_with = Some(StatusCode::SERVICE_UNAVAILABLE);
        let store = store(&url, KEY);

        let err = store.list_notes().await.unwrap_err();
        assert!(matches!(err, StoreError::Status { status: 503, .. }));
        assert_eq!(err.to_string(), "note store responded with 503: table is on fire");
    }

    #[tokio::test]
    async fn wrong_key_is_rejected() {
        let (url, _table) = serve_fake().await;
        let store = store(&url, "stolen");

        let err = store.list_notes().await.unwrap_err();
        assert!(matches!(err, StoreError::Status { status: 401, .. }));
    }
}
