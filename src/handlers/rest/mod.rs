use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use axum_macros::debug_handler;
use utoipa::OpenApi;

use crate::{
    dto::{
        BoardQuery, BoardResponse, CreateNoteRequest, DraftRequest, EditorKind, EditorResponse,
        NoteCard, NoteResponse, OpenEditorRequest, SearchRequest, UpdateNoteRequest,
    },
    layout::NoteSize,
    models::NoteColor,
    service::{Board, BoardError, SharedBoard},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        get_all_notes,
        create_note,
        update_note,
        toggle_pin,
        delete_note,
        get_board,
        set_search,
        reload_board,
        dismiss_error,
        open_editor,
        set_draft,
        submit_editor,
        close_editor,
        request_delete,
        confirm_delete,
        cancel_delete
    ),
    components(schemas(
        NoteResponse,
        NoteCard,
        NoteColor,
        NoteSize,
        BoardResponse,
        EditorResponse,
        EditorKind,
        CreateNoteRequest,
        UpdateNoteRequest,
        DraftRequest,
        SearchRequest,
        OpenEditorRequest
    )),
    tags(
        (name = "notes", description = "Sticky notes"),
        (name = "board", description = "Board view and interaction state")
    )
)]
pub struct ApiDoc;

pub fn router(board: SharedBoard) -> Router {
    Router::new()
        .route("/notes", get(get_all_notes).post(create_note))
        .route("/notes/{id}", put(update_note).delete(delete_note))
        .route("/notes/{id}/pin", post(toggle_pin))
        .route("/board", get(get_board))
        .route("/board/search", put(set_search))
        .route("/board/reload", post(reload_board))
        .route("/board/error", delete(dismiss_error))
        .route(
            "/board/editor",
            post(open_editor).put(set_draft).delete(close_editor),
        )
        .route("/board/editor/submit", post(submit_editor))
        .route("/board/delete", delete(cancel_delete))
        .route("/board/delete/confirm", post(confirm_delete))
        .route("/board/delete/{id}", post(request_delete))
        .with_state(board)
}

fn error_response(e: &BoardError) -> Response {
    let status = match e {
        BoardError::Store(_) => StatusCode::BAD_GATEWAY,
        BoardError::NotFound(_) => StatusCode::NOT_FOUND,
        BoardError::BlankNote | BoardError::NothingToConfirm | BoardError::EditorClosed => {
            StatusCode::BAD_REQUEST
        }
    };
    (status, e.to_string()).into_response()
}

fn board_view(board: &Board) -> Response {
    (StatusCode::OK, Json(BoardResponse::render(board, None))).into_response()
}

#[utoipa::path(
    get,
    path = "/notes",
    responses(
        (status = 200, description = "All loaded notes, newest first", body = Vec<NoteResponse>)
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn get_all_notes(State(board): State<SharedBoard>) -> Response {
    let board = board.lock().await;
    let notes: Vec<NoteResponse> = board.notes().iter().map(NoteResponse::from).collect();
    (StatusCode::OK, Json(notes)).into_response()
}

#[utoipa::path(
    post,
    path = "/notes",
    request_body = CreateNoteRequest,
    responses(
        (status = 201, description = "Note created successfully", body = NoteResponse),
        (status = 204, description = "Title and content were blank, nothing created"),
        (status = 502, description = "Note store failed")
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn create_note(
    State(board): State<SharedBoard>,
    Json(payload): Json<CreateNoteRequest>,
) -> Response {
    match board
        .lock()
        .await
        .create(&payload.title, &payload.content)
        .await
    {
        Ok(Some(note)) => (StatusCode::CREATED, Json(NoteResponse::from(&note))).into_response(),
        Ok(None) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(&e),
    }
}

#[utoipa::path(
    put,
    path = "/notes/{id}",
    params(
        ("id" = i64, Path, description = "Note ID")
    ),
    request_body = UpdateNoteRequest,
    responses(
        (status = 200, description = "Note updated successfully", body = NoteResponse),
        (status = 400, description = "Title and content were both blank"),
        (status = 404, description = "Note not found"),
        (status = 502, description = "Note store failed")
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn update_note(
    State(board): State<SharedBoard>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateNoteRequest>,
) -> Response {
    match board
        .lock()
        .await
        .update(id, &payload.title, &payload.content)
        .await
    {
        Ok(note) => (StatusCode::OK, Json(NoteResponse::from(&note))).into_response(),
        Err(e) => error_response(&e),
    }
}

#[utoipa::path(
    post,
    path = "/notes/{id}/pin",
    params(
        ("id" = i64, Path, description = "Note ID")
    ),
    responses(
        (status = 200, description = "Pin flag flipped", body = NoteResponse),
        (status = 404, description = "Note not found"),
        (status = 502, description = "Note store failed")
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn toggle_pin(State(board): State<SharedBoard>, Path(id): Path<i64>) -> Response {
    match board.lock().await.toggle_pin(id).await {
        Ok(note) => (StatusCode::OK, Json(NoteResponse::from(&note))).into_response(),
        Err(e) => error_response(&e),
    }
}

#[utoipa::path(
    delete,
    path = "/notes/{id}",
    params(
        ("id" = i64, Path, description = "Note ID")
    ),
    responses(
        (status = 204, description = "Note deleted successfully"),
        (status = 404, description = "Note not found"),
        (status = 502, description = "Note store failed")
    ),
    tag = "notes"
)]
#[debug_handler]
pub async fn delete_note(State(board): State<SharedBoard>, Path(id): Path<i64>) -> Response {
    match board.lock().await.delete(id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(&e),
    }
}

#[utoipa::path(
    get,
    path = "/board",
    params(BoardQuery),
    responses(
        (status = 200, description = "Current board view", body = BoardResponse)
    ),
    tag = "board"
)]
#[debug_handler]
pub async fn get_board(
    State(board): State<SharedBoard>,
    Query(query): Query<BoardQuery>,
) -> Response {
    let board = board.lock().await;
    let view = BoardResponse::render(&board, query.search.as_deref());
    (StatusCode::OK, Json(view)).into_response()
}

#[utoipa::path(
    put,
    path = "/board/search",
    request_body = SearchRequest,
    responses(
        (status = 200, description = "Search term stored", body = BoardResponse)
    ),
    tag = "board"
)]
#[debug_handler]
pub async fn set_search(
    State(board): State<SharedBoard>,
    Json(payload): Json<SearchRequest>,
) -> Response {
    let mut board = board.lock().await;
    board.set_search(payload.term);
    board_view(&board)
}

#[utoipa::path(
    post,
    path = "/board/reload",
    responses(
        (status = 200, description = "Notes reloaded from the store", body = BoardResponse),
        (status = 502, description = "Note store failed")
    ),
    tag = "board"
)]
#[debug_handler]
pub async fn reload_board(State(board): State<SharedBoard>) -> Response {
    match Board::load_shared(&board).await {
        Ok(()) => board_view(&*board.lock().await),
        Err(e) => error_response(&e),
    }
}

#[utoipa::path(
    delete,
    path = "/board/error",
    responses(
        (status = 200, description = "Error banner cleared", body = BoardResponse)
    ),
    tag = "board"
)]
#[debug_handler]
pub async fn dismiss_error(State(board): State<SharedBoard>) -> Response {
    let mut board = board.lock().await;
    board.dismiss_error();
    board_view(&board)
}

#[utoipa::path(
    post,
    path = "/board/editor",
    request_body = OpenEditorRequest,
    responses(
        (status = 200, description = "Editor opened", body = BoardResponse),
        (status = 404, description = "Note not found")
    ),
    tag = "board"
)]
#[debug_handler]
pub async fn open_editor(
    State(board): State<SharedBoard>,
    Json(payload): Json<OpenEditorRequest>,
) -> Response {
    let mut board = board.lock().await;
    match payload.id {
        Some(id) => {
            if let Err(e) = board.start_editing(id) {
                return error_response(&e);
            }
        }
        None => board.open_new(),
    }
    board_view(&board)
}

#[utoipa::path(
    put,
    path = "/board/editor",
    request_body = DraftRequest,
    responses(
        (status = 200, description = "Draft stored", body = BoardResponse),
        (status = 400, description = "Editor is not open")
    ),
    tag = "board"
)]
#[debug_handler]
pub async fn set_draft(
    State(board): State<SharedBoard>,
    Json(payload): Json<DraftRequest>,
) -> Response {
    let mut board = board.lock().await;
    match board.set_draft(payload.title, payload.content) {
        Ok(()) => board_view(&board),
        Err(e) => error_response(&e),
    }
}

#[utoipa::path(
    post,
    path = "/board/editor/submit",
    responses(
        (status = 200, description = "Draft saved and editor closed", body = BoardResponse),
        (status = 400, description = "Editor is not open or the edit was blank"),
        (status = 404, description = "Edited note no longer exists"),
        (status = 502, description = "Note store failed")
    ),
    tag = "board"
)]
#[debug_handler]
pub async fn submit_editor(State(board): State<SharedBoard>) -> Response {
    let mut board = board.lock().await;
    match board.submit_editor().await {
        Ok(_) => board_view(&board),
        Err(e) => error_response(&e),
    }
}

#[utoipa::path(
    delete,
    path = "/board/editor",
    responses(
        (status = 200, description = "Editor closed, draft discarded", body = BoardResponse)
    ),
    tag = "board"
)]
#[debug_handler]
pub async fn close_editor(State(board): State<SharedBoard>) -> Response {
    let mut board = board.lock().await;
    board.close_editor();
    board_view(&board)
}

#[utoipa::path(
    post,
    path = "/board/delete/{id}",
    params(
        ("id" = i64, Path, description = "Note ID")
    ),
    responses(
        (status = 200, description = "Delete awaits confirmation", body = BoardResponse),
        (status = 404, description = "Note not found")
    ),
    tag = "board"
)]
#[debug_handler]
pub async fn request_delete(State(board): State<SharedBoard>, Path(id): Path<i64>) -> Response {
    let mut board = board.lock().await;
    match board.request_delete(id) {
        Ok(()) => board_view(&board),
        Err(e) => error_response(&e),
    }
}

#[utoipa::path(
    post,
    path = "/board/delete/confirm",
    responses(
        (status = 200, description = "Pending note deleted", body = BoardResponse),
        (status = 400, description = "No delete awaits confirmation"),
        (status = 404, description = "Note not found"),
        (status = 502, description = "Note store failed")
    ),
    tag = "board"
)]
#[debug_handler]
pub async fn confirm_delete(State(board): State<SharedBoard>) -> Response {
    let mut board = board.lock().await;
    match board.confirm_delete().await {
        Ok(_) => board_view(&board),
        Err(e) => error_response(&e),
    }
}

#[utoipa::path(
    delete,
    path = "/board/delete",
    responses(
        (status = 200, description = "Pending delete cancelled", body = BoardResponse)
    ),
    tag = "board"
)]
#[debug_handler]
pub async fn cancel_delete(State(board): State<SharedBoard>) -> Response {
    let mut board = board.lock().await;
    board.cancel_delete();
    board_view(&board)
}
