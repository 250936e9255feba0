use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        FromRequest, Multipart, Path, Request, State,
    },
    http::header,
    response::Response,
    Json,
};
use futures_util::{SinkExt, StreamExt};
use sqlx::{Pool, Postgres};
use tokio::sync::broadcast;
use uuid::Uuid;

use shared_types::{
    AppError, Case, ChatMessageResponse, SendMessageRequest, UnreadCountResponse, User,
};

use crate::auth::extractors::AuthRequired;
use crate::auth::jwt::Claims;
use crate::db::AppState;
use crate::events::{CaseEvent, CaseEventHub};
use crate::repo;
use crate::rest::current_user;
use crate::storage;

/// Request body cap for JSON chat messages.
const MAX_JSON_BODY: usize = 64 * 1024;

/// Load the case and require the caller to be a party on it (or admin).
async fn case_for_party(
    pool: &Pool<Postgres>,
    claims: &Claims,
    case_id: Uuid,
) -> Result<(Case, User), AppError> {
    let user = current_user(pool, claims).await?;

    let case = repo::case::find_by_id(pool, case_id)
        .await?
        .ok_or_else(|| AppError::not_found("Case not found"))?;

    match user.role.as_str() {
        "client" if case.client_id != user.id => Err(AppError::forbidden("Access denied")),
        "lawyer" if case.lawyer_id != Some(user.id) => Err(AppError::forbidden("Access denied")),
        _ => Ok((case, user)),
    }
}

/// GET /chat/{case_id}/messages — full history, chronological.
#[utoipa::path(
    get,
    path = "/chat/{case_id}/messages",
    params(("case_id" = Uuid, Path, description = "Case id")),
    responses(
        (status = 200, description = "Messages", body = Vec<ChatMessageResponse>),
        (status = 403, description = "Not a party on this case", body = AppError),
        (status = 404, description = "Case not found", body = AppError)
    ),
    tag = "chat"
)]
pub async fn list_messages(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(claims): AuthRequired,
    Path(case_id): Path<Uuid>,
) -> Result<Json<Vec<ChatMessageResponse>>, AppError> {
    let (case, user) = case_for_party(&pool, &claims, case_id).await?;

    let rows = repo::chat::list_rows_by_case(&pool, case.id).await?;
    Ok(Json(
        rows.into_iter()
            .map(|row| ChatMessageResponse::from_row(row, user.id))
            .collect(),
    ))
}

/// POST /chat/{case_id}/send — accepts JSON `{message}` or multipart
/// form data with `message` and/or a single `file` field.
///
/// The chat row and the other party's notification commit together;
/// the live event goes out afterwards, best-effort.
#[utoipa::path(
    post,
    path = "/chat/{case_id}/send",
    params(("case_id" = Uuid, Path, description = "Case id")),
    request_body = SendMessageRequest,
    responses(
        (status = 200, description = "Persisted message", body = ChatMessageResponse),
        (status = 400, description = "Message or file required", body = AppError),
        (status = 403, description = "Not a party on this case", body = AppError),
        (status = 404, description = "Case not found", body = AppError)
    ),
    tag = "chat"
)]
pub async fn send_message(
    State(state): State<AppState>,
    AuthRequired(claims): AuthRequired,
    Path(case_id): Path<Uuid>,
    req: Request,
) -> Result<Json<serde_json::Value>, AppError> {
    let pool = &state.pool;
    let (case, user) = case_for_party(pool, &claims, case_id).await?;

    let is_multipart = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("multipart/form-data"))
        .unwrap_or(false);

    let mut message_text: Option<String> = None;
    let mut file: Option<(String, Vec<u8>)> = None;

    if is_multipart {
        let mut multipart = Multipart::from_request(req, &())
            .await
            .map_err(|e| AppError::bad_request(format!("Invalid multipart body: {e}")))?;
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::bad_request(format!("Invalid multipart field: {e}")))?
        {
            match field.name() {
                Some("message") => {
                    let text = field
                        .text()
                        .await
                        .map_err(|e| AppError::bad_request(format!("Invalid message field: {e}")))?;
                    if !text.is_empty() {
                        message_text = Some(text);
                    }
                }
                Some("file") => {
                    let filename = field.file_name().unwrap_or("attachment").to_string();
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::bad_request(format!("Invalid file field: {e}")))?;
                    file = Some((filename, bytes.to_vec()));
                }
                _ => {}
            }
        }
    } else {
        let bytes = axum::body::to_bytes(req.into_body(), MAX_JSON_BODY)
            .await
            .map_err(|e| AppError::bad_request(format!("Invalid body: {e}")))?;
        if !bytes.is_empty() {
            let body: SendMessageRequest = serde_json::from_slice(&bytes)
                .map_err(|e| AppError::bad_request(format!("Invalid JSON body: {e}")))?;
            message_text = body.message.filter(|m| !m.is_empty());
        }
    }

    if message_text.is_none() && file.is_none() {
        return Err(AppError::bad_request("Message or file required"));
    }

    let attachment = match file {
        Some((filename, bytes)) => {
            let stored_name = format!(
                "chat_{}_{}_{}",
                case.id,
                chrono::Utc::now().timestamp(),
                storage::sanitize_filename(&filename)
            );
            Some(storage::store_upload(&stored_name, &bytes).await?)
        }
        None => None,
    };

    let chat = repo::chat::send(
        pool,
        &case,
        &user,
        message_text.as_deref().unwrap_or(""),
        attachment,
    )
    .await?;

    let response = ChatMessageResponse::from_chat(chat, user.full_name(), user.id);

    // Best-effort fan-out to live subscribers; failure never fails the send.
    state
        .events
        .publish(case.id, CaseEvent::NewChatMessage(response.clone()));

    Ok(Json(serde_json::json!({
        "success": true,
        "message": response,
    })))
}

/// POST /chat/{case_id}/read — flip unread incoming messages to read.
#[utoipa::path(
    post,
    path = "/chat/{case_id}/read",
    params(("case_id" = Uuid, Path, description = "Case id")),
    responses(
        (status = 200, description = "Count of messages marked read"),
        (status = 403, description = "Not a party on this case", body = AppError)
    ),
    tag = "chat"
)]
pub async fn mark_read(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(claims): AuthRequired,
    Path(case_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let (case, user) = case_for_party(&pool, &claims, case_id).await?;
    let count = repo::chat::mark_read(&pool, case.id, user.id).await?;
    Ok(Json(serde_json::json!({ "count": count })))
}

/// GET /chat/{case_id}/unread-count — incoming messages not yet read.
#[utoipa::path(
    get,
    path = "/chat/{case_id}/unread-count",
    params(("case_id" = Uuid, Path, description = "Case id")),
    responses(
        (status = 200, description = "Unread count", body = UnreadCountResponse),
        (status = 403, description = "Not a party on this case", body = AppError)
    ),
    tag = "chat"
)]
pub async fn unread_count(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(claims): AuthRequired,
    Path(case_id): Path<Uuid>,
) -> Result<Json<UnreadCountResponse>, AppError> {
    let (case, user) = case_for_party(&pool, &claims, case_id).await?;
    let count = repo::chat::unread_count(&pool, case.id, user.id).await?;
    Ok(Json(UnreadCountResponse { count }))
}

/// GET /chat/{case_id}/ws — live room for the case.
///
/// The server forwards `new_chat_message` and `typing` events to every
/// subscriber; a client text frame `{"type":"typing"}` re-broadcasts a
/// typing indicator. Delivery is best-effort.
pub async fn case_ws(
    State(state): State<AppState>,
    AuthRequired(claims): AuthRequired,
    Path(case_id): Path<Uuid>,
    ws: WebSocketUpgrade,
) -> Result<Response, AppError> {
    let (case, user) = case_for_party(&state.pool, &claims, case_id).await?;

    let hub = state.events.clone();
    let rx = hub.subscribe(case.id);
    let user_id = user.id;
    let user_name = user.full_name();

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, hub, rx, case_id, user_id, user_name)))
}

async fn handle_socket(
    socket: WebSocket,
    hub: CaseEventHub,
    mut rx: broadcast::Receiver<CaseEvent>,
    case_id: Uuid,
    user_id: Uuid,
    user_name: String,
) {
    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Ok(event) => {
                    let Ok(payload) = serde_json::to_string(&event) else { continue };
                    if sink.send(Message::Text(payload.into())).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(case_id = %case_id, skipped, "ws subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    if let Ok(value) = serde_json::from_str::<serde_json::Value>(&text) {
                        if value.get("type").and_then(|t| t.as_str()) == Some("typing") {
                            hub.publish(
                                case_id,
                                CaseEvent::Typing {
                                    user_id,
                                    user_name: user_name.clone(),
                                },
                            );
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(_)) => break,
            },
        }
    }
}
