use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{HeaderMap, StatusCode},
    Json,
};
use lobby_room::{MessageKind, RoomError};

use crate::{
    routes::models::{MessageResponse, MessagesQuery, PostMessageRequest},
    util::{required_string, user_from_headers},
    ApiError, AppState,
};

#[utoipa::path(
    get,
    path = "/messages",
    tag = "Messages",
    params(
        ("user" = Option<String>, Header, description = "Reader; private messages need it"),
        MessagesQuery
    ),
    responses(
        (
            status = 200,
            description = "Messages visible to the reader, oldest first",
            body = [MessageResponse]
        ),
        (status = 422, description = "Invalid limit", body = crate::error::ErrorResponse)
    )
)]
pub async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<MessagesQuery>, QueryRejection>,
) -> Result<Json<Vec<MessageResponse>>, ApiError> {
    let Query(query) = query.map_err(|_| {
        ApiError::validation(vec!["limit must be a non-negative integer".to_string()])
    })?;
    let user = user_from_headers(&headers);

    let messages = state
        .room()
        .messages_for(user.as_deref(), query.limit)
        .await?;
    Ok(Json(messages.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/messages",
    tag = "Messages",
    params(("user" = String, Header, description = "Sender")),
    request_body = PostMessageRequest,
    responses(
        (status = 201, description = "Message appended", body = MessageResponse),
        (
            status = 422,
            description = "Invalid body or unknown sender",
            body = crate::error::ErrorResponse
        )
    )
)]
pub async fn create(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<PostMessageRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let Json(request) =
        body.map_err(|rejection| ApiError::validation(vec![rejection.body_text()]))?;

    let mut errors = Vec::new();
    let to = required_string(request.to, "to", &mut errors);
    let text = required_string(request.text, "text", &mut errors);
    let kind = required_string(request.kind, "type", &mut errors).and_then(|kind| {
        match kind.as_str() {
            "message" => Some(MessageKind::Normal),
            "private_message" => Some(MessageKind::Private),
            _ => {
                errors.push("type must be one of: message, private_message".to_string());
                None
            }
        }
    });

    let (Some(to), Some(text), Some(kind)) = (to, text, kind) else {
        return Err(ApiError::validation(errors));
    };

    let from = user_from_headers(&headers)
        .ok_or_else(|| ApiError::unprocessable("Missing user header"))?;

    let message = state
        .room()
        .post_message(&from, &to, &text, kind)
        .await
        .map_err(|error| match error {
            RoomError::Unauthorized { .. } => ApiError::unprocessable(error.to_string()),
            other => other.into(),
        })?;

    Ok((StatusCode::CREATED, Json(message.into())))
}

#[utoipa::path(
    delete,
    path = "/messages/{id}",
    tag = "Messages",
    params(
        ("id" = i64, Path, description = "Message id"),
        ("user" = String, Header, description = "Registered participant deleting the message")
    ),
    responses(
        (status = 200, description = "Message deleted"),
        (status = 401, description = "Unknown participant", body = crate::error::ErrorResponse),
        (status = 404, description = "Unknown message id", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let user = user_from_headers(&headers)
        .ok_or_else(|| ApiError::unauthorized("Missing user header"))?;

    state.room().delete_message(&user, id).await?;
    Ok(StatusCode::OK)
}
