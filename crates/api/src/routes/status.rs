use axum::{extract::State, http::HeaderMap, http::StatusCode};

use crate::{util::user_from_headers, ApiError, AppState};

#[utoipa::path(
    post,
    path = "/status",
    tag = "Participants",
    params(("user" = String, Header, description = "Participant sending the heartbeat")),
    responses(
        (status = 200, description = "Heartbeat recorded"),
        (status = 404, description = "Unknown participant", body = crate::error::ErrorResponse)
    )
)]
pub async fn heartbeat(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let user = user_from_headers(&headers)
        .ok_or_else(|| ApiError::not_found("Participant not found"))?;

    state.room().heartbeat(&user).await?;
    Ok(StatusCode::OK)
}
