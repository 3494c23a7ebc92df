use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};

use crate::{
    routes::models::{JoinRequest, ParticipantResponse},
    util::required_string,
    ApiError, AppState,
};

#[utoipa::path(
    post,
    path = "/participants",
    tag = "Participants",
    request_body = JoinRequest,
    responses(
        (status = 201, description = "Joined the room", body = ParticipantResponse),
        (status = 409, description = "Name already taken", body = crate::error::ErrorResponse),
        (status = 422, description = "Invalid body", body = crate::error::ErrorResponse)
    )
)]
pub async fn join(
    State(state): State<AppState>,
    body: Result<Json<JoinRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ParticipantResponse>), ApiError> {
    let Json(request) =
        body.map_err(|rejection| ApiError::validation(vec![rejection.body_text()]))?;

    let mut errors = Vec::new();
    let Some(name) = required_string(request.name, "name", &mut errors) else {
        return Err(ApiError::validation(errors));
    };

    let participant = state.room().join(name.trim()).await?;
    Ok((StatusCode::CREATED, Json(participant.into())))
}

#[utoipa::path(
    get,
    path = "/participants",
    tag = "Participants",
    responses(
        (status = 200, description = "Everyone currently in the room", body = [ParticipantResponse])
    )
)]
pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<Vec<ParticipantResponse>>, ApiError> {
    let participants = state.room().participants().await?;
    Ok(Json(participants.into_iter().map(Into::into).collect()))
}
