use axum::Json;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health::health_check,
        crate::routes::participants::join,
        crate::routes::participants::list,
        crate::routes::status::heartbeat,
        crate::routes::messages::list,
        crate::routes::messages::create,
        crate::routes::messages::delete
    ),
    components(
        schemas(
            crate::error::ErrorResponse,
            crate::routes::health::HealthResponse,
            crate::routes::models::ParticipantResponse,
            crate::routes::models::MessageResponse,
            crate::routes::models::JoinRequest,
            crate::routes::models::PostMessageRequest
        )
    ),
    tags(
        (name = "Health", description = "Service health endpoints"),
        (name = "Participants", description = "Joining the room and staying present"),
        (name = "Messages", description = "Posting, reading and deleting messages")
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
