//! Course API endpoints

use axum::{
    Extension,
    extract::{Path, State},
    http::StatusCode,
};
use engine::User;
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

pub async fn delete_course(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(course_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_course(course_id, &user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
