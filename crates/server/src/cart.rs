//! Cart and favorites API endpoints

use api_types::cart::{CartItemNew, CartItemView, CartResponse};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{CartEntry, MoneyCents, User};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn to_response(entries: Vec<CartEntry>) -> CartResponse {
    let total: MoneyCents = entries.iter().map(|e| e.price).sum();
    CartResponse {
        items: entries
            .into_iter()
            .map(|e| CartItemView {
                course_id: e.course_id,
                title: e.title,
                price_minor: e.price.cents(),
                added_at: e.added_at,
            })
            .collect(),
        total_minor: total.cents(),
    }
}

pub async fn list_cart(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<CartResponse>, ServerError> {
    let entries = state.engine.cart(&user.id).await?;
    Ok(Json(to_response(entries)))
}

pub async fn add_to_cart(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<CartItemNew>,
) -> Result<StatusCode, ServerError> {
    state.engine.add_to_cart(&user.id, payload.course_id).await?;
    Ok(StatusCode::CREATED)
}

pub async fn remove_from_cart(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(course_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.remove_from_cart(&user.id, course_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_favorites(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<CartResponse>, ServerError> {
    let entries = state.engine.favorites(&user.id).await?;
    Ok(Json(to_response(entries)))
}

pub async fn add_favorite(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<CartItemNew>,
) -> Result<StatusCode, ServerError> {
    state.engine.add_favorite(&user.id, payload.course_id).await?;
    Ok(StatusCode::CREATED)
}

pub async fn remove_favorite(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(course_id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.remove_favorite(&user.id, course_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
