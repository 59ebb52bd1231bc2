//! Checkout API endpoint

use api_types::checkout::{CheckoutRequest, CheckoutResponse, PaymentView};
use axum::{Extension, Json, extract::State};
use engine::{CheckoutCmd, User};

use crate::{ServerError, server::ServerState};

pub async fn checkout(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>, ServerError> {
    let cmd = match payload.course_ids {
        Some(ids) => CheckoutCmd::selected(user.id, ids),
        None => CheckoutCmd::all(user.id),
    };
    let receipt = state.engine.checkout(cmd).await?;

    Ok(Json(CheckoutResponse {
        enrolled_course_ids: receipt.enrolled_course_ids,
        already_owned_course_ids: receipt.already_owned_course_ids,
        payments: receipt
            .payments
            .into_iter()
            .map(|p| PaymentView {
                id: p.id,
                course_id: p.course_id,
                amount_paid_minor: p.amount_paid.cents(),
                instructor_share_minor: p.instructor_share.cents(),
                platform_share_minor: p.platform_share.cents(),
            })
            .collect(),
        total_charged_minor: receipt.total_charged.cents(),
        unsettled_platform_share_minor: receipt.unsettled_platform_share.cents(),
    }))
}
