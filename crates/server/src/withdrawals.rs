//! Withdrawal API endpoints

use api_types::withdrawal::{
    WithdrawRequest, WithdrawResponse, WithdrawalList, WithdrawalListResponse, WithdrawalView,
};
use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
};
use engine::{MoneyCents, User, WithdrawCmd};

use crate::{ServerError, server::ServerState};

const DEFAULT_PAGE_SIZE: u64 = 50;
const MAX_PAGE_SIZE: u64 = 200;

pub async fn withdraw(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<WithdrawRequest>,
) -> Result<(StatusCode, Json<WithdrawResponse>), ServerError> {
    let cmd = WithdrawCmd::new(
        user.id,
        MoneyCents::new(payload.amount_minor),
        payload.destination,
    );
    let receipt = state.engine.withdraw(cmd).await?;

    Ok((
        StatusCode::CREATED,
        Json(WithdrawResponse {
            withdrawal_id: receipt.withdrawal.id,
            new_balance_minor: receipt.new_balance.cents(),
        }),
    ))
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(query): Query<WithdrawalList>,
) -> Result<Json<WithdrawalListResponse>, ServerError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let (withdrawals, next_cursor) = state
        .engine
        .withdrawals_page(&user.id, limit, query.cursor.as_deref())
        .await?;

    Ok(Json(WithdrawalListResponse {
        withdrawals: withdrawals
            .into_iter()
            .map(|w| WithdrawalView {
                id: w.id,
                amount_minor: w.amount.cents(),
                destination: w.destination,
                withdrawn_at: w.withdrawn_at,
            })
            .collect(),
        next_cursor,
    }))
}
