use api_types::ErrorBody;
use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

pub use server::{ServerState, router, run, run_with_listener, spawn_with_listener};

mod cart;
mod checkout;
mod courses;
mod earnings;
mod server;
mod withdrawals;

pub mod types {
    pub mod checkout {
        pub use api_types::checkout::{CheckoutRequest, CheckoutResponse, PaymentView};
    }

    pub mod withdrawal {
        pub use api_types::withdrawal::{
            WithdrawRequest, WithdrawResponse, WithdrawalList, WithdrawalListResponse,
            WithdrawalView,
        };
    }

    pub mod cart {
        pub use api_types::cart::{CartItemNew, CartItemView, CartResponse};
    }

    pub mod earnings {
        pub use api_types::earnings::{CourseEarningsView, EarningsResponse};
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_)
        | EngineError::Conflict(_)
        | EngineError::HasActivePayments(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::SERVICE_UNAVAILABLE,
        EngineError::InvalidCursor(_) => StatusCode::BAD_REQUEST,
        EngineError::EmptyCart(_)
        | EngineError::AlreadyOwned(_)
        | EngineError::InsufficientBalance(_)
        | EngineError::InvalidAmount(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: &EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "store unavailable, try again later".to_string()
        }
        EngineError::Conflict(_) => "concurrent update, retry the request".to_string(),
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ServerError::Engine(err) => (
                status_for_engine_error(&err),
                ErrorBody {
                    kind: err.kind().to_string(),
                    error: message_for_engine_error(&err),
                },
            ),
            ServerError::Generic(error) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    kind: "bad_request".to_string(),
                    error,
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
