use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error payload returned for every failed request.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Stable machine-readable code (e.g. `insufficient_balance`).
    pub kind: String,
    pub error: String,
}

pub mod checkout {
    use super::*;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CheckoutRequest {
        /// Courses to buy. When absent the whole cart is purchased.
        pub course_ids: Option<Vec<Uuid>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PaymentView {
        pub id: Uuid,
        pub course_id: Uuid,
        pub amount_paid_minor: i64,
        pub instructor_share_minor: i64,
        pub platform_share_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CheckoutResponse {
        pub enrolled_course_ids: Vec<Uuid>,
        pub already_owned_course_ids: Vec<Uuid>,
        pub payments: Vec<PaymentView>,
        pub total_charged_minor: i64,
        /// Platform share not credited to any account; non-zero means the
        /// ledger needs reconciliation.
        pub unsettled_platform_share_minor: i64,
    }
}

pub mod withdrawal {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WithdrawRequest {
        pub amount_minor: i64,
        /// Payout identifier, e.g. a PayPal e-mail.
        pub destination: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WithdrawResponse {
        pub withdrawal_id: Uuid,
        pub new_balance_minor: i64,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct WithdrawalList {
        pub limit: Option<u64>,
        /// Opaque pagination cursor (base64), from `next_cursor`.
        pub cursor: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WithdrawalView {
        pub id: Uuid,
        pub amount_minor: i64,
        pub destination: String,
        pub withdrawn_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct WithdrawalListResponse {
        pub withdrawals: Vec<WithdrawalView>,
        /// Opaque cursor for fetching the next page (older items).
        pub next_cursor: Option<String>,
    }
}

pub mod cart {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CartItemNew {
        pub course_id: Uuid,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CartItemView {
        pub course_id: Uuid,
        pub title: String,
        pub price_minor: i64,
        pub added_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CartResponse {
        pub items: Vec<CartItemView>,
        pub total_minor: i64,
    }
}

pub mod earnings {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CourseEarningsView {
        pub course_id: Uuid,
        pub title: String,
        pub price_minor: i64,
        pub student_count: u64,
        pub revenue_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct EarningsResponse {
        pub balance_minor: i64,
        pub total_revenue_minor: i64,
        pub total_withdrawn_minor: i64,
        pub courses: Vec<CourseEarningsView>,
    }
}
