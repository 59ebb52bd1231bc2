//! Command structs for engine operations.
//!
//! These types group parameters for the write operations (checkout,
//! withdrawal), keeping call sites readable and avoiding long argument lists.

use uuid::Uuid;

use crate::MoneyCents;

/// Which cart rows a checkout acts on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CheckoutScope {
    /// Every course currently in the student's cart.
    All,
    /// Only these courses, intersected with the student's cart.
    Selected(Vec<Uuid>),
}

/// Purchase cart items for a student.
#[derive(Clone, Debug)]
pub struct CheckoutCmd {
    pub student_id: String,
    pub scope: CheckoutScope,
}

impl CheckoutCmd {
    #[must_use]
    pub fn all(student_id: impl Into<String>) -> Self {
        Self {
            student_id: student_id.into(),
            scope: CheckoutScope::All,
        }
    }

    #[must_use]
    pub fn selected(student_id: impl Into<String>, course_ids: Vec<Uuid>) -> Self {
        Self {
            student_id: student_id.into(),
            scope: CheckoutScope::Selected(course_ids),
        }
    }
}

/// Withdraw earnings from an instructor balance.
#[derive(Clone, Debug)]
pub struct WithdrawCmd {
    pub instructor_id: String,
    pub amount: MoneyCents,
    /// Payout destination (e.g. a PayPal e-mail).
    pub destination: String,
}

impl WithdrawCmd {
    #[must_use]
    pub fn new(
        instructor_id: impl Into<String>,
        amount: MoneyCents,
        destination: impl Into<String>,
    ) -> Self {
        Self {
            instructor_id: instructor_id.into(),
            amount,
            destination: destination.into(),
        }
    }
}
