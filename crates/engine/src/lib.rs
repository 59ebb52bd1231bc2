//! Purchase-and-earnings ledger engine for the Lectern course marketplace.
//!
//! The engine owns every multi-row mutation of the marketplace:
//!
//! - [`Engine::checkout`] turns cart rows into enrollments and payments,
//!   crediting the instructor and the platform account.
//! - [`Engine::withdraw`] debits an instructor balance and records the payout.
//! - [`Engine::delete_course`] removes a course together with its dependent
//!   rows, unless money has already moved for it.
//!
//! Every operation runs inside a single database transaction: either all of
//! its effects are committed or none are.

pub use commands::{CheckoutCmd, CheckoutScope, WithdrawCmd};
pub use course_contents::CourseContent;
pub use courses::{Course, MAX_COURSE_PRICE};
pub use error::EngineError;
pub use money::MoneyCents;
pub use ops::{
    BalanceAudit, CartEntry, CheckoutReceipt, CourseEarnings, Engine, EngineBuilder,
    InstructorEarnings, Resolution, WithdrawalReceipt,
};
pub use payments::Payment;
pub use pricing::{DEFAULT_INSTRUCTOR_SHARE_BPS, PricingPolicy, Shares};
pub use users::{Role, User};
pub use withdrawals::Withdrawal;

mod cart_items;
mod commands;
mod course_contents;
mod courses;
mod enrollments;
mod error;
mod favorite_courses;
mod money;
mod ops;
mod payments;
mod pricing;
mod users;
mod util;
mod withdrawals;

type ResultEngine<T> = Result<T, EngineError>;
