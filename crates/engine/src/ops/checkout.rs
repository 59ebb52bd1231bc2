use chrono::Utc;
use sea_orm::{ActiveModelTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    CheckoutCmd, CheckoutScope, EngineError, MoneyCents, Payment, ResultEngine, cart_items,
    enrollments, payments, util::parse_uuid,
};

use super::{Engine, with_tx};

/// Outcome of a committed checkout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutReceipt {
    pub enrolled_course_ids: Vec<Uuid>,
    /// Courses that were in the scoped cart but already owned. Their cart
    /// rows are removed without charging.
    pub already_owned_course_ids: Vec<Uuid>,
    pub payments: Vec<Payment>,
    pub total_charged: MoneyCents,
    /// Platform share that could not be credited because no platform account
    /// was available.
    pub unsettled_platform_share: MoneyCents,
}

fn overflow() -> EngineError {
    EngineError::InvalidAmount("checkout total out of range".to_string())
}

impl Engine {
    /// Purchases the scoped cart items of a student.
    ///
    /// Enrollments, payments, balance credits and the cart cleanup are
    /// committed together or not at all.
    pub async fn checkout(&self, cmd: CheckoutCmd) -> ResultEngine<CheckoutReceipt> {
        let student_id = cmd.student_id.as_str();
        let receipt: ResultEngine<CheckoutReceipt> = with_tx!(self, |db_tx| {
            self.require_user_model(&db_tx, student_id).await?;

            let mut query = cart_items::Entity::find()
                .filter(cart_items::Column::StudentId.eq(student_id.to_string()))
                .order_by_asc(cart_items::Column::AddedAt)
                .order_by_asc(cart_items::Column::CourseId);
            if let CheckoutScope::Selected(ids) = &cmd.scope {
                if ids.is_empty() {
                    return Err(EngineError::EmptyCart("no courses selected".to_string()));
                }
                query = query.filter(
                    cart_items::Column::CourseId.is_in(ids.iter().map(Uuid::to_string)),
                );
            }
            let rows: Vec<cart_items::Model> = query.all(&db_tx).await?;
            if rows.is_empty() {
                let msg = match &cmd.scope {
                    CheckoutScope::All => "cart is empty",
                    CheckoutScope::Selected(_) => "selected courses not in cart",
                };
                return Err(EngineError::EmptyCart(msg.to_string()));
            }

            let scoped: Vec<Uuid> = rows
                .iter()
                .map(|row| parse_uuid(&row.course_id, "course"))
                .collect::<ResultEngine<_>>()?;
            let resolution = self
                .resolve_enrollments(&db_tx, student_id, &scoped)
                .await?;
            if resolution.to_enroll.is_empty() {
                return Err(EngineError::AlreadyOwned(
                    "every selected course is already owned".to_string(),
                ));
            }

            let now = Utc::now();
            let mut receipt = CheckoutReceipt {
                enrolled_course_ids: Vec::with_capacity(resolution.to_enroll.len()),
                already_owned_course_ids: resolution.already_enrolled.iter().copied().collect(),
                payments: Vec::with_capacity(resolution.to_enroll.len()),
                total_charged: MoneyCents::ZERO,
                unsettled_platform_share: MoneyCents::ZERO,
            };

            for course_id in &resolution.to_enroll {
                let course = self.require_course(&db_tx, *course_id).await?;
                let shares = self.pricing.split(MoneyCents::new(course.price_minor))?;

                enrollments::ActiveModel::enroll(student_id, *course_id, now)
                    .insert(&db_tx)
                    .await?;

                if !self
                    .credit_balance(&db_tx, &course.instructor_id, shares.instructor)
                    .await?
                {
                    return Err(EngineError::KeyNotFound("instructor not exists".to_string()));
                }

                let mut credited_platform = None;
                if let Some(account) = self.platform_account.as_deref() {
                    if self.credit_balance(&db_tx, account, shares.platform).await? {
                        credited_platform = Some(account.to_string());
                    }
                }
                if credited_platform.is_none() {
                    tracing::warn!(
                        course_id = %course_id,
                        platform_share = %shares.platform,
                        "platform account unavailable, platform share left unsettled"
                    );
                    receipt.unsettled_platform_share = receipt
                        .unsettled_platform_share
                        .checked_add(shares.platform)
                        .ok_or_else(overflow)?;
                }

                let payment = Payment::new(
                    student_id.to_string(),
                    *course_id,
                    course.instructor_id.clone(),
                    shares,
                    credited_platform,
                    now,
                );
                payments::ActiveModel::from(&payment).insert(&db_tx).await?;

                receipt.total_charged = receipt
                    .total_charged
                    .checked_add(payment.amount_paid)
                    .ok_or_else(overflow)?;
                receipt.enrolled_course_ids.push(*course_id);
                receipt.payments.push(payment);
            }

            cart_items::Entity::delete_many()
                .filter(cart_items::Column::StudentId.eq(student_id.to_string()))
                .filter(cart_items::Column::CourseId.is_in(scoped.iter().map(Uuid::to_string)))
                .exec(&db_tx)
                .await?;

            Ok(receipt)
        });
        let receipt = receipt?;

        tracing::info!(
            student_id,
            enrolled = receipt.enrolled_course_ids.len(),
            total_charged = %receipt.total_charged,
            "checkout committed"
        );
        Ok(receipt)
    }
}
