//! Payment primitives.
//!
//! A `Payment` is the immutable record of one purchase: what was paid for a
//! course and how it was split. Rows are inserted once and never updated.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine, Shares, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub student_id: String,
    pub course_id: Uuid,
    pub instructor_id: String,
    pub amount_paid: MoneyCents,
    pub instructor_share: MoneyCents,
    pub platform_share: MoneyCents,
    /// Account credited with the platform share; `None` when the credit was
    /// skipped because no platform account could be resolved.
    pub platform_account_id: Option<String>,
    pub paid_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(
        student_id: String,
        course_id: Uuid,
        instructor_id: String,
        shares: Shares,
        platform_account_id: Option<String>,
        paid_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            student_id,
            course_id,
            instructor_id,
            amount_paid: shares.total(),
            instructor_share: shares.instructor,
            platform_share: shares.platform,
            platform_account_id,
            paid_at,
        }
    }

    /// Returns `true` if the platform share of this payment was credited.
    pub fn is_settled(&self) -> bool {
        self.platform_account_id.is_some()
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub student_id: String,
    pub course_id: String,
    pub instructor_id: String,
    pub amount_paid_minor: i64,
    pub instructor_share_minor: i64,
    pub platform_share_minor: i64,
    pub platform_account_id: Option<String>,
    pub paid_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::courses::Entity",
        from = "Column::CourseId",
        to = "super::courses::Column::Id",
        on_update = "NoAction",
        on_delete = "Restrict"
    )]
    Courses,
}

impl Related<super::courses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Courses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Payment> for ActiveModel {
    fn from(value: &Payment) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            student_id: ActiveValue::Set(value.student_id.clone()),
            course_id: ActiveValue::Set(value.course_id.to_string()),
            instructor_id: ActiveValue::Set(value.instructor_id.clone()),
            amount_paid_minor: ActiveValue::Set(value.amount_paid.cents()),
            instructor_share_minor: ActiveValue::Set(value.instructor_share.cents()),
            platform_share_minor: ActiveValue::Set(value.platform_share.cents()),
            platform_account_id: ActiveValue::Set(value.platform_account_id.clone()),
            paid_at: ActiveValue::Set(value.paid_at),
        }
    }
}

impl TryFrom<Model> for Payment {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&model.id, "payment")?,
            course_id: parse_uuid(&model.course_id, "course")?,
            student_id: model.student_id,
            instructor_id: model.instructor_id,
            amount_paid: MoneyCents::new(model.amount_paid_minor),
            instructor_share: MoneyCents::new(model.instructor_share_minor),
            platform_share: MoneyCents::new(model.platform_share_minor),
            platform_account_id: model.platform_account_id,
            paid_at: model.paid_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn payment_amount_is_sum_of_shares() {
        let shares = Shares {
            instructor: MoneyCents::new(80_00),
            platform: MoneyCents::new(20_00),
        };
        let paid_at = Utc.timestamp_opt(0, 0).unwrap();
        let payment = Payment::new(
            "bob".to_string(),
            Uuid::new_v4(),
            "alice".to_string(),
            shares,
            None,
            paid_at,
        );

        assert_eq!(payment.amount_paid, MoneyCents::new(100_00));
        assert!(!payment.is_settled());

        let model = Model {
            id: payment.id.to_string(),
            student_id: payment.student_id.clone(),
            course_id: payment.course_id.to_string(),
            instructor_id: payment.instructor_id.clone(),
            amount_paid_minor: 100_00,
            instructor_share_minor: 80_00,
            platform_share_minor: 20_00,
            platform_account_id: None,
            paid_at,
        };
        assert_eq!(Payment::try_from(model).unwrap(), payment);
    }
}
