//! Immutable history of instructor payouts.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdrawal {
    pub id: Uuid,
    pub instructor_id: String,
    pub amount: MoneyCents,
    pub destination: String,
    pub withdrawn_at: DateTime<Utc>,
}

impl Withdrawal {
    pub fn new(
        instructor_id: String,
        amount: MoneyCents,
        destination: String,
        withdrawn_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "withdrawal amount must be > 0".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            instructor_id,
            amount,
            destination,
            withdrawn_at,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "withdrawals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub instructor_id: String,
    pub amount_minor: i64,
    pub destination: String,
    pub withdrawn_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::InstructorId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Instructor,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Instructor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Withdrawal> for ActiveModel {
    fn from(value: &Withdrawal) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            instructor_id: ActiveValue::Set(value.instructor_id.clone()),
            amount_minor: ActiveValue::Set(value.amount.cents()),
            destination: ActiveValue::Set(value.destination.clone()),
            withdrawn_at: ActiveValue::Set(value.withdrawn_at),
        }
    }
}

impl TryFrom<Model> for Withdrawal {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&model.id, "withdrawal")?,
            instructor_id: model.instructor_id,
            amount: MoneyCents::new(model.amount_minor),
            destination: model.destination,
            withdrawn_at: model.withdrawn_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn rejects_non_positive_amounts() {
        let at = Utc.timestamp_opt(0, 0).unwrap();
        for cents in [0, -1] {
            let err = Withdrawal::new(
                "alice".to_string(),
                MoneyCents::new(cents),
                "alice@example.com".to_string(),
                at,
            )
            .unwrap_err();
            assert_eq!(err.kind(), "invalid_amount");
        }
    }
}
