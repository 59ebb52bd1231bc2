//! Courses as seen by the ledger: a price and an owning instructor.
//!
//! Catalog metadata beyond the title belongs to the catalog service.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine, util::parse_uuid};

/// Highest price a course can be listed at ($100,000.00).
pub const MAX_COURSE_PRICE: MoneyCents = MoneyCents::new(100_000_00);

pub(crate) fn validate_price(price: MoneyCents) -> ResultEngine<()> {
    if price.is_negative() {
        return Err(EngineError::InvalidAmount("price must be >= 0".to_string()));
    }
    if price > MAX_COURSE_PRICE {
        return Err(EngineError::InvalidAmount(format!(
            "price must be <= {MAX_COURSE_PRICE}"
        )));
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub price: MoneyCents,
    pub instructor_id: String,
    pub created_at: DateTime<Utc>,
}

impl Course {
    pub fn new(
        title: String,
        price: MoneyCents,
        instructor_id: String,
        created_at: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        validate_price(price)?;
        Ok(Self {
            id: Uuid::new_v4(),
            title,
            price,
            instructor_id,
            created_at,
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub title: String,
    pub price_minor: i64,
    pub instructor_id: String,
    pub created_at: DateTime<Utc>,
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
    #[sea_orm(has_many = "super::course_contents::Entity")]
    Contents,
    #[sea_orm(has_many = "super::enrollments::Entity")]
    Enrollments,
    #[sea_orm(has_many = "super::payments::Entity")]
    Payments,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Instructor.def()
    }
}

impl Related<super::course_contents::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contents.def()
    }
}

impl Related<super::enrollments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollments.def()
    }
}

impl Related<super::payments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Course> for ActiveModel {
    fn from(value: &Course) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            title: ActiveValue::Set(value.title.clone()),
            price_minor: ActiveValue::Set(value.price.cents()),
            instructor_id: ActiveValue::Set(value.instructor_id.clone()),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl TryFrom<Model> for Course {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: parse_uuid(&model.id, "course")?,
            title: model.title,
            price: MoneyCents::new(model.price_minor),
            instructor_id: model.instructor_id,
            created_at: model.created_at,
        })
    }
}
