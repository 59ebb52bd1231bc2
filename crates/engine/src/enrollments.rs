//! Proof of ownership of a course.
//!
//! `(student_id, course_id)` is unique in the store: a concurrent checkout
//! inserting the same pair fails with a constraint violation instead of
//! creating a second row.

use chrono::{DateTime, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "enrollments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub student_id: String,
    pub course_id: String,
    pub enrolled_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::courses::Entity",
        from = "Column::CourseId",
        to = "super::courses::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Courses,
}

impl Related<super::courses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Courses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub(crate) fn enroll(student_id: &str, course_id: Uuid, enrolled_at: DateTime<Utc>) -> Self {
        Self {
            id: ActiveValue::Set(Uuid::new_v4().to_string()),
            student_id: ActiveValue::Set(student_id.to_string()),
            course_id: ActiveValue::Set(course_id.to_string()),
            enrolled_at: ActiveValue::Set(enrolled_at),
        }
    }
}
