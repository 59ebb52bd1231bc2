use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue, DatabaseTransaction, PaginatorTrait, QueryFilter, QueryOrder,
    TransactionTrait, prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, MoneyCents, ResultEngine, cart_items, courses, enrollments, favorite_courses,
    util::parse_uuid,
};

use super::{Engine, with_tx};

/// A course saved by a student, either in the cart or among favorites.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    pub course_id: Uuid,
    pub title: String,
    pub price: MoneyCents,
    pub added_at: DateTime<Utc>,
}

/// Generates `add`, `remove` and `list` operations over a
/// `(student_id, course_id)` table.
macro_rules! impl_student_course_list {
    (
        $module:ident,
        $add_fn:ident,
        $remove_fn:ident,
        $list_fn:ident,
        reject_owned = $reject_owned:expr,
        $label:literal
    ) => {
        #[doc = concat!("Adds a course to the student's ", $label, ".")]
        pub async fn $add_fn(&self, student_id: &str, course_id: Uuid) -> ResultEngine<()> {
            with_tx!(self, |db_tx| {
                self.require_user_model(&db_tx, student_id).await?;
                self.require_course(&db_tx, course_id).await?;

                if $reject_owned && self.is_enrolled(&db_tx, student_id, course_id).await? {
                    return Err(EngineError::AlreadyOwned(
                        "course already owned".to_string(),
                    ));
                }
                let existing = $module::Entity::find_by_id((
                    student_id.to_string(),
                    course_id.to_string(),
                ))
                .one(&db_tx)
                .await?;
                if existing.is_some() {
                    return Err(EngineError::ExistingKey(
                        concat!("course already in ", $label).to_string(),
                    ));
                }

                $module::ActiveModel {
                    student_id: ActiveValue::Set(student_id.to_string()),
                    course_id: ActiveValue::Set(course_id.to_string()),
                    added_at: ActiveValue::Set(Utc::now()),
                }
                .insert(&db_tx)
                .await?;
                Ok(())
            })
        }

        pub async fn $remove_fn(&self, student_id: &str, course_id: Uuid) -> ResultEngine<()> {
            with_tx!(self, |db_tx| {
                let res = $module::Entity::delete_by_id((
                    student_id.to_string(),
                    course_id.to_string(),
                ))
                .exec(&db_tx)
                .await?;
                if res.rows_affected == 0 {
                    return Err(EngineError::KeyNotFound(
                        concat!("course not in ", $label).to_string(),
                    ));
                }
                Ok(())
            })
        }

        #[doc = concat!("Lists the student's ", $label, ", oldest first.")]
        pub async fn $list_fn(&self, student_id: &str) -> ResultEngine<Vec<CartEntry>> {
            with_tx!(self, |db_tx| {
                let rows = $module::Entity::find()
                    .filter($module::Column::StudentId.eq(student_id.to_string()))
                    .order_by_asc($module::Column::AddedAt)
                    .order_by_asc($module::Column::CourseId)
                    .find_also_related(courses::Entity)
                    .all(&db_tx)
                    .await?;

                let mut out = Vec::with_capacity(rows.len());
                for (row, course) in rows {
                    let course = course
                        .ok_or_else(|| EngineError::KeyNotFound("course not exists".to_string()))?;
                    out.push(CartEntry {
                        course_id: parse_uuid(&row.course_id, "course")?,
                        title: course.title,
                        price: MoneyCents::new(course.price_minor),
                        added_at: row.added_at,
                    });
                }
                Ok(out)
            })
        }
    };
}

impl Engine {
    impl_student_course_list!(
        cart_items,
        add_to_cart,
        remove_from_cart,
        cart,
        reject_owned = true,
        "cart"
    );

    impl_student_course_list!(
        favorite_courses,
        add_favorite,
        remove_favorite,
        favorites,
        reject_owned = false,
        "favorites"
    );

    async fn is_enrolled(
        &self,
        db: &DatabaseTransaction,
        student_id: &str,
        course_id: Uuid,
    ) -> ResultEngine<bool> {
        let count = enrollments::Entity::find()
            .filter(enrollments::Column::StudentId.eq(student_id.to_string()))
            .filter(enrollments::Column::CourseId.eq(course_id.to_string()))
            .count(db)
            .await?;
        Ok(count > 0)
    }
}
