use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait,
    prelude::*,
};
use uuid::Uuid;

use crate::{
    Course, CourseContent, EngineError, MoneyCents, ResultEngine, Role, cart_items,
    course_contents, courses, favorite_courses, util::normalize_required_text,
};

use super::{Engine, with_tx};

impl Engine {
    /// Publishes a new course owned by `instructor_id`.
    pub async fn create_course(
        &self,
        instructor_id: &str,
        title: &str,
        price: MoneyCents,
    ) -> ResultEngine<Course> {
        let title = normalize_required_text(title, "title")?;
        with_tx!(self, |db_tx| {
            self.require_role(&db_tx, instructor_id, Role::Instructor)
                .await?;
            let course = Course::new(title, price, instructor_id.to_string(), Utc::now())?;
            courses::ActiveModel::from(&course).insert(&db_tx).await?;
            Ok(course)
        })
    }

    pub async fn course(&self, course_id: Uuid) -> ResultEngine<Course> {
        with_tx!(self, |db_tx| {
            Course::try_from(self.require_course(&db_tx, course_id).await?)
        })
    }

    /// Changes the price of a course that nobody has paid for yet.
    pub async fn update_course_price(
        &self,
        course_id: Uuid,
        requester_id: &str,
        price: MoneyCents,
    ) -> ResultEngine<Course> {
        courses::validate_price(price)?;
        with_tx!(self, |db_tx| {
            let model = self.require_course(&db_tx, course_id).await?;
            self.require_course_owner_or_admin(&db_tx, &model, requester_id)
                .await?;
            if self.course_has_payments(&db_tx, course_id).await? {
                return Err(EngineError::HasActivePayments(
                    "price is frozen once a course has been paid for".to_string(),
                ));
            }

            let mut active: courses::ActiveModel = model.into();
            active.price_minor = ActiveValue::Set(price.cents());
            let updated = active.update(&db_tx).await?;
            Course::try_from(updated)
        })
    }

    pub async fn has_payments(&self, course_id: Uuid) -> ResultEngine<bool> {
        with_tx!(self, |db_tx| {
            self.require_course(&db_tx, course_id).await?;
            self.course_has_payments(&db_tx, course_id).await
        })
    }

    /// Appends a lesson at the end of a course.
    pub async fn add_course_content(
        &self,
        course_id: Uuid,
        requester_id: &str,
        title: &str,
    ) -> ResultEngine<CourseContent> {
        let title = normalize_required_text(title, "title")?;
        with_tx!(self, |db_tx| {
            let model = self.require_course(&db_tx, course_id).await?;
            self.require_course_owner_or_admin(&db_tx, &model, requester_id)
                .await?;

            let existing = course_contents::Entity::find()
                .filter(course_contents::Column::CourseId.eq(course_id.to_string()))
                .count(&db_tx)
                .await?;
            let content = CourseContent {
                id: Uuid::new_v4(),
                course_id,
                title,
                position: i32::try_from(existing + 1).map_err(|_| {
                    EngineError::InvalidAmount("too many lessons in course".to_string())
                })?,
            };
            course_contents::ActiveModel {
                id: ActiveValue::Set(content.id.to_string()),
                course_id: ActiveValue::Set(course_id.to_string()),
                title: ActiveValue::Set(content.title.clone()),
                position: ActiveValue::Set(content.position),
            }
            .insert(&db_tx)
            .await?;
            Ok(content)
        })
    }

    pub async fn course_contents(&self, course_id: Uuid) -> ResultEngine<Vec<CourseContent>> {
        with_tx!(self, |db_tx| {
            self.require_course(&db_tx, course_id).await?;
            let models = course_contents::Entity::find()
                .filter(course_contents::Column::CourseId.eq(course_id.to_string()))
                .order_by_asc(course_contents::Column::Position)
                .all(&db_tx)
                .await?;
            models
                .into_iter()
                .map(CourseContent::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    /// Deletes a course together with its dependent rows.
    ///
    /// Refused with `HasActivePayments` for every caller once money has moved
    /// for the course. Favorites and cart rows are removed explicitly;
    /// enrollments and lessons follow through `ON DELETE CASCADE`.
    pub async fn delete_course(&self, course_id: Uuid, requester_id: &str) -> ResultEngine<()> {
        let res: ResultEngine<()> = with_tx!(self, |db_tx| {
            let model = self.require_course(&db_tx, course_id).await?;
            if self.course_has_payments(&db_tx, course_id).await? {
                return Err(EngineError::HasActivePayments(
                    "course has payments and cannot be deleted".to_string(),
                ));
            }
            self.require_course_owner_or_admin(&db_tx, &model, requester_id)
                .await?;

            favorite_courses::Entity::delete_many()
                .filter(favorite_courses::Column::CourseId.eq(course_id.to_string()))
                .exec(&db_tx)
                .await?;
            cart_items::Entity::delete_many()
                .filter(cart_items::Column::CourseId.eq(course_id.to_string()))
                .exec(&db_tx)
                .await?;
            courses::Entity::delete_by_id(course_id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        });
        res?;

        tracing::info!(%course_id, requester_id, "course deleted");
        Ok(())
    }
}
