use sea_orm::{DatabaseTransaction, PaginatorTrait, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, Role, User, courses, payments, users};

use super::Engine;

/// Generates a `require_*` lookup that fails with `KeyNotFound` when the row
/// is missing.
macro_rules! impl_require_by_id {
    ($require_fn:ident, $entity:path, $model:ty, $key:ty, $err_msg:literal) => {
        pub(super) async fn $require_fn(
            &self,
            db: &DatabaseTransaction,
            id: $key,
        ) -> ResultEngine<$model> {
            <$entity>::find_by_id(id.to_string())
                .one(db)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound($err_msg.to_string()))
        }
    };
}

impl Engine {
    impl_require_by_id!(
        require_user_model,
        users::Entity,
        users::Model,
        &str,
        "user not exists"
    );

    impl_require_by_id!(
        require_course,
        courses::Entity,
        courses::Model,
        Uuid,
        "course not exists"
    );

    pub(super) async fn require_user(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<User> {
        User::try_from(self.require_user_model(db, user_id).await?)
    }

    pub(super) async fn require_role(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
        role: Role,
    ) -> ResultEngine<User> {
        let user = self.require_user(db, user_id).await?;
        if user.role != role {
            return Err(EngineError::Forbidden(format!(
                "{} role required",
                role.as_str()
            )));
        }
        Ok(user)
    }

    /// Checks that `user_id` owns the course or is an admin.
    pub(super) async fn require_course_owner_or_admin(
        &self,
        db: &DatabaseTransaction,
        course: &courses::Model,
        user_id: &str,
    ) -> ResultEngine<()> {
        if course.instructor_id == user_id {
            return Ok(());
        }
        let user = self.require_user(db, user_id).await?;
        if user.role == Role::Admin {
            return Ok(());
        }
        Err(EngineError::Forbidden(
            "only the course owner or an admin can do this".to_string(),
        ))
    }

    pub(super) async fn course_has_payments(
        &self,
        db: &DatabaseTransaction,
        course_id: Uuid,
    ) -> ResultEngine<bool> {
        let count = payments::Entity::find()
            .filter(payments::Column::CourseId.eq(course_id.to_string()))
            .count(db)
            .await?;
        Ok(count > 0)
    }
}
