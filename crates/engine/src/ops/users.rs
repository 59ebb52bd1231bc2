use sea_orm::{ActiveModelTrait, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    EngineError, MoneyCents, ResultEngine, Role, User, users, util::normalize_required_text,
};

use super::{Engine, with_tx};

impl Engine {
    /// Registers an account issued by the identity provider. New accounts
    /// start with a zero balance.
    pub async fn create_user(
        &self,
        user_id: &str,
        full_name: &str,
        role: Role,
    ) -> ResultEngine<User> {
        let id = normalize_required_text(user_id, "user id")?;
        let full_name = normalize_required_text(full_name, "full name")?;
        with_tx!(self, |db_tx| {
            if users::Entity::find_by_id(id.clone()).one(&db_tx).await?.is_some() {
                return Err(EngineError::ExistingKey(id));
            }
            let user = User {
                id,
                full_name,
                role,
                balance: MoneyCents::ZERO,
            };
            users::ActiveModel::from(&user).insert(&db_tx).await?;
            Ok(user)
        })
    }

    pub async fn user(&self, user_id: &str) -> ResultEngine<User> {
        with_tx!(self, |db_tx| { self.require_user(&db_tx, user_id).await })
    }

    pub async fn balance(&self, user_id: &str) -> ResultEngine<MoneyCents> {
        Ok(self.user(user_id).await?.balance)
    }

    pub async fn users(&self) -> ResultEngine<Vec<User>> {
        with_tx!(self, |db_tx| {
            let models = users::Entity::find()
                .order_by_asc(users::Column::Id)
                .all(&db_tx).await?;
            models
                .into_iter()
                .map(User::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }
}
