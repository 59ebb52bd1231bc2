use sea_orm::{
    DatabaseTransaction, QueryFilter, Statement, TransactionTrait, Value, prelude::*,
    sea_query::Expr,
};
use serde::{Deserialize, Serialize};

use crate::{EngineError, MoneyCents, ResultEngine, users};

use super::{Engine, with_tx};

/// Stored balance of a user compared with the balance replayed from the
/// ledger (credited shares minus withdrawals).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceAudit {
    pub user_id: String,
    pub recorded: MoneyCents,
    pub expected: MoneyCents,
}

impl BalanceAudit {
    pub fn drift(&self) -> MoneyCents {
        self.recorded - self.expected
    }

    pub fn is_consistent(&self) -> bool {
        self.drift().is_zero()
    }
}

impl Engine {
    /// Adds `amount` to a balance with a single `balance = balance + ?`
    /// update. Returns `false` when no such user exists.
    pub(super) async fn credit_balance(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
        amount: MoneyCents,
    ) -> ResultEngine<bool> {
        let res = users::Entity::update_many()
            .col_expr(
                users::Column::BalanceMinor,
                Expr::col(users::Column::BalanceMinor).add(amount.cents()),
            )
            .filter(users::Column::Id.eq(user_id.to_string()))
            .exec(db)
            .await?;
        Ok(res.rows_affected > 0)
    }

    /// Subtracts `amount` only if the balance covers it.
    pub(super) async fn debit_balance(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
        amount: MoneyCents,
    ) -> ResultEngine<()> {
        let res = users::Entity::update_many()
            .col_expr(
                users::Column::BalanceMinor,
                Expr::col(users::Column::BalanceMinor).sub(amount.cents()),
            )
            .filter(users::Column::Id.eq(user_id.to_string()))
            .filter(users::Column::BalanceMinor.gte(amount.cents()))
            .exec(db)
            .await?;
        if res.rows_affected == 0 {
            // Either the user vanished or the balance is too low.
            self.require_user_model(db, user_id).await?;
            return Err(EngineError::InsufficientBalance(format!(
                "cannot withdraw {amount}"
            )));
        }
        Ok(())
    }

    pub(super) async fn sum_minor(
        &self,
        db: &DatabaseTransaction,
        sql: &str,
        values: Vec<Value>,
    ) -> ResultEngine<i64> {
        let backend = self.database.get_database_backend();
        let stmt = Statement::from_sql_and_values(backend, sql, values);
        let row = db.query_one(stmt).await?;
        Ok(row.and_then(|r| r.try_get("", "sum").ok()).unwrap_or(0))
    }

    /// Replays the ledger for `user_id` and compares it with the stored
    /// balance.
    pub async fn audit_balance(&self, user_id: &str) -> ResultEngine<BalanceAudit> {
        with_tx!(self, |db_tx| {
            let user = self.require_user(&db_tx, user_id).await?;

            let instructor_shares = self
                .sum_minor(
                    &db_tx,
                    "SELECT COALESCE(SUM(instructor_share_minor), 0) AS sum \
                     FROM payments WHERE instructor_id = ?",
                    vec![user_id.into()],
                )
                .await?;
            let platform_shares = self
                .sum_minor(
                    &db_tx,
                    "SELECT COALESCE(SUM(platform_share_minor), 0) AS sum \
                     FROM payments WHERE platform_account_id = ?",
                    vec![user_id.into()],
                )
                .await?;
            let withdrawn = self
                .sum_minor(
                    &db_tx,
                    "SELECT COALESCE(SUM(amount_minor), 0) AS sum \
                     FROM withdrawals WHERE instructor_id = ?",
                    vec![user_id.into()],
                )
                .await?;

            Ok(BalanceAudit {
                user_id: user.id,
                recorded: user.balance,
                expected: MoneyCents::new(instructor_shares + platform_shares - withdrawn),
            })
        })
    }

    /// Total platform share of payments whose platform credit was skipped.
    pub async fn unsettled_platform_total(&self) -> ResultEngine<MoneyCents> {
        with_tx!(self, |db_tx| {
            let total = self
                .sum_minor(
                    &db_tx,
                    "SELECT COALESCE(SUM(platform_share_minor), 0) AS sum \
                     FROM payments WHERE platform_account_id IS NULL",
                    vec![],
                )
                .await?;
            Ok(MoneyCents::new(total))
        })
    }
}
