use base64::Engine as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, Condition, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    prelude::*,
};
use serde::{Deserialize, Serialize};

use crate::{
    EngineError, MoneyCents, ResultEngine, Role, WithdrawCmd, Withdrawal,
    util::normalize_required_text, withdrawals,
};

use super::{Engine, with_tx};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalReceipt {
    pub withdrawal: Withdrawal,
    pub new_balance: MoneyCents,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct WithdrawalsCursor {
    withdrawn_at: DateTime<Utc>,
    withdrawal_id: String,
}

impl WithdrawalsCursor {
    fn encode(&self) -> ResultEngine<String> {
        let bytes = serde_json::to_vec(self)
            .map_err(|_| EngineError::InvalidCursor("invalid withdrawals cursor".to_string()))?;
        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
    }

    fn decode(input: &str) -> ResultEngine<Self> {
        let bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(input.as_bytes())
            .map_err(|_| EngineError::InvalidCursor("invalid withdrawals cursor".to_string()))?;
        serde_json::from_slice::<Self>(&bytes)
            .map_err(|_| EngineError::InvalidCursor("invalid withdrawals cursor".to_string()))
    }
}

impl Engine {
    /// Moves `cmd.amount` out of an instructor balance and records the payout.
    ///
    /// The debit is a single conditional update, so two concurrent
    /// withdrawals can never overdraw the balance together.
    pub async fn withdraw(&self, cmd: WithdrawCmd) -> ResultEngine<WithdrawalReceipt> {
        if !cmd.amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "withdrawal amount must be > 0".to_string(),
            ));
        }
        let destination = normalize_required_text(&cmd.destination, "destination")?;
        let instructor_id = cmd.instructor_id.as_str();

        let receipt: ResultEngine<WithdrawalReceipt> = with_tx!(self, |db_tx| {
            self.require_role(&db_tx, instructor_id, Role::Instructor)
                .await?;
            self.debit_balance(&db_tx, instructor_id, cmd.amount)
                .await?;

            let withdrawal = Withdrawal::new(
                instructor_id.to_string(),
                cmd.amount,
                destination,
                Utc::now(),
            )?;
            withdrawals::ActiveModel::from(&withdrawal)
                .insert(&db_tx)
                .await?;

            let new_balance = self.require_user(&db_tx, instructor_id).await?.balance;
            Ok(WithdrawalReceipt {
                withdrawal,
                new_balance,
            })
        });
        let receipt = receipt?;

        tracing::info!(
            instructor_id,
            amount = %receipt.withdrawal.amount,
            new_balance = %receipt.new_balance,
            "withdrawal committed"
        );
        Ok(receipt)
    }

    /// Lists the withdrawals of an instructor, newest first.
    ///
    /// Pagination is by `(withdrawn_at DESC, id DESC)`; the returned cursor
    /// is `None` on the last page.
    pub async fn withdrawals_page(
        &self,
        instructor_id: &str,
        limit: u64,
        cursor: Option<&str>,
    ) -> ResultEngine<(Vec<Withdrawal>, Option<String>)> {
        with_tx!(self, |db_tx| {
            self.require_user_model(&db_tx, instructor_id).await?;

            let limit_plus_one = limit.saturating_add(1);
            let mut query = withdrawals::Entity::find()
                .filter(withdrawals::Column::InstructorId.eq(instructor_id.to_string()))
                .order_by_desc(withdrawals::Column::WithdrawnAt)
                .order_by_desc(withdrawals::Column::Id)
                .limit(limit_plus_one);

            if let Some(cursor) = cursor {
                let cursor = WithdrawalsCursor::decode(cursor)?;
                query = query.filter(
                    Condition::any()
                        .add(withdrawals::Column::WithdrawnAt.lt(cursor.withdrawn_at))
                        .add(
                            Condition::all()
                                .add(withdrawals::Column::WithdrawnAt.eq(cursor.withdrawn_at))
                                .add(withdrawals::Column::Id.lt(cursor.withdrawal_id)),
                        ),
                );
            }

            let rows: Vec<withdrawals::Model> = query.all(&db_tx).await?;
            let has_more = rows.len() > limit as usize;

            let mut out: Vec<Withdrawal> = Vec::with_capacity(rows.len().min(limit as usize));
            for model in rows.into_iter().take(limit as usize) {
                out.push(Withdrawal::try_from(model)?);
            }

            let next_cursor = if has_more {
                out.last()
                    .map(|w| WithdrawalsCursor {
                        withdrawn_at: w.withdrawn_at,
                        withdrawal_id: w.id.to_string(),
                    })
                    .map(|c| c.encode())
                    .transpose()?
            } else {
                None
            };

            Ok((out, next_cursor))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_rejects_garbage() {
        let err = WithdrawalsCursor::decode("not a cursor!").unwrap_err();
        assert_eq!(err.kind(), "invalid_amount");
    }
}
