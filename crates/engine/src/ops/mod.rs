use sea_orm::DatabaseConnection;

use crate::{PricingPolicy, ResultEngine};

mod access;
mod balances;
mod cart;
mod checkout;
mod courses;
mod earnings;
mod enrollments;
mod users;
mod withdrawals;

pub use balances::BalanceAudit;
pub use cart::CartEntry;
pub use checkout::CheckoutReceipt;
pub use earnings::{CourseEarnings, InstructorEarnings};
pub use enrollments::Resolution;
pub use withdrawals::WithdrawalReceipt;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    platform_account: Option<String>,
    pricing: PricingPolicy,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Account credited with the platform share of each purchase, if any.
    pub fn platform_account(&self) -> Option<&str> {
        self.platform_account.as_deref()
    }

    pub fn pricing(&self) -> PricingPolicy {
        self.pricing
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    platform_account: Option<String>,
    pricing: PricingPolicy,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Identifier of the user account that receives the platform share.
    ///
    /// Blank identifiers are treated as "not configured".
    pub fn platform_account(mut self, account_id: impl Into<String>) -> EngineBuilder {
        let account_id = account_id.into();
        let trimmed = account_id.trim();
        self.platform_account = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    /// Override the default 80/20 revenue split.
    pub fn pricing(mut self, pricing: PricingPolicy) -> EngineBuilder {
        self.pricing = pricing;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            platform_account: self.platform_account,
            pricing: self.pricing,
        })
    }
}
