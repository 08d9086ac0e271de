use sea_orm::DatabaseConnection;

mod access;
mod budgets;
mod categories;
mod expenses;
mod incomes;
mod reports;
mod snapshot;
mod users;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
///
/// Inside the block every query must go through the transaction handle: an
/// in-memory sqlite pool has a single connection.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result: $crate::ResultEngine<_> = $body;
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
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// Changes to a user profile. `None` leaves the field untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub image: Option<String>,
    pub password: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BudgetPatch {
    pub amount: Option<f64>,
    pub month: Option<String>,
    pub year: Option<i32>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct IncomePatch {
    pub amount: Option<f64>,
    pub month: Option<String>,
    pub year: Option<i32>,
    pub source: Option<String>,
    pub budget_id: Option<String>,
}

/// Changes to an expense. A new `budget_id`/`category_id` moves the expense,
/// both must belong to the same user.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExpensePatch {
    pub amount: Option<f64>,
    pub description: Option<String>,
    pub budget_id: Option<String>,
    pub category_id: Option<String>,
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> crate::ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}
