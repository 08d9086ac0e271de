//! Record store and reporting engine for personal finances.
//!
//! [`Engine`] owns the database connection and exposes async CRUD over users,
//! budgets, categories, incomes and expenses. Reports are computed by the pure
//! functions in [`reports`] over a [`Snapshot`] of one user's records.

pub use budgets::Budget;
pub use categories::Category;
pub use error::EngineError;
pub use expenses::Expense;
pub use incomes::Income;
pub use ops::{
    BudgetPatch, CategoryPatch, Engine, EngineBuilder, ExpensePatch, IncomePatch, UserPatch,
};
pub use reports::{DateRange, ExportBundle, Report, ReportRequest};
pub use snapshot::{BudgetRecord, CategoryRecord, Snapshot};
pub use users::{Role, User};

mod budgets;
mod categories;
mod error;
mod expenses;
mod incomes;
mod ops;
mod password;
pub mod reports;
mod snapshot;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
