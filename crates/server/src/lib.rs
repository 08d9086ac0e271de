use api_types::Envelope;
use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

pub use server::{ServerOptions, app, run, run_with_listener, spawn_with_listener};

mod auth;
mod budgets;
mod categories;
mod expenses;
mod incomes;
pub mod pdf;
mod reports;
mod server;
mod user;
mod views;

pub mod types {
    pub mod auth {
        pub use api_types::auth::{Register, Session, SignIn};
    }

    pub mod user {
        pub use api_types::user::{Role, UserUpdate, UserView};
    }

    pub mod budget {
        pub use api_types::budget::{BudgetFilter, BudgetNew, BudgetUpdate, BudgetView};
    }

    pub mod category {
        pub use api_types::category::{CategoryNew, CategoryUpdate, CategoryView};
    }

    pub mod income {
        pub use api_types::income::{IncomeFilter, IncomeNew, IncomeUpdate, IncomeView};
    }

    pub mod expense {
        pub use api_types::expense::{ExpenseNew, ExpenseUpdate, ExpenseView};
    }

    pub mod report {
        pub use api_types::report::{CustomRange, PeriodQuery};
        pub use engine::reports::{
            AnnualBudget, BudgetAlert, CategoryShare, CategoryTotal, CustomReport, Forecast,
            MonthlyTrends, PeriodTotal, Totals,
        };
    }
}

#[derive(Debug)]
pub enum ServerError {
    Engine(EngineError),
    Unauthorized(String),
    Internal(String),
    Generic(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::Forbidden(_) => StatusCode::FORBIDDEN,
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        EngineError::Database(_) | EngineError::PasswordHash(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        EngineError::InvalidAmount(_)
        | EngineError::InvalidName(_)
        | EngineError::InvalidPeriod(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        EngineError::PasswordHash(hash_err) => {
            tracing::error!("password hashing error: {hash_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Unauthorized(err) => (StatusCode::UNAUTHORIZED, err),
            ServerError::Internal(err) => {
                tracing::error!("internal error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
        };

        (status, Json(Envelope::failure(message))).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}
