use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Uniform wrapper around every JSON response.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub message: String,
    pub data: T,
    pub status: bool,
}

impl<T> Envelope<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data,
            status: true,
        }
    }
}

impl Envelope<()> {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            data: (),
            status: false,
        }
    }
}

pub mod user {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Role {
        Admin,
        User,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct UserView {
        pub id: String,
        pub first_name: String,
        pub last_name: String,
        pub full_name: String,
        pub email: String,
        pub image: Option<String>,
        pub role: Role,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    /// Partial update; absent fields are left untouched.
    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct UserUpdate {
        pub first_name: Option<String>,
        pub last_name: Option<String>,
        pub image: Option<String>,
        pub password: Option<String>,
    }
}

pub mod auth {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Register {
        pub first_name: String,
        pub last_name: String,
        pub email: String,
        pub password: String,
        pub image: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SignIn {
        pub email: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Session {
        pub access_token: String,
        /// Always `Bearer`.
        pub token_type: String,
        /// Token lifetime in seconds.
        pub expires_in: u64,
        pub user: super::user::UserView,
    }
}

pub mod budget {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetNew {
        pub amount: f64,
        pub month: String,
        pub year: i32,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct BudgetUpdate {
        pub amount: Option<f64>,
        pub month: Option<String>,
        pub year: Option<i32>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct BudgetFilter {
        pub year: Option<i32>,
        pub month: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct BudgetView {
        pub id: String,
        pub amount: Option<f64>,
        pub month: String,
        pub year: i32,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
        /// Present only on single-budget reads.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub expenses: Option<Vec<super::expense::ExpenseView>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub incomes: Option<Vec<super::income::IncomeView>>,
    }
}

pub mod category {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
        pub description: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CategoryUpdate {
        pub name: Option<String>,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CategoryView {
        pub id: String,
        pub name: String,
        pub description: Option<String>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        pub expenses: Option<Vec<super::expense::ExpenseView>>,
    }
}

pub mod income {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct IncomeNew {
        pub amount: f64,
        pub month: String,
        pub year: i32,
        pub source: String,
        pub budget_id: String,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct IncomeUpdate {
        pub amount: Option<f64>,
        pub month: Option<String>,
        pub year: Option<i32>,
        pub source: Option<String>,
        pub budget_id: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct IncomeFilter {
        pub month: Option<String>,
        pub year: Option<i32>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct IncomeView {
        pub id: String,
        pub budget_id: String,
        pub amount: Option<f64>,
        pub month: String,
        pub year: i32,
        pub source: String,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
}

pub mod expense {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ExpenseNew {
        pub amount: f64,
        pub description: Option<String>,
        pub budget_id: String,
        pub category_id: String,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ExpenseUpdate {
        pub amount: Option<f64>,
        pub description: Option<String>,
        pub budget_id: Option<String>,
        pub category_id: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ExpenseView {
        pub id: String,
        pub budget_id: String,
        pub category_id: String,
        pub amount: Option<f64>,
        pub description: Option<String>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
}

pub mod report {
    use super::*;

    /// Query string of `GET /reports`. Both fields are required; they are
    /// optional here so a missing one can be reported in the envelope.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct PeriodQuery {
        pub year: Option<i32>,
        pub month: Option<String>,
    }

    /// Body of `POST /reports/custom-report`. Both bounds are inclusive.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct CustomRange {
        pub start_date: DateTime<Utc>,
        pub end_date: DateTime<Utc>,
    }
}
