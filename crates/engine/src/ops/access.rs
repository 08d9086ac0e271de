//! Ownership checks shared by the record operations.
//!
//! A record that exists but belongs to someone else is reported exactly like
//! a missing one.

use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*};

use crate::{EngineError, ResultEngine, budgets, categories, expenses, incomes, users};

use super::Engine;

/// Generates a `require_*` method loading a record owned by `user_id`.
macro_rules! impl_require_owned {
    ($require_fn:ident, $module:ident, $err_msg:literal) => {
        pub(super) async fn $require_fn(
            &self,
            db: &DatabaseTransaction,
            user_id: &str,
            id: &str,
        ) -> ResultEngine<$module::Model> {
            $module::Entity::find_by_id(id.to_string())
                .filter($module::Column::UserId.eq(user_id.to_string()))
                .one(db)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound($err_msg.to_string()))
        }
    };
}

impl Engine {
    impl_require_owned!(require_budget, budgets, "budget not exists");
    impl_require_owned!(require_category, categories, "category not exists");
    impl_require_owned!(require_income, incomes, "income not exists");
    impl_require_owned!(require_expense, expenses, "expense not exists");

    pub(super) async fn require_user(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
    ) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(user_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }
}
