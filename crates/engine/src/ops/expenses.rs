use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Expense, ResultEngine, expenses,
    util::{normalize_optional_text, validate_amount},
};

use super::{Engine, ExpensePatch, with_tx};

impl Engine {
    /// Record an expense. Budget and category must both belong to the user.
    pub async fn new_expense(
        &self,
        user_id: &str,
        budget_id: &str,
        category_id: &str,
        amount: f64,
        description: Option<&str>,
    ) -> ResultEngine<Expense> {
        let amount = validate_amount(amount, "expense")?;
        let now = Utc::now();

        let expense = with_tx!(self, |db_tx| {
            self.require_budget(&db_tx, user_id, budget_id).await?;
            self.require_category(&db_tx, user_id, category_id).await?;
            let model = expenses::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4().to_string()),
                user_id: ActiveValue::Set(user_id.to_string()),
                budget_id: ActiveValue::Set(budget_id.to_string()),
                category_id: ActiveValue::Set(category_id.to_string()),
                amount: ActiveValue::Set(Some(amount)),
                description: ActiveValue::Set(normalize_optional_text(description)),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;
            Ok(Expense::from(model))
        })?;

        tracing::info!(expense_id = %expense.id, "expense created");
        Ok(expense)
    }

    /// List the expenses of a user, oldest first.
    pub async fn expenses(&self, user_id: &str) -> ResultEngine<Vec<Expense>> {
        Ok(expenses::Entity::find()
            .filter(expenses::Column::UserId.eq(user_id.to_string()))
            .order_by_asc(expenses::Column::CreatedAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Expense::from)
            .collect())
    }

    pub async fn expense(&self, user_id: &str, expense_id: &str) -> ResultEngine<Expense> {
        with_tx!(self, |db_tx| {
            let model = self.require_expense(&db_tx, user_id, expense_id).await?;
            Ok(Expense::from(model))
        })
    }

    pub async fn update_expense(
        &self,
        user_id: &str,
        expense_id: &str,
        patch: ExpensePatch,
    ) -> ResultEngine<Expense> {
        let amount = patch
            .amount
            .map(|amount| validate_amount(amount, "expense"))
            .transpose()?;

        with_tx!(self, |db_tx| {
            let model = self.require_expense(&db_tx, user_id, expense_id).await?;
            let mut active: expenses::ActiveModel = model.into();
            if let Some(budget_id) = patch.budget_id.as_deref() {
                self.require_budget(&db_tx, user_id, budget_id).await?;
                active.budget_id = ActiveValue::Set(budget_id.to_string());
            }
            if let Some(category_id) = patch.category_id.as_deref() {
                self.require_category(&db_tx, user_id, category_id).await?;
                active.category_id = ActiveValue::Set(category_id.to_string());
            }
            if let Some(amount) = amount {
                active.amount = ActiveValue::Set(Some(amount));
            }
            if let Some(description) = patch.description.as_deref() {
                active.description = ActiveValue::Set(normalize_optional_text(Some(description)));
            }
            active.updated_at = ActiveValue::Set(Utc::now());
            let model = active.update(&db_tx).await?;
            Ok(Expense::from(model))
        })
    }

    pub async fn delete_expense(&self, user_id: &str, expense_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_expense(&db_tx, user_id, expense_id).await?;
            expenses::Entity::delete_by_id(expense_id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }
}
