use chrono::Utc;
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    Budget, BudgetRecord, EngineError, Expense, Income, ResultEngine, budgets, expenses, incomes,
    util::{normalize_month, validate_amount, validate_year},
};

use super::{BudgetPatch, Engine, with_tx};

impl Engine {
    /// Open a budget for one month of one year.
    ///
    /// A user has at most one budget per `(month, year)`.
    pub async fn new_budget(
        &self,
        user_id: &str,
        amount: f64,
        month: &str,
        year: i32,
    ) -> ResultEngine<Budget> {
        let amount = validate_amount(amount, "budget")?;
        let month = normalize_month(month)?;
        let year = validate_year(year)?;
        let now = Utc::now();

        let budget = with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            self.ensure_free_period(&db_tx, user_id, &month, year, None)
                .await?;

            let model = budgets::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4().to_string()),
                user_id: ActiveValue::Set(user_id.to_string()),
                amount: ActiveValue::Set(Some(amount)),
                month: ActiveValue::Set(month),
                year: ActiveValue::Set(year),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;
            Ok(Budget::from(model))
        })?;

        tracing::info!(budget_id = %budget.id, "budget created");
        Ok(budget)
    }

    /// List the budgets of a user, oldest first. `month` is matched
    /// case-insensitively.
    pub async fn budgets(
        &self,
        user_id: &str,
        year: Option<i32>,
        month: Option<&str>,
    ) -> ResultEngine<Vec<Budget>> {
        let mut query = budgets::Entity::find()
            .filter(budgets::Column::UserId.eq(user_id.to_string()))
            .order_by_asc(budgets::Column::CreatedAt);
        if let Some(year) = year {
            query = query.filter(budgets::Column::Year.eq(year));
        }
        if let Some(month) = month.map(str::trim).filter(|m| !m.is_empty()) {
            query = query.filter(budgets::Column::Month.eq(month.to_lowercase()));
        }

        Ok(query
            .all(&self.database)
            .await?
            .into_iter()
            .map(Budget::from)
            .collect())
    }

    /// Return a budget with its expenses and incomes.
    pub async fn budget(&self, user_id: &str, budget_id: &str) -> ResultEngine<BudgetRecord> {
        with_tx!(self, |db_tx| {
            let model = self.require_budget(&db_tx, user_id, budget_id).await?;
            let expenses = expenses::Entity::find()
                .filter(expenses::Column::BudgetId.eq(budget_id.to_string()))
                .order_by_asc(expenses::Column::CreatedAt)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Expense::from)
                .collect();
            let incomes = incomes::Entity::find()
                .filter(incomes::Column::BudgetId.eq(budget_id.to_string()))
                .order_by_asc(incomes::Column::CreatedAt)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Income::from)
                .collect();

            Ok(BudgetRecord {
                budget: Budget::from(model),
                expenses,
                incomes,
            })
        })
    }

    pub async fn update_budget(
        &self,
        user_id: &str,
        budget_id: &str,
        patch: BudgetPatch,
    ) -> ResultEngine<Budget> {
        let amount = patch
            .amount
            .map(|amount| validate_amount(amount, "budget"))
            .transpose()?;
        let month = patch.month.as_deref().map(normalize_month).transpose()?;
        let year = patch.year.map(validate_year).transpose()?;

        with_tx!(self, |db_tx| {
            let model = self.require_budget(&db_tx, user_id, budget_id).await?;
            let target_month = month.clone().unwrap_or_else(|| model.month.clone());
            let target_year = year.unwrap_or(model.year);
            if target_month != model.month || target_year != model.year {
                self.ensure_free_period(
                    &db_tx,
                    user_id,
                    &target_month,
                    target_year,
                    Some(budget_id),
                )
                .await?;
            }

            let mut active: budgets::ActiveModel = model.into();
            if let Some(amount) = amount {
                active.amount = ActiveValue::Set(Some(amount));
            }
            active.month = ActiveValue::Set(target_month);
            active.year = ActiveValue::Set(target_year);
            active.updated_at = ActiveValue::Set(Utc::now());
            let model = active.update(&db_tx).await?;
            Ok(Budget::from(model))
        })
    }

    /// Delete a budget together with its expenses and incomes.
    pub async fn delete_budget(&self, user_id: &str, budget_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_budget(&db_tx, user_id, budget_id).await?;
            expenses::Entity::delete_many()
                .filter(expenses::Column::BudgetId.eq(budget_id.to_string()))
                .exec(&db_tx)
                .await?;
            incomes::Entity::delete_many()
                .filter(incomes::Column::BudgetId.eq(budget_id.to_string()))
                .exec(&db_tx)
                .await?;
            budgets::Entity::delete_by_id(budget_id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }

    async fn ensure_free_period(
        &self,
        db: &DatabaseTransaction,
        user_id: &str,
        month: &str,
        year: i32,
        except: Option<&str>,
    ) -> ResultEngine<()> {
        let mut query = budgets::Entity::find()
            .filter(budgets::Column::UserId.eq(user_id.to_string()))
            .filter(budgets::Column::Month.eq(month.to_string()))
            .filter(budgets::Column::Year.eq(year));
        if let Some(except) = except {
            query = query.filter(budgets::Column::Id.ne(except.to_string()));
        }
        if query.one(db).await?.is_some() {
            return Err(EngineError::ExistingKey(format!("budget {month} {year}")));
        }
        Ok(())
    }
}
