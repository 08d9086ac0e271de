use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Income, ResultEngine, incomes,
    util::{normalize_month, normalize_name, validate_amount, validate_year},
};

use super::{Engine, IncomePatch, with_tx};

const SOURCE_MAX: usize = 50;

impl Engine {
    /// Record an income against one of the user's budgets.
    pub async fn new_income(
        &self,
        user_id: &str,
        budget_id: &str,
        amount: f64,
        month: &str,
        year: i32,
        source: &str,
    ) -> ResultEngine<Income> {
        let amount = validate_amount(amount, "income")?;
        let month = normalize_month(month)?;
        let year = validate_year(year)?;
        let source = normalize_name(source, "income source", 1, SOURCE_MAX)?;
        let now = Utc::now();

        let income = with_tx!(self, |db_tx| {
            self.require_budget(&db_tx, user_id, budget_id).await?;
            let model = incomes::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4().to_string()),
                user_id: ActiveValue::Set(user_id.to_string()),
                budget_id: ActiveValue::Set(budget_id.to_string()),
                amount: ActiveValue::Set(Some(amount)),
                month: ActiveValue::Set(month),
                year: ActiveValue::Set(year),
                source: ActiveValue::Set(source),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;
            Ok(Income::from(model))
        })?;

        tracing::info!(income_id = %income.id, "income created");
        Ok(income)
    }

    /// List the incomes of a user, oldest first.
    pub async fn incomes(
        &self,
        user_id: &str,
        month: Option<&str>,
        year: Option<i32>,
    ) -> ResultEngine<Vec<Income>> {
        let mut query = incomes::Entity::find()
            .filter(incomes::Column::UserId.eq(user_id.to_string()))
            .order_by_asc(incomes::Column::CreatedAt);
        if let Some(month) = month.map(str::trim).filter(|m| !m.is_empty()) {
            query = query.filter(incomes::Column::Month.eq(month.to_lowercase()));
        }
        if let Some(year) = year {
            query = query.filter(incomes::Column::Year.eq(year));
        }

        Ok(query
            .all(&self.database)
            .await?
            .into_iter()
            .map(Income::from)
            .collect())
    }

    pub async fn income(&self, user_id: &str, income_id: &str) -> ResultEngine<Income> {
        with_tx!(self, |db_tx| {
            let model = self.require_income(&db_tx, user_id, income_id).await?;
            Ok(Income::from(model))
        })
    }

    pub async fn update_income(
        &self,
        user_id: &str,
        income_id: &str,
        patch: IncomePatch,
    ) -> ResultEngine<Income> {
        let amount = patch
            .amount
            .map(|amount| validate_amount(amount, "income"))
            .transpose()?;
        let month = patch.month.as_deref().map(normalize_month).transpose()?;
        let year = patch.year.map(validate_year).transpose()?;
        let source = patch
            .source
            .as_deref()
            .map(|source| normalize_name(source, "income source", 1, SOURCE_MAX))
            .transpose()?;

        with_tx!(self, |db_tx| {
            let model = self.require_income(&db_tx, user_id, income_id).await?;
            let mut active: incomes::ActiveModel = model.into();
            if let Some(budget_id) = patch.budget_id.as_deref() {
                self.require_budget(&db_tx, user_id, budget_id).await?;
                active.budget_id = ActiveValue::Set(budget_id.to_string());
            }
            if let Some(amount) = amount {
                active.amount = ActiveValue::Set(Some(amount));
            }
            if let Some(month) = month {
                active.month = ActiveValue::Set(month);
            }
            if let Some(year) = year {
                active.year = ActiveValue::Set(year);
            }
            if let Some(source) = source {
                active.source = ActiveValue::Set(source);
            }
            active.updated_at = ActiveValue::Set(Utc::now());
            let model = active.update(&db_tx).await?;
            Ok(Income::from(model))
        })
    }

    pub async fn delete_income(&self, user_id: &str, income_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_income(&db_tx, user_id, income_id).await?;
            incomes::Entity::delete_by_id(income_id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }
}
