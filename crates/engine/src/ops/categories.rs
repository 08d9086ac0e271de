use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Category, CategoryRecord, Expense, ResultEngine, categories, expenses,
    util::{normalize_name, normalize_optional_text},
};

use super::{CategoryPatch, Engine, with_tx};

const CATEGORY_NAME_MAX: usize = 50;

impl Engine {
    pub async fn new_category(
        &self,
        user_id: &str,
        name: &str,
        description: Option<&str>,
    ) -> ResultEngine<Category> {
        let name = normalize_name(name, "category name", 1, CATEGORY_NAME_MAX)?;
        let now = Utc::now();

        let category = with_tx!(self, |db_tx| {
            self.require_user(&db_tx, user_id).await?;
            let model = categories::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4().to_string()),
                user_id: ActiveValue::Set(user_id.to_string()),
                name: ActiveValue::Set(name),
                description: ActiveValue::Set(normalize_optional_text(description)),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;
            Ok(Category::from(model))
        })?;

        tracing::info!(category_id = %category.id, "category created");
        Ok(category)
    }

    pub async fn categories(&self, user_id: &str) -> ResultEngine<Vec<Category>> {
        Ok(categories::Entity::find()
            .filter(categories::Column::UserId.eq(user_id.to_string()))
            .order_by_asc(categories::Column::CreatedAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Category::from)
            .collect())
    }

    /// Return a category with its expenses.
    pub async fn category(
        &self,
        user_id: &str,
        category_id: &str,
    ) -> ResultEngine<CategoryRecord> {
        with_tx!(self, |db_tx| {
            let model = self.require_category(&db_tx, user_id, category_id).await?;
            let expenses = expenses::Entity::find()
                .filter(expenses::Column::CategoryId.eq(category_id.to_string()))
                .order_by_asc(expenses::Column::CreatedAt)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Expense::from)
                .collect();
            Ok(CategoryRecord {
                category: Category::from(model),
                expenses,
            })
        })
    }

    pub async fn update_category(
        &self,
        user_id: &str,
        category_id: &str,
        patch: CategoryPatch,
    ) -> ResultEngine<Category> {
        let name = patch
            .name
            .as_deref()
            .map(|name| normalize_name(name, "category name", 1, CATEGORY_NAME_MAX))
            .transpose()?;

        with_tx!(self, |db_tx| {
            let model = self.require_category(&db_tx, user_id, category_id).await?;
            let mut active: categories::ActiveModel = model.into();
            if let Some(name) = name {
                active.name = ActiveValue::Set(name);
            }
            if let Some(description) = patch.description.as_deref() {
                active.description = ActiveValue::Set(normalize_optional_text(Some(description)));
            }
            active.updated_at = ActiveValue::Set(Utc::now());
            let model = active.update(&db_tx).await?;
            Ok(Category::from(model))
        })
    }

    /// Delete a category and the expenses filed under it.
    pub async fn delete_category(&self, user_id: &str, category_id: &str) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_category(&db_tx, user_id, category_id).await?;
            expenses::Entity::delete_many()
                .filter(expenses::Column::CategoryId.eq(category_id.to_string()))
                .exec(&db_tx)
                .await?;
            categories::Entity::delete_by_id(category_id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }
}
