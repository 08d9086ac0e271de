use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    Budget, Category, Expense, Income, ResultEngine, Snapshot, User, budgets, categories,
    expenses, incomes,
};

use super::{Engine, with_tx};

impl Engine {
    /// Load everything `user_id` owns as one consistent [`Snapshot`].
    ///
    /// All collections are read inside the same transaction and ordered by
    /// creation time.
    pub async fn snapshot(&self, user_id: &str) -> ResultEngine<Snapshot> {
        with_tx!(self, |db_tx| {
            let user = User::try_from(&self.require_user(&db_tx, user_id).await?)?;

            let budgets = budgets::Entity::find()
                .filter(budgets::Column::UserId.eq(user_id.to_string()))
                .order_by_asc(budgets::Column::CreatedAt)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Budget::from)
                .collect();
            let categories = categories::Entity::find()
                .filter(categories::Column::UserId.eq(user_id.to_string()))
                .order_by_asc(categories::Column::CreatedAt)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Category::from)
                .collect();
            let incomes = incomes::Entity::find()
                .filter(incomes::Column::UserId.eq(user_id.to_string()))
                .order_by_asc(incomes::Column::CreatedAt)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Income::from)
                .collect();
            let expenses = expenses::Entity::find()
                .filter(expenses::Column::UserId.eq(user_id.to_string()))
                .order_by_asc(expenses::Column::CreatedAt)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(Expense::from)
                .collect();

            Ok(Snapshot::assemble(
                user, budgets, categories, incomes, expenses,
            ))
        })
    }
}
