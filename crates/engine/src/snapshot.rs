//! Read-only view of everything a user owns.
//!
//! A [`Snapshot`] is loaded once per report request and handed to the
//! aggregations in [`crate::reports`] by reference. It owns its data, so
//! nothing in the store can change underneath a running report.

use std::collections::HashMap;

use serde::Serialize;

use crate::{Budget, Category, Expense, Income, User};

/// A budget together with the records attached to it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BudgetRecord {
    #[serde(flatten)]
    pub budget: Budget,
    pub expenses: Vec<Expense>,
    pub incomes: Vec<Income>,
}

/// A category together with its expenses.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CategoryRecord {
    #[serde(flatten)]
    pub category: Category,
    pub expenses: Vec<Expense>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Snapshot {
    pub user: User,
    pub budgets: Vec<BudgetRecord>,
    pub categories: Vec<CategoryRecord>,
    pub incomes: Vec<Income>,
    pub expenses: Vec<Expense>,
}

impl Snapshot {
    /// Build the hydrated graph from flat record lists.
    ///
    /// Children keep the order of the input lists. Records pointing to a
    /// parent that is not part of the snapshot only appear in the flat
    /// `incomes`/`expenses` collections.
    pub fn assemble(
        user: User,
        budgets: Vec<Budget>,
        categories: Vec<Category>,
        incomes: Vec<Income>,
        expenses: Vec<Expense>,
    ) -> Self {
        let mut budgets: Vec<BudgetRecord> = budgets
            .into_iter()
            .map(|budget| BudgetRecord {
                budget,
                expenses: Vec::new(),
                incomes: Vec::new(),
            })
            .collect();
        let mut categories: Vec<CategoryRecord> = categories
            .into_iter()
            .map(|category| CategoryRecord {
                category,
                expenses: Vec::new(),
            })
            .collect();

        let budget_index: HashMap<String, usize> = budgets
            .iter()
            .enumerate()
            .map(|(index, record)| (record.budget.id.clone(), index))
            .collect();
        let category_index: HashMap<String, usize> = categories
            .iter()
            .enumerate()
            .map(|(index, record)| (record.category.id.clone(), index))
            .collect();

        for expense in &expenses {
            if let Some(&index) = budget_index.get(&expense.budget_id) {
                budgets[index].expenses.push(expense.clone());
            }
            if let Some(&index) = category_index.get(&expense.category_id) {
                categories[index].expenses.push(expense.clone());
            }
        }
        for income in &incomes {
            if let Some(&index) = budget_index.get(&income.budget_id) {
                budgets[index].incomes.push(income.clone());
            }
        }

        Self {
            user,
            budgets,
            categories,
            incomes,
            expenses,
        }
    }

    /// Snapshot of a user that owns nothing yet.
    pub fn empty(user: User) -> Self {
        Self::assemble(user, Vec::new(), Vec::new(), Vec::new(), Vec::new())
    }

    pub fn category_name(&self, category_id: &str) -> Option<&str> {
        self.categories
            .iter()
            .find(|record| record.category.id == category_id)
            .map(|record| record.category.name.as_str())
    }
}
