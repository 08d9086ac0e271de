//! Engine records to wire DTOs.

use api_types::{
    budget::BudgetView, category::CategoryView, expense::ExpenseView, income::IncomeView,
    user::UserView,
};
use engine::{Budget, BudgetRecord, Category, CategoryRecord, Expense, Income, Role, User};

pub(crate) fn user(user: &User) -> UserView {
    UserView {
        id: user.id.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        full_name: user.full_name(),
        email: user.email.clone(),
        image: user.image.clone(),
        role: match user.role {
            Role::Admin => api_types::user::Role::Admin,
            Role::User => api_types::user::Role::User,
        },
        created_at: user.created_at,
        updated_at: user.updated_at,
    }
}

pub(crate) fn budget(budget: Budget) -> BudgetView {
    BudgetView {
        id: budget.id,
        amount: budget.amount,
        month: budget.month,
        year: budget.year,
        created_at: budget.created_at,
        updated_at: budget.updated_at,
        expenses: None,
        incomes: None,
    }
}

pub(crate) fn budget_record(record: BudgetRecord) -> BudgetView {
    BudgetView {
        expenses: Some(record.expenses.into_iter().map(expense).collect()),
        incomes: Some(record.incomes.into_iter().map(income).collect()),
        ..budget(record.budget)
    }
}

pub(crate) fn category(category: Category) -> CategoryView {
    CategoryView {
        id: category.id,
        name: category.name,
        description: category.description,
        created_at: category.created_at,
        updated_at: category.updated_at,
        expenses: None,
    }
}

pub(crate) fn category_record(record: CategoryRecord) -> CategoryView {
    CategoryView {
        expenses: Some(record.expenses.into_iter().map(expense).collect()),
        ..category(record.category)
    }
}

pub(crate) fn income(income: Income) -> IncomeView {
    IncomeView {
        id: income.id,
        budget_id: income.budget_id,
        amount: income.amount,
        month: income.month,
        year: income.year,
        source: income.source,
        created_at: income.created_at,
        updated_at: income.updated_at,
    }
}

pub(crate) fn expense(expense: Expense) -> ExpenseView {
    ExpenseView {
        id: expense.id,
        budget_id: expense.budget_id,
        category_id: expense.category_id,
        amount: expense.amount,
        description: expense.description,
        created_at: expense.created_at,
        updated_at: expense.updated_at,
    }
}
