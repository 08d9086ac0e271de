//! Expense API endpoints

use api_types::{
    Envelope,
    expense::{ExpenseNew, ExpenseUpdate, ExpenseView},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{ExpensePatch, User};

use crate::{ServerError, server::ServerState, views};

/// Handle requests for recording an expense
pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<Envelope<ExpenseView>>), ServerError> {
    let expense = state
        .engine
        .new_expense(
            &user.id,
            &payload.budget_id,
            &payload.category_id,
            payload.amount,
            payload.description.as_deref(),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(
            "Expense created successfully",
            views::expense(expense),
        )),
    ))
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Envelope<Vec<ExpenseView>>>, ServerError> {
    let expenses = state.engine.expenses(&user.id).await?;

    Ok(Json(Envelope::ok(
        "Expenses retrieved successfully",
        expenses.into_iter().map(views::expense).collect(),
    )))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(expense_id): Path<String>,
) -> Result<Json<Envelope<ExpenseView>>, ServerError> {
    let expense = state.engine.expense(&user.id, &expense_id).await?;

    Ok(Json(Envelope::ok(
        "Expense retrieved successfully",
        views::expense(expense),
    )))
}

/// Handle requests for changing an expense, possibly moving it to another
/// budget or category
pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(expense_id): Path<String>,
    Json(payload): Json<ExpenseUpdate>,
) -> Result<Json<Envelope<ExpenseView>>, ServerError> {
    let expense = state
        .engine
        .update_expense(
            &user.id,
            &expense_id,
            ExpensePatch {
                amount: payload.amount,
                description: payload.description,
                budget_id: payload.budget_id,
                category_id: payload.category_id,
            },
        )
        .await?;

    Ok(Json(Envelope::ok(
        "Expense updated successfully",
        views::expense(expense),
    )))
}

pub async fn remove(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(expense_id): Path<String>,
) -> Result<Json<Envelope<()>>, ServerError> {
    state.engine.delete_expense(&user.id, &expense_id).await?;

    Ok(Json(Envelope::ok("Expense deleted successfully", ())))
}
