//! Budget API endpoints

use api_types::{
    Envelope,
    budget::{BudgetFilter, BudgetNew, BudgetUpdate, BudgetView},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{BudgetPatch, User};

use crate::{ServerError, server::ServerState, views};

/// Handle requests for creating a new budget
pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<BudgetNew>,
) -> Result<(StatusCode, Json<Envelope<BudgetView>>), ServerError> {
    let budget = state
        .engine
        .new_budget(&user.id, payload.amount, &payload.month, payload.year)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(
            "Budget created successfully",
            views::budget(budget),
        )),
    ))
}

/// Handle requests for listing budgets, optionally filtered by period
pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(filter): Query<BudgetFilter>,
) -> Result<Json<Envelope<Vec<BudgetView>>>, ServerError> {
    let budgets = state
        .engine
        .budgets(&user.id, filter.year, filter.month.as_deref())
        .await?;

    Ok(Json(Envelope::ok(
        "Budgets retrieved successfully",
        budgets.into_iter().map(views::budget).collect(),
    )))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(budget_id): Path<String>,
) -> Result<Json<Envelope<BudgetView>>, ServerError> {
    let record = state.engine.budget(&user.id, &budget_id).await?;

    Ok(Json(Envelope::ok(
        "Budget retrieved successfully",
        views::budget_record(record),
    )))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(budget_id): Path<String>,
    Json(payload): Json<BudgetUpdate>,
) -> Result<Json<Envelope<BudgetView>>, ServerError> {
    let budget = state
        .engine
        .update_budget(
            &user.id,
            &budget_id,
            BudgetPatch {
                amount: payload.amount,
                month: payload.month,
                year: payload.year,
            },
        )
        .await?;

    Ok(Json(Envelope::ok(
        "Budget updated successfully",
        views::budget(budget),
    )))
}

pub async fn remove(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(budget_id): Path<String>,
) -> Result<Json<Envelope<()>>, ServerError> {
    state.engine.delete_budget(&user.id, &budget_id).await?;

    Ok(Json(Envelope::ok("Budget deleted successfully", ())))
}
