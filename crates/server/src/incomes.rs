//! Income API endpoints

use api_types::{
    Envelope,
    income::{IncomeFilter, IncomeNew, IncomeUpdate, IncomeView},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{IncomePatch, User};

use crate::{ServerError, server::ServerState, views};

/// Handle requests for recording an income against a budget
pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<IncomeNew>,
) -> Result<(StatusCode, Json<Envelope<IncomeView>>), ServerError> {
    let income = state
        .engine
        .new_income(
            &user.id,
            &payload.budget_id,
            payload.amount,
            &payload.month,
            payload.year,
            &payload.source,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(
            "Income created successfully",
            views::income(income),
        )),
    ))
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Query(filter): Query<IncomeFilter>,
) -> Result<Json<Envelope<Vec<IncomeView>>>, ServerError> {
    let incomes = state
        .engine
        .incomes(&user.id, filter.month.as_deref(), filter.year)
        .await?;

    Ok(Json(Envelope::ok(
        "Incomes retrieved successfully",
        incomes.into_iter().map(views::income).collect(),
    )))
}

pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(income_id): Path<String>,
) -> Result<Json<Envelope<IncomeView>>, ServerError> {
    let income = state.engine.income(&user.id, &income_id).await?;

    Ok(Json(Envelope::ok(
        "Income retrieved successfully",
        views::income(income),
    )))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(income_id): Path<String>,
    Json(payload): Json<IncomeUpdate>,
) -> Result<Json<Envelope<IncomeView>>, ServerError> {
    let income = state
        .engine
        .update_income(
            &user.id,
            &income_id,
            IncomePatch {
                amount: payload.amount,
                month: payload.month,
                year: payload.year,
                source: payload.source,
                budget_id: payload.budget_id,
            },
        )
        .await?;

    Ok(Json(Envelope::ok(
        "Income updated successfully",
        views::income(income),
    )))
}

pub async fn remove(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(income_id): Path<String>,
) -> Result<Json<Envelope<()>>, ServerError> {
    state.engine.delete_income(&user.id, &income_id).await?;

    Ok(Json(Envelope::ok("Income deleted successfully", ())))
}
