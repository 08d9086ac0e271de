//! Category API endpoints

use api_types::{
    Envelope,
    category::{CategoryNew, CategoryUpdate, CategoryView},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{CategoryPatch, User};

use crate::{ServerError, server::ServerState, views};

pub async fn create(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Json(payload): Json<CategoryNew>,
) -> Result<(StatusCode, Json<Envelope<CategoryView>>), ServerError> {
    let category = state
        .engine
        .new_category(&user.id, &payload.name, payload.description.as_deref())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(Envelope::ok(
            "Category created successfully",
            views::category(category),
        )),
    ))
}

pub async fn list(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Envelope<Vec<CategoryView>>>, ServerError> {
    let categories = state.engine.categories(&user.id).await?;

    Ok(Json(Envelope::ok(
        "Categories retrieved successfully",
        categories.into_iter().map(views::category).collect(),
    )))
}

/// Handle requests for one category, expenses included
pub async fn get(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(category_id): Path<String>,
) -> Result<Json<Envelope<CategoryView>>, ServerError> {
    let record = state.engine.category(&user.id, &category_id).await?;

    Ok(Json(Envelope::ok(
        "Category retrieved successfully",
        views::category_record(record),
    )))
}

pub async fn update(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(category_id): Path<String>,
    Json(payload): Json<CategoryUpdate>,
) -> Result<Json<Envelope<CategoryView>>, ServerError> {
    let category = state
        .engine
        .update_category(
            &user.id,
            &category_id,
            CategoryPatch {
                name: payload.name,
                description: payload.description,
            },
        )
        .await?;

    Ok(Json(Envelope::ok(
        "Category updated successfully",
        views::category(category),
    )))
}

pub async fn remove(
    Extension(user): Extension<User>,
    State(state): State<ServerState>,
    Path(category_id): Path<String>,
) -> Result<Json<Envelope<()>>, ServerError> {
    state.engine.delete_category(&user.id, &category_id).await?;

    Ok(Json(Envelope::ok("Category deleted successfully", ())))
}
