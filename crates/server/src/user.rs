//! User API endpoints
//!
//! Listing is reserved to admins; a single profile can be read or changed by
//! its owner or by an admin.

use api_types::{
    Envelope,
    user::{UserUpdate, UserView},
};
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use engine::{EngineError, User, UserPatch};

use crate::{ServerError, server::ServerState, views};

fn ensure_self_or_admin(caller: &User, user_id: &str) -> Result<(), ServerError> {
    if caller.id == user_id || caller.is_admin() {
        Ok(())
    } else {
        Err(EngineError::Forbidden("not allowed to access this user".to_string()).into())
    }
}

/// Handle requests for listing every user
pub async fn list(
    Extension(caller): Extension<User>,
    State(state): State<ServerState>,
) -> Result<Json<Envelope<Vec<UserView>>>, ServerError> {
    if !caller.is_admin() {
        return Err(EngineError::Forbidden("admin role required".to_string()).into());
    }
    let users = state.engine.list_users().await?;

    Ok(Json(Envelope::ok(
        "Users retrieved successfully",
        users.iter().map(views::user).collect(),
    )))
}

pub async fn get(
    Extension(caller): Extension<User>,
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
) -> Result<Json<Envelope<UserView>>, ServerError> {
    ensure_self_or_admin(&caller, &user_id)?;
    let user = state.engine.user(&user_id).await?;

    Ok(Json(Envelope::ok(
        "User retrieved successfully",
        views::user(&user),
    )))
}

pub async fn update(
    Extension(caller): Extension<User>,
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
    Json(payload): Json<UserUpdate>,
) -> Result<Json<Envelope<UserView>>, ServerError> {
    ensure_self_or_admin(&caller, &user_id)?;
    let user = state
        .engine
        .update_user(
            &user_id,
            UserPatch {
                first_name: payload.first_name,
                last_name: payload.last_name,
                image: payload.image,
                password: payload.password,
            },
        )
        .await?;

    Ok(Json(Envelope::ok(
        "User updated successfully",
        views::user(&user),
    )))
}

pub async fn remove(
    Extension(caller): Extension<User>,
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
) -> Result<Json<Envelope<()>>, ServerError> {
    ensure_self_or_admin(&caller, &user_id)?;
    state.engine.delete_user(&user_id).await?;
    tracing::info!(user_id = %user_id, deleted_by = %caller.id, "user deleted");

    Ok(Json(Envelope::ok("User deleted successfully", ())))
}
