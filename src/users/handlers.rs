use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::password::hash_password,
    error::AppError,
    extract::ValidatedJson,
    state::AppState,
    store::StoreError,
    users::{
        dto::RegisterRequest,
        repo_types::{PublicUser, User},
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(register))
        .route("/users/:id", get(get_user))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, Json<PublicUser>), AppError> {
    let hash = hash_password(&payload.password)?;
    let user = User::from_registration(payload, hash);

    if let Err(e) = state.store.insert_user(&user).await {
        if let StoreError::Conflict(constraint) = &e {
            warn!(username = %user.username, %constraint, "registration conflict");
        }
        return Err(e.into());
    }

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok((StatusCode::CREATED, Json(user.to_public())))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PublicUser>, AppError> {
    let user = state
        .store
        .find_user_by_id(id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(user.to_public()))
}
