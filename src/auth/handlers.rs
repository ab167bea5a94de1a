use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        extractors::{BasicCredentials, CurrentUser},
        password, Authenticatable,
    },
    error::AppError,
    state::AppState,
    tokens::{repo_types::TokenResponse, services::issue_token},
    users::repo_types::PublicUser,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/me", get(get_me))
}

#[instrument(skip(state, credentials))]
pub async fn login(
    State(state): State<AppState>,
    credentials: BasicCredentials,
) -> Result<Json<TokenResponse>, AppError> {
    let username = credentials.username.to_lowercase();

    let user = match state.store.find_user_by_username(&username).await? {
        Some(u) => u,
        None => {
            password::verify_dummy(&credentials.password);
            warn!(%username, "login unknown username");
            return Err(AppError::Unauthorized);
        }
    };

    match user.verify(&credentials.password) {
        Ok(true) => {}
        Ok(false) => {
            warn!(user_id = %user.id, "login invalid password");
            return Err(AppError::Unauthorized);
        }
        Err(e) => {
            error!(error = %e, user_id = %user.id, "stored password hash unusable");
            return Err(AppError::Unauthorized);
        }
    }

    let token = issue_token(state.store.as_ref(), &user).await?;

    info!(user_id = %user.id, token_id = %token.id, "user logged in");
    Ok(Json(TokenResponse {
        id: token.id,
        value: token.value,
        user: user.to_public(),
    }))
}

#[instrument(skip_all)]
pub async fn get_me(CurrentUser(user): CurrentUser) -> Json<PublicUser> {
    Json(user.to_public())
}
