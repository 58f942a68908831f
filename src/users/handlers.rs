use axum::{
    extract::State,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument};

use super::dto::{DeletedResponse, ProfileResponse};
use super::repo::{self, Preferences, Subscription};
use crate::auth::AuthIdentity;
use crate::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/sync", post(sync_user))
        .route("/me", get(get_me).delete(delete_me))
        .route("/me/preferences", put(update_preferences))
        .route("/me/subscription", put(update_subscription))
}

/// Called by the client right after sign-in; creates the profile on first
/// contact and refreshes email/name afterwards.
#[instrument(skip(state))]
async fn sync_user(
    State(state): State<AppState>,
    AuthIdentity(identity): AuthIdentity,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = repo::sync(&state.db, &identity).await?;
    info!(user_id = %user.id, "profile synced");
    Ok(Json(user.into()))
}

#[instrument(skip(state))]
async fn get_me(
    State(state): State<AppState>,
    AuthIdentity(identity): AuthIdentity,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = repo::require_user(&state.db, &identity).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, body))]
async fn update_preferences(
    State(state): State<AppState>,
    AuthIdentity(identity): AuthIdentity,
    Json(body): Json<Preferences>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = repo::require_user(&state.db, &identity).await?;
    let user = repo::update_preferences(&state.db, user.id, &body).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, body))]
async fn update_subscription(
    State(state): State<AppState>,
    AuthIdentity(identity): AuthIdentity,
    Json(body): Json<Subscription>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let user = repo::require_user(&state.db, &identity).await?;
    let user = repo::update_subscription(&state.db, user.id, &body).await?;
    info!(user_id = %user.id, tier = %body.tier, "subscription updated");
    Ok(Json(user.into()))
}

#[instrument(skip(state))]
async fn delete_me(
    State(state): State<AppState>,
    AuthIdentity(identity): AuthIdentity,
) -> Result<Json<DeletedResponse>, ApiError> {
    let user = repo::require_user(&state.db, &identity).await?;
    repo::delete(&state.db, user.id).await?;
    info!(user_id = %user.id, "account deleted");
    Ok(Json(DeletedResponse { deleted: true }))
}
