use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::dto::{
    CreateMealRequest, CreatedMealResponse, DeleteMealResponse, ListQuery, SearchQuery,
    UpdateMealRequest,
};
use super::repo::Meal;
use super::service;
use crate::auth::AuthIdentity;
use crate::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/meals", get(list_meals).post(create_meal))
        .route("/meals/search", get(search_meals))
        .route(
            "/meals/:id",
            get(get_meal).patch(update_meal).delete(delete_meal),
        )
}

#[instrument(skip(state, body))]
async fn create_meal(
    State(state): State<AppState>,
    AuthIdentity(identity): AuthIdentity,
    Json(body): Json<CreateMealRequest>,
) -> Result<(StatusCode, HeaderMap, Json<CreatedMealResponse>), ApiError> {
    let meal = service::create_meal(&state.db, &identity, body).await?;

    let mut headers = HeaderMap::new();
    headers.insert(
        axum::http::header::LOCATION,
        format!("/api/v1/meals/{}", meal.id)
            .parse()
            .map_err(anyhow::Error::from)?,
    );

    Ok((
        StatusCode::CREATED,
        headers,
        Json(CreatedMealResponse {
            id: meal.id,
            created_at: meal.created_at,
        }),
    ))
}

#[instrument(skip(state))]
async fn get_meal(
    State(state): State<AppState>,
    AuthIdentity(identity): AuthIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<Meal>, ApiError> {
    let meal = service::get_meal(&state.db, &identity, id).await?;
    Ok(Json(meal))
}

#[instrument(skip(state))]
async fn list_meals(
    State(state): State<AppState>,
    AuthIdentity(identity): AuthIdentity,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Meal>>, ApiError> {
    let meals = service::list_meals(&state.db, &identity, query).await?;
    Ok(Json(meals))
}

#[instrument(skip(state, body))]
async fn update_meal(
    State(state): State<AppState>,
    AuthIdentity(identity): AuthIdentity,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateMealRequest>,
) -> Result<Json<Meal>, ApiError> {
    let meal = service::update_meal(&state.db, &identity, id, body).await?;
    Ok(Json(meal))
}

#[instrument(skip(state))]
async fn delete_meal(
    State(state): State<AppState>,
    AuthIdentity(identity): AuthIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteMealResponse>, ApiError> {
    service::delete_meal(&state.db, &identity, id).await?;
    Ok(Json(DeleteMealResponse { deleted: true }))
}

#[instrument(skip(state))]
async fn search_meals(
    State(state): State<AppState>,
    AuthIdentity(identity): AuthIdentity,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Meal>>, ApiError> {
    let meals = service::search_meals(&state.db, &identity, query).await?;
    Ok(Json(meals))
}
