use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "meal_type", rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

/// Offline-sync state. The lifecycle here only ever writes `synced`; the
/// other values are set by the sync transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "sync_status", rename_all = "lowercase")]
pub enum SyncStatus {
    Synced,
    Pending,
    Conflict,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub place_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Photo {
    pub storage_ref: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub is_primary: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Meal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub rating: f64,
    pub meal_type: MealType,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub location: Option<Json<Location>>,
    pub tags: Vec<String>,
    pub photos: Json<Vec<Photo>>,
    pub is_public: bool,
    pub allow_comments: bool,
    pub likes_count: i32,
    pub comments_count: i32,
    pub shares_count: i32,
    pub sync_status: SyncStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub meal_date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug)]
pub struct NewMeal {
    pub user_id: Uuid,
    pub title: String,
    pub rating: f64,
    pub meal_type: MealType,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub location: Option<Location>,
    pub tags: Vec<String>,
    pub photos: Vec<Photo>,
    pub is_public: bool,
    pub allow_comments: bool,
    pub meal_date: OffsetDateTime,
}

/// Partial update: `None` means "leave the column as it is". There is no way
/// to null out a field through this path.
#[derive(Debug, Default)]
pub struct MealPatch {
    pub title: Option<String>,
    pub rating: Option<f64>,
    pub meal_type: Option<MealType>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub location: Option<Location>,
    pub tags: Option<Vec<String>>,
    pub photos: Option<Vec<Photo>>,
    pub is_public: Option<bool>,
    pub allow_comments: Option<bool>,
    pub meal_date: Option<OffsetDateTime>,
}

pub async fn insert<'e, E>(db: E, new: &NewMeal) -> anyhow::Result<Meal>
where
    E: sqlx::PgExecutor<'e>,
{
    let meal = sqlx::query_as::<_, Meal>(
        r#"
        INSERT INTO meals (user_id, title, rating, meal_type, description, price,
                           currency, location, tags, photos, is_public,
                           allow_comments, sync_status, meal_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, 'synced', $13)
        RETURNING *
        "#,
    )
    .bind(new.user_id)
    .bind(&new.title)
    .bind(new.rating)
    .bind(new.meal_type)
    .bind(&new.description)
    .bind(new.price)
    .bind(&new.currency)
    .bind(new.location.as_ref().map(Json))
    .bind(&new.tags)
    .bind(Json(&new.photos))
    .bind(new.is_public)
    .bind(new.allow_comments)
    .bind(new.meal_date)
    .fetch_one(db)
    .await?;
    Ok(meal)
}

pub async fn get(db: &PgPool, id: Uuid) -> anyhow::Result<Option<Meal>> {
    let meal = sqlx::query_as::<_, Meal>("SELECT * FROM meals WHERE id = $1")
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(meal)
}

/// Caller-scoped page, newest meal first. The type filter picks the
/// `(user_id, meal_type, meal_date)` index instead of the plain date one; the
/// logical ordering is the same either way.
pub async fn list_by_user(
    db: &PgPool,
    user_id: Uuid,
    meal_type: Option<MealType>,
    limit: i64,
) -> anyhow::Result<Vec<Meal>> {
    let rows = match meal_type {
        Some(mt) => {
            sqlx::query_as::<_, Meal>(
                r#"
                SELECT * FROM meals
                WHERE user_id = $1 AND meal_type = $2
                ORDER BY meal_date DESC
                LIMIT $3
                "#,
            )
            .bind(user_id)
            .bind(mt)
            .bind(limit)
            .fetch_all(db)
            .await?
        }
        None => {
            sqlx::query_as::<_, Meal>(
                r#"
                SELECT * FROM meals
                WHERE user_id = $1
                ORDER BY meal_date DESC
                LIMIT $2
                "#,
            )
            .bind(user_id)
            .bind(limit)
            .fetch_all(db)
            .await?
        }
    };
    Ok(rows)
}

pub async fn search_titles(
    db: &PgPool,
    user_id: Uuid,
    term: &str,
    limit: i64,
) -> anyhow::Result<Vec<Meal>> {
    let rows = sqlx::query_as::<_, Meal>(
        r#"
        SELECT * FROM meals
        WHERE user_id = $1 AND title ILIKE $2
        LIMIT $3
        "#,
    )
    .bind(user_id)
    .bind(format!("%{}%", term))
    .bind(limit)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn update(db: &PgPool, id: Uuid, patch: &MealPatch) -> anyhow::Result<Meal> {
    let meal = sqlx::query_as::<_, Meal>(
        r#"
        UPDATE meals SET
            title = COALESCE($2, title),
            rating = COALESCE($3, rating),
            meal_type = COALESCE($4, meal_type),
            description = COALESCE($5, description),
            price = COALESCE($6, price),
            currency = COALESCE($7, currency),
            location = COALESCE($8, location),
            tags = COALESCE($9, tags),
            photos = COALESCE($10, photos),
            is_public = COALESCE($11, is_public),
            allow_comments = COALESCE($12, allow_comments),
            meal_date = COALESCE($13, meal_date),
            updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(&patch.title)
    .bind(patch.rating)
    .bind(patch.meal_type)
    .bind(&patch.description)
    .bind(patch.price)
    .bind(&patch.currency)
    .bind(patch.location.as_ref().map(Json))
    .bind(&patch.tags)
    .bind(patch.photos.as_ref().map(Json))
    .bind(patch.is_public)
    .bind(patch.allow_comments)
    .bind(patch.meal_date)
    .fetch_one(db)
    .await?;
    Ok(meal)
}

pub async fn delete<'e, E>(db: E, id: Uuid) -> anyhow::Result<()>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query("DELETE FROM meals WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(())
}
