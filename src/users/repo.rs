use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use super::stats::UserStats;
use crate::auth::Identity;
use crate::error::ApiError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
}

/// Subscription descriptor as the billing side reports it. `tier` is kept as
/// a free string: anything other than exactly "premium" counts as free.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub tier: String,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub expires_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub customer_ref: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub external_id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub preferences: Option<Json<Preferences>>,
    pub subscription: Option<Json<Subscription>>,
    pub stats: Json<UserStats>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

pub async fn find_by_external_id(db: &PgPool, external_id: &str) -> anyhow::Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT * FROM users WHERE external_id = $1
        "#,
    )
    .bind(external_id)
    .fetch_optional(db)
    .await?;
    Ok(user)
}

/// Resolves the caller's profile row; a valid token without a synced profile
/// is a not-found, not an auth failure.
pub async fn require_user(db: &PgPool, identity: &Identity) -> Result<User, ApiError> {
    find_by_external_id(db, &identity.subject)
        .await?
        .ok_or_else(|| ApiError::NotFound("User profile not found".into()))
}

/// First-sign-in upsert keyed on the provider's stable id. Email and name are
/// refreshed from the token on every sync.
pub async fn sync(db: &PgPool, identity: &Identity) -> anyhow::Result<User> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (external_id, email, first_name, last_name, stats)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (external_id) DO UPDATE
        SET email = EXCLUDED.email,
            first_name = COALESCE(EXCLUDED.first_name, users.first_name),
            last_name = COALESCE(EXCLUDED.last_name, users.last_name),
            updated_at = now()
        RETURNING *
        "#,
    )
    .bind(&identity.subject)
    .bind(&identity.email)
    .bind(&identity.given_name)
    .bind(&identity.family_name)
    .bind(Json(UserStats::default()))
    .fetch_one(db)
    .await?;
    Ok(user)
}

pub async fn update_preferences(
    db: &PgPool,
    user_id: Uuid,
    preferences: &Preferences,
) -> anyhow::Result<User> {
    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users SET preferences = $2, updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(Json(preferences))
    .fetch_one(db)
    .await?;
    Ok(user)
}

pub async fn update_subscription(
    db: &PgPool,
    user_id: Uuid,
    subscription: &Subscription,
) -> anyhow::Result<User> {
    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users SET subscription = $2, updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(Json(subscription))
    .fetch_one(db)
    .await?;
    Ok(user)
}

/// Whole-blob write of the rollup, no version check: concurrent lifecycle
/// operations on the same user are last-write-wins here.
pub async fn patch_stats<'e, E>(db: E, user_id: Uuid, stats: &UserStats) -> anyhow::Result<()>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query(
        r#"
        UPDATE users SET stats = $2, updated_at = now()
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .bind(Json(stats))
    .execute(db)
    .await?;
    Ok(())
}

pub async fn delete(db: &PgPool, user_id: Uuid) -> anyhow::Result<()> {
    // TODO: also remove the user's meals and photo references; today only the
    // profile row goes away and meals are left orphaned.
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(())
}
