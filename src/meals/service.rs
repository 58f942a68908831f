use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use super::dto::{CreateMealRequest, ListQuery, SearchQuery, UpdateMealRequest};
use super::policy::{check_tag_limit, Tier};
use super::repo::{self, Meal, MealPatch, NewMeal};
use super::validate;
use crate::auth::Identity;
use crate::error::ApiError;
use crate::users::repo::{self as users_repo, User};

pub async fn create_meal(
    db: &PgPool,
    identity: &Identity,
    req: CreateMealRequest,
) -> Result<Meal, ApiError> {
    let user = users_repo::require_user(db, identity).await?;

    validate::title(&req.title)?;
    validate::rating(req.rating)?;
    if let Some(d) = &req.description {
        validate::description(d)?;
    }
    if let Some(c) = &req.currency {
        validate::currency(c)?;
    }
    check_tag_limit(user_tier(&user), req.tags.len())?;

    let new = NewMeal {
        user_id: user.id,
        title: req.title.trim().to_owned(),
        rating: req.rating,
        meal_type: req.meal_type,
        description: req.description.as_deref().map(|d| d.trim().to_owned()),
        price: req.price,
        currency: Some(resolve_currency(req.currency.as_deref(), &user)),
        location: req.location,
        tags: normalize_tags(&req.tags),
        photos: req.photos,
        is_public: req.is_public,
        allow_comments: req.allow_comments,
        meal_date: req.meal_date.unwrap_or_else(OffsetDateTime::now_utc),
    };

    // The record write and the rollup patch commit together.
    let mut tx = db.begin().await?;
    let meal = repo::insert(&mut *tx, &new).await?;
    let stats = user.stats.0.after_create(
        meal.rating,
        meal.price,
        meal.meal_date,
        meal.location.as_ref().map(|l| l.0.name.as_str()),
    );
    users_repo::patch_stats(&mut *tx, user.id, &stats).await?;
    tx.commit().await?;

    info!(user_id = %user.id, meal_id = %meal.id, "meal created");
    Ok(meal)
}

pub async fn get_meal(db: &PgPool, identity: &Identity, id: Uuid) -> Result<Meal, ApiError> {
    let user = users_repo::require_user(db, identity).await?;
    let meal = repo::get(db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Meal not found".into()))?;
    if meal.user_id != user.id {
        return Err(ApiError::AccessDenied);
    }
    Ok(meal)
}

pub async fn list_meals(
    db: &PgPool,
    identity: &Identity,
    query: ListQuery,
) -> Result<Vec<Meal>, ApiError> {
    let user = users_repo::require_user(db, identity).await?;
    let rows = repo::list_by_user(db, user.id, query.meal_type, query.limit).await?;
    // The date window is applied after the limit, so a page can come back
    // short even when more rows in range exist past the cutoff.
    Ok(apply_date_window(rows, query.start_date, query.end_date))
}

pub async fn update_meal(
    db: &PgPool,
    identity: &Identity,
    id: Uuid,
    req: UpdateMealRequest,
) -> Result<Meal, ApiError> {
    let user = users_repo::require_user(db, identity).await?;
    let existing = repo::get(db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Meal not found".into()))?;
    if existing.user_id != user.id {
        return Err(ApiError::AccessDenied);
    }

    if let Some(t) = &req.title {
        validate::title(t)?;
    }
    if let Some(r) = req.rating {
        validate::rating(r)?;
    }
    if let Some(d) = &req.description {
        validate::description(d)?;
    }
    if let Some(c) = &req.currency {
        validate::currency(c)?;
    }
    if let Some(tags) = &req.tags {
        check_tag_limit(user_tier(&user), tags.len())?;
    }

    let patch = MealPatch {
        title: req.title.as_deref().map(|t| t.trim().to_owned()),
        rating: req.rating,
        meal_type: req.meal_type,
        description: req.description.as_deref().map(|d| d.trim().to_owned()),
        price: req.price,
        currency: req.currency.map(|c| c.to_uppercase()),
        location: req.location,
        tags: req.tags.as_deref().map(normalize_tags),
        photos: req.photos,
        is_public: req.is_public,
        allow_comments: req.allow_comments,
        meal_date: req.meal_date,
    };

    // Edits leave the cached rollup alone; it is maintained on create and
    // delete only, so rating/price changes do not move the averages.
    let meal = repo::update(db, id, &patch).await?;
    info!(user_id = %user.id, meal_id = %meal.id, "meal updated");
    Ok(meal)
}

pub async fn delete_meal(db: &PgPool, identity: &Identity, id: Uuid) -> Result<(), ApiError> {
    let user = users_repo::require_user(db, identity).await?;
    let meal = repo::get(db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Meal not found".into()))?;
    if meal.user_id != user.id {
        return Err(ApiError::AccessDenied);
    }

    let mut tx = db.begin().await?;
    repo::delete(&mut *tx, id).await?;
    let stats = user.stats.0.after_delete(meal.price);
    users_repo::patch_stats(&mut *tx, user.id, &stats).await?;
    tx.commit().await?;

    info!(user_id = %user.id, meal_id = %id, "meal deleted");
    Ok(())
}

pub async fn search_meals(
    db: &PgPool,
    identity: &Identity,
    query: SearchQuery,
) -> Result<Vec<Meal>, ApiError> {
    let user = users_repo::require_user(db, identity).await?;
    let rows = repo::search_titles(db, user.id, &query.q, query.limit).await?;
    let wanted_tags = query
        .tags
        .as_deref()
        .map(parse_tags_param)
        .unwrap_or_default();
    Ok(rows
        .into_iter()
        .filter(|m| query.meal_type.map_or(true, |t| m.meal_type == t))
        .filter(|m| wanted_tags.is_empty() || matches_any_tag(&m.tags, &wanted_tags))
        .collect())
}

fn user_tier(user: &User) -> Tier {
    Tier::from_subscription(user.subscription.as_ref().map(|s| &s.0))
}

fn normalize_tags(tags: &[String]) -> Vec<String> {
    tags.iter().map(|t| t.trim().to_lowercase()).collect()
}

fn resolve_currency(requested: Option<&str>, user: &User) -> String {
    requested
        .map(|c| c.to_uppercase())
        .or_else(|| {
            user.preferences
                .as_ref()
                .and_then(|p| p.0.currency.clone())
        })
        .unwrap_or_else(|| "USD".to_string())
}

fn apply_date_window(
    rows: Vec<Meal>,
    start: Option<OffsetDateTime>,
    end: Option<OffsetDateTime>,
) -> Vec<Meal> {
    rows.into_iter()
        .filter(|m| within_range(m.meal_date, start, end))
        .collect()
}

fn within_range(
    date: OffsetDateTime,
    start: Option<OffsetDateTime>,
    end: Option<OffsetDateTime>,
) -> bool {
    if let Some(s) = start {
        if date < s {
            return false;
        }
    }
    if let Some(e) = end {
        if date > e {
            return false;
        }
    }
    true
}

fn parse_tags_param(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// A meal matches when it carries any of the requested tags.
fn matches_any_tag(meal_tags: &[String], wanted: &[String]) -> bool {
    wanted.iter().any(|w| meal_tags.iter().any(|t| t == w))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meals::repo::{MealType, SyncStatus};
    use crate::users::repo::Preferences;
    use crate::users::stats::UserStats;
    use sqlx::types::Json;
    use time::macros::datetime;

    fn make_user(preferred_currency: Option<&str>) -> User {
        User {
            id: Uuid::new_v4(),
            external_id: "idp|123".into(),
            email: "eater@example.com".into(),
            first_name: None,
            last_name: None,
            preferences: preferred_currency.map(|c| {
                Json(Preferences {
                    currency: Some(c.into()),
                    ..Preferences::default()
                })
            }),
            subscription: None,
            stats: Json(UserStats::default()),
            created_at: OffsetDateTime::UNIX_EPOCH,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn make_meal(meal_date: OffsetDateTime, tags: &[&str]) -> Meal {
        Meal {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "meal".into(),
            rating: 5.0,
            meal_type: MealType::Lunch,
            description: None,
            price: None,
            currency: None,
            location: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            photos: Json(vec![]),
            is_public: false,
            allow_comments: true,
            likes_count: 0,
            comments_count: 0,
            shares_count: 0,
            sync_status: SyncStatus::Synced,
            meal_date,
            created_at: meal_date,
            updated_at: meal_date,
        }
    }

    #[test]
    fn tags_are_trimmed_and_lowercased_in_order() {
        let tags = vec![" Spicy ".to_string(), "VEGAN".to_string(), "ok".to_string()];
        assert_eq!(normalize_tags(&tags), vec!["spicy", "vegan", "ok"]);
    }

    #[test]
    fn currency_prefers_request_then_profile_then_usd() {
        let with_pref = make_user(Some("eur"));
        assert_eq!(resolve_currency(Some("gbp"), &with_pref), "GBP");
        assert_eq!(resolve_currency(None, &with_pref), "eur");
        let without_pref = make_user(None);
        assert_eq!(resolve_currency(None, &without_pref), "USD");
    }

    #[test]
    fn date_window_bounds_are_inclusive() {
        let start = datetime!(2024-01-10 00:00 UTC);
        let end = datetime!(2024-01-20 00:00 UTC);
        assert!(within_range(start, Some(start), Some(end)));
        assert!(within_range(end, Some(start), Some(end)));
        assert!(!within_range(datetime!(2024-01-09 23:59 UTC), Some(start), None));
        assert!(!within_range(datetime!(2024-01-20 00:01 UTC), None, Some(end)));
    }

    #[test]
    fn date_window_runs_after_truncation() {
        // Five rows survive the limit, but only two fall in range; the
        // window never reaches back into rows past the cutoff.
        let rows: Vec<Meal> = (1..=5)
            .map(|d| {
                make_meal(
                    datetime!(2024-01-01 00:00 UTC) + time::Duration::days(d),
                    &[],
                )
            })
            .collect();
        let filtered = apply_date_window(
            rows,
            Some(datetime!(2024-01-02 00:00 UTC)),
            Some(datetime!(2024-01-03 00:00 UTC)),
        );
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn tag_filter_is_any_of() {
        let meal = make_meal(datetime!(2024-01-01 00:00 UTC), &["a"]);
        let wanted = vec!["a".to_string(), "b".to_string()];
        assert!(matches_any_tag(&meal.tags, &wanted));
        assert!(!matches_any_tag(&meal.tags, &["b".to_string()]));
    }

    #[test]
    fn tags_param_splits_on_commas() {
        assert_eq!(parse_tags_param("A, b ,,c"), vec!["a", "b", "c"]);
        assert!(parse_tags_param("").is_empty());
    }
}
