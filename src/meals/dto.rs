use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo::{Location, MealType, Photo};

#[derive(Debug, Deserialize)]
pub struct CreateMealRequest {
    pub title: String,
    pub rating: f64,
    pub meal_type: MealType,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub photos: Vec<Photo>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub meal_date: Option<OffsetDateTime>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default = "default_true")]
    pub allow_comments: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateMealRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub meal_type: Option<MealType>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub photos: Option<Vec<Photo>>,
    #[serde(default)]
    pub is_public: Option<bool>,
    #[serde(default)]
    pub allow_comments: Option<bool>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub meal_date: Option<OffsetDateTime>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub meal_type: Option<MealType>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub start_date: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub end_date: Option<OffsetDateTime>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    #[serde(default)]
    pub meal_type: Option<MealType>,
    /// Comma-separated; a meal matches when it carries any of them.
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    20
}

#[derive(Debug, Serialize)]
pub struct CreatedMealResponse {
    pub id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct DeleteMealResponse {
    pub deleted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_fills_defaults() {
        let req: CreateMealRequest = serde_json::from_str(
            r#"{"title":"Ramen","rating":8,"meal_type":"dinner"}"#,
        )
        .unwrap();
        assert!(req.tags.is_empty());
        assert!(req.photos.is_empty());
        assert!(!req.is_public);
        assert!(req.allow_comments);
        assert!(req.meal_date.is_none());
    }

    #[test]
    fn update_request_distinguishes_absent_fields() {
        let req: UpdateMealRequest = serde_json::from_str(r#"{"rating":9.5}"#).unwrap();
        assert_eq!(req.rating, Some(9.5));
        assert!(req.title.is_none());
        assert!(req.tags.is_none());
    }

    #[test]
    fn meal_type_uses_lowercase_wire_names() {
        let mt: MealType = serde_json::from_str(r#""breakfast""#).unwrap();
        assert_eq!(mt, MealType::Breakfast);
        assert!(serde_json::from_str::<MealType>(r#""Brunch""#).is_err());
    }
}
