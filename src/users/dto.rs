use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo::{Preferences, Subscription, User};
use super::stats::UserStats;

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub preferences: Option<Preferences>,
    pub subscription: Option<Subscription>,
    pub stats: UserStats,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<User> for ProfileResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
            preferences: u.preferences.map(|p| p.0),
            subscription: u.subscription.map(|s| s.0),
            stats: u.stats.0,
            created_at: u.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub deleted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_response_serialization() {
        let response = ProfileResponse {
            id: Uuid::new_v4(),
            email: "test@example.com".to_string(),
            first_name: Some("Test".into()),
            last_name: None,
            preferences: None,
            subscription: None,
            stats: UserStats::default(),
            created_at: OffsetDateTime::UNIX_EPOCH,
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("test@example.com"));
        assert!(json.contains("total_meals"));
        assert!(json.contains("1970-01-01T00:00:00Z"));
    }
}
