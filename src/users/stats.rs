use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Denormalized per-user rollup, embedded in the user row and maintained
/// incrementally by the meal lifecycle. It is a display cache, not a ledger:
/// writes are last-write-wins and nothing ever recomputes it from the meal
/// set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserStats {
    pub total_meals: i64,
    pub average_rating: f64,
    pub total_spent: f64,
    #[serde(default)]
    pub favorite_restaurant: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub last_meal_date: Option<OffsetDateTime>,
}

impl Default for UserStats {
    fn default() -> Self {
        Self {
            total_meals: 0,
            average_rating: 0.0,
            total_spent: 0.0,
            favorite_restaurant: None,
            last_meal_date: None,
        }
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

impl UserStats {
    pub fn after_create(
        &self,
        rating: f64,
        price: Option<f64>,
        meal_date: OffsetDateTime,
        location_name: Option<&str>,
    ) -> UserStats {
        let new_count = self.total_meals + 1;
        let average_rating = round2(
            (self.average_rating * self.total_meals as f64 + rating) / new_count as f64,
        );
        UserStats {
            total_meals: new_count,
            average_rating,
            total_spent: self.total_spent + price.unwrap_or(0.0),
            favorite_restaurant: location_name
                .map(str::to_owned)
                .or_else(|| self.favorite_restaurant.clone()),
            // Overwritten with the new meal's date even when an older date is
            // backfilled; this tracks the latest write, not the latest meal.
            last_meal_date: Some(meal_date),
        }
    }

    pub fn after_delete(&self, price: Option<f64>) -> UserStats {
        if self.total_meals == 0 {
            return self.clone();
        }
        let new_count = self.total_meals - 1;
        UserStats {
            total_meals: new_count,
            // Not recomputed from the remaining meals; zeroed only when the
            // last one goes away.
            average_rating: if new_count == 0 {
                0.0
            } else {
                self.average_rating
            },
            total_spent: (self.total_spent - price.unwrap_or(0.0)).max(0.0),
            favorite_restaurant: self.favorite_restaurant.clone(),
            last_meal_date: self.last_meal_date,
        }
    }
}
