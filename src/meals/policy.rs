use crate::error::ApiError;
use crate::users::repo::Subscription;

pub const FREE_TAG_LIMIT: usize = 3;

/// Documented product caps for photos per meal. No write path enforces them
/// today; they exist so clients and support share one source of truth.
pub const FREE_PHOTO_LIMIT: usize = 1;
pub const PREMIUM_PHOTO_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Free,
    Premium,
}

impl Tier {
    /// Anything other than an explicit "premium" tier counts as free,
    /// including unknown tier strings from older clients.
    pub fn from_subscription(subscription: Option<&Subscription>) -> Tier {
        match subscription {
            Some(s) if s.tier == "premium" => Tier::Premium,
            _ => Tier::Free,
        }
    }
}

pub fn check_tag_limit(tier: Tier, tag_count: usize) -> Result<(), ApiError> {
    if tier == Tier::Free && tag_count > FREE_TAG_LIMIT {
        return Err(ApiError::Policy(format!(
            "Free accounts are limited to {FREE_TAG_LIMIT} tags per meal. \
             Upgrade to premium for unlimited tags."
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subscription(tier: &str) -> Subscription {
        Subscription {
            tier: tier.into(),
            expires_at: None,
            customer_ref: None,
        }
    }

    #[test]
    fn missing_subscription_is_free() {
        assert_eq!(Tier::from_subscription(None), Tier::Free);
    }

    #[test]
    fn unknown_tier_strings_are_free() {
        assert_eq!(
            Tier::from_subscription(Some(&subscription("pro"))),
            Tier::Free
        );
        assert_eq!(
            Tier::from_subscription(Some(&subscription("Premium"))),
            Tier::Free
        );
        assert_eq!(
            Tier::from_subscription(Some(&subscription(""))),
            Tier::Free
        );
    }

    #[test]
    fn premium_tier_is_premium() {
        assert_eq!(
            Tier::from_subscription(Some(&subscription("premium"))),
            Tier::Premium
        );
    }

    #[test]
    fn free_tier_allows_up_to_three_tags() {
        assert!(check_tag_limit(Tier::Free, 0).is_ok());
        assert!(check_tag_limit(Tier::Free, 3).is_ok());
        assert!(check_tag_limit(Tier::Free, 4).is_err());
    }

    #[test]
    fn premium_tier_has_no_tag_cap() {
        assert!(check_tag_limit(Tier::Premium, 50).is_ok());
    }

    #[test]
    fn denial_mentions_the_upgrade_path() {
        let err = check_tag_limit(Tier::Free, 4).unwrap_err();
        assert!(err.to_string().contains("Upgrade to premium"));
    }
}
