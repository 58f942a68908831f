use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AuthConfig;

/// Claims minted by the identity provider. `sub` is the stable external id the
/// profile row is keyed on; name parts are optional because not every IdP
/// connection supplies them.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub given_name: Option<String>,
    #[serde(default)]
    pub family_name: Option<String>,
    pub iss: String,
    pub aud: String,
    pub exp: usize,
    pub iat: usize,
}

pub fn verify_token(cfg: &AuthConfig, token: &str) -> anyhow::Result<Claims> {
    let mut validation = Validation::default();
    validation.set_audience(std::slice::from_ref(&cfg.audience));
    validation.set_issuer(std::slice::from_ref(&cfg.issuer));
    let decoding = DecodingKey::from_secret(cfg.secret.as_bytes());
    let data = decode::<Claims>(token, &decoding, &validation)?;
    debug!(subject = %data.claims.sub, "token verified");
    Ok(data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use time::{Duration, OffsetDateTime};

    fn make_config(secret: &str, issuer: &str, audience: &str) -> AuthConfig {
        AuthConfig {
            secret: secret.into(),
            issuer: issuer.into(),
            audience: audience.into(),
        }
    }

    fn sign(cfg: &AuthConfig, sub: &str, ttl_secs: i64) -> String {
        let now = OffsetDateTime::now_utc();
        let exp = now + Duration::seconds(ttl_secs);
        let claims = Claims {
            sub: sub.into(),
            email: format!("{sub}@example.com"),
            given_name: Some("Test".into()),
            family_name: None,
            iss: cfg.issuer.clone(),
            aud: cfg.audience.clone(),
            exp: exp.unix_timestamp() as usize,
            iat: now.unix_timestamp() as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(cfg.secret.as_bytes()),
        )
        .expect("sign token")
    }

    #[test]
    fn verify_roundtrip() {
        let cfg = make_config("dev-secret", "test-issuer", "test-aud");
        let token = sign(&cfg, "user-123", 300);
        let claims = verify_token(&cfg, &token).expect("verify token");
        assert_eq!(claims.sub, "user-123");
        assert_eq!(claims.email, "user-123@example.com");
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
    }

    #[test]
    fn verify_rejects_wrong_audience() {
        let good = make_config("same-secret", "iss", "good-aud");
        let bad = make_config("same-secret", "iss", "other-aud");
        let token = sign(&good, "user-123", 300);
        assert!(verify_token(&bad, &token).is_err());
    }

    #[test]
    fn verify_rejects_wrong_issuer() {
        let good = make_config("same-secret", "good-iss", "aud");
        let bad = make_config("same-secret", "other-iss", "aud");
        let token = sign(&good, "user-123", 300);
        assert!(verify_token(&bad, &token).is_err());
    }

    #[test]
    fn verify_rejects_expired_token() {
        let cfg = make_config("dev-secret", "iss", "aud");
        // Past the default 60s leeway
        let token = sign(&cfg, "user-123", -300);
        assert!(verify_token(&cfg, &token).is_err());
    }

    #[test]
    fn verify_rejects_garbage() {
        let cfg = make_config("dev-secret", "iss", "aud");
        assert!(verify_token(&cfg, "not.a.token").is_err());
    }
}
