use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let auth = AuthConfig {
            secret: std::env::var("AUTH_SECRET")?,
            issuer: std::env::var("AUTH_ISSUER").unwrap_or_else(|_| "platelog-idp".into()),
            audience: std::env::var("AUTH_AUDIENCE").unwrap_or_else(|_| "platelog-api".into()),
        };
        Ok(Self { database_url, auth })
    }
}
