use std::env;

pub const DEFAULT_PROVINCES_API_BASE: &str = "https://provinces.open-api.vn/api";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Base URL of the Vietnamese administrative-units lookup service.
    pub provinces_api_base: String,
    /// Static key admins present when resetting a portal password.
    pub admin_secret_key: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let provinces_api_base = env::var("PROVINCES_API_BASE")
            .unwrap_or_else(|_| DEFAULT_PROVINCES_API_BASE.to_string());
        let admin_secret_key =
            env::var("ADMIN_SECRET_KEY").unwrap_or_else(|_| "a1b2c3d4e5f6".to_string());
        Ok(Self {
            port,
            database_url,
            host,
            provinces_api_base,
            admin_secret_key,
        })
    }
}
