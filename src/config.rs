use serde::Deserialize;

/// Environment-driven configuration. Every key has a default so the server
/// starts with no setup: an on-disk sqlite file and the bundled nutrition db.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub nutrition_db_path: String,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:kcaltrack.db?mode=rwc".into());
        let nutrition_db_path =
            std::env::var("NUTRITION_DB").unwrap_or_else(|_| "nutrition_db.json".into());
        let host = std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = std::env::var("APP_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(8080);
        Ok(Self { database_url, nutrition_db_path, host, port })
    }
}
