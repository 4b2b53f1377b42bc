use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::classifier::{FoodClassifier, NoopClassifier};
use crate::config::AppConfig;
use crate::nutrition::NutritionTable;

/// Shared application state, cloned into every handler.
///
/// The nutrition table and classifier are constructed once here and injected
/// explicitly; nothing in the crate reaches for process-global state.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    pub nutrition: Arc<NutritionTable>,
    pub classifier: Arc<dyn FoodClassifier>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let options = SqliteConnectOptions::from_str(&config.database_url)
            .context("parse DATABASE_URL")?
            .create_if_missing(true);
        let db = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .context("connect to database")?;

        let nutrition = Arc::new(NutritionTable::load(Path::new(&config.nutrition_db_path))?);
        let classifier = Arc::new(NoopClassifier) as Arc<dyn FoodClassifier>;

        Ok(Self { db, config, nutrition, classifier })
    }
}

/// Isolated in-memory database with the schema applied.
#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("apply migrations");
    pool
}
