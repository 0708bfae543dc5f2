use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db_pool: Option<PgPool>,
    /// Short-TTL cache for public browse responses. Authorization decisions
    /// are never cached.
    pub browse_cache: Cache<String, Value>,
    pub s3_client: Option<aws_sdk_s3::Client>,
}

impl AppState {
    pub async fn build(config: AppConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let db_pool = match &config.database_url {
            Some(url) => Some(
                PgPoolOptions::new()
                    .max_connections(config.db_pool_max_connections)
                    .min_connections(config.db_pool_min_connections)
                    .acquire_timeout(Duration::from_secs(config.db_pool_acquire_timeout_seconds))
                    .idle_timeout(Duration::from_secs(config.db_pool_idle_timeout_seconds))
                    .connect_lazy(url)?,
            ),
            None => {
                tracing::warn!("DATABASE_URL is not set — data endpoints will return 502");
                None
            }
        };

        let s3_client = if config.s3_bucket.is_some() {
            let region = aws_sdk_s3::config::Region::new(config.s3_region.clone());
            let shared = aws_config::defaults(aws_config::BehaviorVersion::latest())
                .region(region)
                .load()
                .await;
            Some(aws_sdk_s3::Client::new(&shared))
        } else {
            None
        };

        let browse_cache = Cache::builder()
            .max_capacity(config.browse_cache_max_entries)
            .time_to_live(Duration::from_secs(config.browse_cache_ttl_seconds))
            .build();

        Ok(Self {
            config: Arc::new(config),
            db_pool,
            browse_cache,
            s3_client,
        })
    }
}

pub fn db_pool(state: &AppState) -> AppResult<&PgPool> {
    state.db_pool.as_ref().ok_or_else(|| {
        AppError::Dependency("database is not configured. Set DATABASE_URL.".to_string())
    })
}
