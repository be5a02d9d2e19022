use crate::domain::CacheRepository;
use async_trait::async_trait;
use deadpool_redis::redis::AsyncCommands;
use deadpool_redis::{Config, Pool, Runtime};
use tracing::{error, info};

/// Remote cache tier backed by a Redis connection pool.
///
/// Without a URL (or with a bad one) every read misses and every write is a
/// no-op, so the gateway keeps serving from memory and upstream.
pub struct RedisRepository {
    pool: Option<Pool>,
}

impl RedisRepository {
    pub fn new(url: Option<String>) -> Self {
        if let Some(redis_url) = url {
            match Config::from_url(&redis_url).create_pool(Some(Runtime::Tokio1)) {
                Ok(pool) => {
                    info!("Redis connection pool initialized");
                    Self { pool: Some(pool) }
                }
                Err(e) => {
                    error!("Failed to create Redis connection pool: {}", e);
                    Self { pool: None }
                }
            }
        } else {
            info!("Redis URL not provided, remote caching disabled");
            Self { pool: None }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.pool.is_some()
    }

    /// Round-trip a PING; `false` when disabled or unreachable.
    pub async fn ping(&self) -> bool {
        let Some(pool) = &self.pool else {
            return false;
        };
        match pool.get().await {
            Ok(mut conn) => {
                let pong: deadpool_redis::redis::RedisResult<String> =
                    deadpool_redis::redis::cmd("PING").query_async(&mut conn).await;
                pong.is_ok()
            }
            Err(e) => {
                error!("Failed to get Redis connection from pool: {}", e);
                false
            }
        }
    }
}

#[async_trait]
impl CacheRepository for RedisRepository {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        if let Some(pool) = &self.pool {
            match pool.get().await {
                Ok(mut conn) => {
                    let result: Option<String> = conn.get(key).await.ok();
                    Ok(result)
                }
                Err(e) => {
                    error!("Failed to get Redis connection from pool: {}", e);
                    Ok(None)
                }
            }
        } else {
            Ok(None)
        }
    }

    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> anyhow::Result<()> {
        if let Some(pool) = &self.pool {
            match pool.get().await {
                Ok(mut conn) => {
                    let _: () = conn.set_ex(key, value, ttl_seconds).await?;
                }
                Err(e) => {
                    error!("Failed to get Redis connection from pool: {}", e);
                }
            }
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        if let Some(pool) = &self.pool {
            let mut conn = pool.get().await?;
            let _: i64 = conn.del(key).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_repository_misses_and_accepts_writes() {
        let repo = RedisRepository::new(None);

        assert!(!repo.is_enabled());
        assert!(!repo.ping().await);
        assert_eq!(repo.get("k").await.unwrap(), None);
        repo.set("k", "v", 10).await.unwrap();
        repo.delete("k").await.unwrap();
    }
}
