pub mod redis;
pub mod storefront_client;

pub use redis::RedisRepository;
pub use storefront_client::StorefrontApiClient;
