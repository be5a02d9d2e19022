use crate::application::StorefrontService;
use crate::infrastructure::RedisRepository;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub storefront: Arc<StorefrontService>,
    pub redis: Arc<RedisRepository>,
    pub metrics: PrometheusHandle,
}
