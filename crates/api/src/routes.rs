use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use fleet_core::traits::{BotRepository, DeliveryRepository};
use fleet_dispatcher::AssignmentCoordinator;
use metrics_exporter_prometheus::PrometheusHandle;

use crate::handlers::{
    bots::{create_bot, get_bot, list_bots_by_zone},
    deliveries::{
        assign_bot, create_delivery, get_delivery, list_deliveries_by_creator,
        list_deliveries_by_date,
    },
    health::health_check,
    metrics::render_metrics,
};

/// API应用状态
#[derive(Clone)]
pub struct AppState {
    pub deliveries: Arc<dyn DeliveryRepository>,
    pub bots: Arc<dyn BotRepository>,
    pub coordinator: Arc<AssignmentCoordinator>,
    pub metrics: Option<PrometheusHandle>,
}

/// 创建API路由
pub fn create_routes(state: AppState, metrics_endpoint: &str) -> Router {
    let mut router = Router::new()
        .route("/health", get(health_check))
        // 配送单
        .route("/deliveries", post(create_delivery))
        .route("/deliveries/by-date", get(list_deliveries_by_date))
        .route("/deliveries/creator/{creator_id}", get(list_deliveries_by_creator))
        .route("/deliveries/assign-bot/{id}", put(assign_bot))
        .route("/deliveries/{id}", get(get_delivery))
        // 机器人
        .route("/bots", post(create_bot))
        .route("/bots/by-zone/{zone_id}", get(list_bots_by_zone))
        .route("/bots/{id}", get(get_bot));

    if state.metrics.is_some() {
        router = router.route(metrics_endpoint, get(render_metrics));
    }

    router.with_state(state)
}
