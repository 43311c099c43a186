use axum::{response::IntoResponse, routing::get, Router};
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

/// Prometheus collectors for the path store.
///
/// Wrapped in an `Arc` and shared by every request handler.
pub struct Metrics {
    pub registry: Registry,
    /// Requests handled, labelled by operation (`get`, `store`, `clear`).
    pub path_requests_total: IntCounterVec,
    /// Lookups answered from a stored, non-empty set.
    pub cache_hits_total: IntCounter,
    /// Lookups that found nothing for the viewport.
    pub cache_misses_total: IntCounter,
    /// Paths accepted through `POST /api/paths`.
    pub paths_stored_total: IntCounter,
    /// Viewports currently held in memory.
    pub viewports_cached: IntGauge,
    /// Invalidations through either clear endpoint.
    pub cache_clears_total: IntCounter,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new_custom(Some("path_store".into()), None)
            .expect("Failed to create custom metrics registry");

        macro_rules! reg {
            ($metric:expr) => {{
                let collector = $metric;
                registry
                    .register(Box::new(collector.clone()))
                    .expect("Failed to register metric");
                collector
            }};
        }

        Self {
            path_requests_total: reg!(IntCounterVec::new(
                Opts::new("path_requests_total", "Total path API requests by operation"),
                &["op"]
            )
            .unwrap()),
            cache_hits_total: reg!(IntCounter::new(
                "cache_hits_total",
                "Total lookups answered from the cache"
            )
            .unwrap()),
            cache_misses_total: reg!(IntCounter::new(
                "cache_misses_total",
                "Total lookups that missed the cache"
            )
            .unwrap()),
            paths_stored_total: reg!(IntCounter::new(
                "paths_stored_total",
                "Total paths accepted for storage"
            )
            .unwrap()),
            viewports_cached: reg!(IntGauge::new(
                "viewports_cached",
                "Number of viewports with a cached path set"
            )
            .unwrap()),
            cache_clears_total: reg!(IntCounter::new(
                "cache_clears_total",
                "Total cache invalidation requests"
            )
            .unwrap()),
            registry,
        }
    }

    /// Serves the registry on `/metrics`.
    pub fn router(&self) -> Router {
        let registry = self.registry.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let registry = registry.clone();
                async move {
                    let metric_families = registry.gather();
                    let mut buffer = Vec::new();
                    TextEncoder::new()
                        .encode(&metric_families, &mut buffer)
                        .expect("Failed to encode metrics");
                    String::from_utf8(buffer)
                        .expect("Metrics buffer is not valid UTF-8")
                        .into_response()
                }
            }),
        )
    }

    pub fn record_request(&self, op: &str) {
        self.path_requests_total.with_label_values(&[op]).inc();
    }

    pub fn update_viewports(&self, count: usize) {
        self.viewports_cached.set(count as i64);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
