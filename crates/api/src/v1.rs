use dotgrid::{GridPoint, Path, Viewport};
use serde::{Deserialize, Serialize};

pub const PATHS_ROUTE: &str = "/api/paths";
pub const CLEAR_PATHS_ROUTE: &str = "/api/paths/clear";
pub const CACHE_STATS_ROUTE: &str = "/api/debug/cache-stats";
pub const CACHE_CLEAR_ROUTE: &str = "/api/debug/cache-clear";
pub const HEALTH_ROUTE: &str = "/health";

/// Query string of `GET /api/paths`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathsQuery {
    pub width: u32,
    pub height: u32,
}

impl From<Viewport> for PathsQuery {
    fn from(v: Viewport) -> Self {
        Self { width: v.width, height: v.height }
    }
}

impl From<PathsQuery> for Viewport {
    fn from(q: PathsQuery) -> Self {
        Viewport::new(q.width, q.height)
    }
}

/// A cached path as returned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathRecord {
    pub id: String,
    pub from: String,
    pub to: String,
    pub points: Vec<GridPoint>,
}

impl From<PathRecord> for Path {
    fn from(r: PathRecord) -> Self {
        Path { id: r.id, from: r.from, to: r.to, points: r.points }
    }
}

/// Body of `GET /api/paths`. A missing or empty `paths` array is a miss.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathsResponse {
    #[serde(default)]
    pub paths: Vec<PathRecord>,
}

/// One entry of a `POST /api/paths` body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPath {
    pub from: String,
    pub to: String,
    /// Index of the path in the submitted set, modulo the variation slot count.
    pub variation: u32,
    pub points: Vec<GridPoint>,
    /// Straight-line distance between the first and last point.
    pub distance: f64,
}

impl StoredPath {
    pub fn from_path(index: usize, path: &Path, variation_slots: u32) -> Self {
        Self {
            from: path.from.clone(),
            to: path.to.clone(),
            variation: (index % variation_slots.max(1) as usize) as u32,
            points: path.points.clone(),
            distance: path.span(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorePathsRequest {
    pub paths: Vec<StoredPath>,
    pub viewport: Viewport,
}

impl StorePathsRequest {
    pub fn from_paths(viewport: Viewport, paths: &[Path], variation_slots: u32) -> Self {
        Self {
            paths: paths
                .iter()
                .enumerate()
                .map(|(i, p)| StoredPath::from_path(i, p, variation_slots))
                .collect(),
            viewport,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorePathsResponse {
    pub stored: usize,
}

/// Body of `POST /api/paths/clear`. Without a viewport every entry is dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearPathsRequest {
    #[serde(default)]
    pub viewport: Option<Viewport>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearPathsResponse {
    /// Number of viewports removed.
    pub cleared: usize,
}

/// Hit/miss counters of the path store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub viewports: usize,
    pub paths: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(id: &str, points: Vec<GridPoint>) -> Path {
        Path { id: id.into(), from: "a".into(), to: "b".into(), points }
    }

    #[test]
    fn store_request_assigns_variation_and_distance() {
        let paths: Vec<Path> = (0..7)
            .map(|i| path(&format!("p{i}"), vec![GridPoint::new(0, 0), GridPoint::new(300, 400)]))
            .collect();
        let req = StorePathsRequest::from_paths(Viewport::new(1280, 800), &paths, 5);

        let variations: Vec<u32> = req.paths.iter().map(|p| p.variation).collect();
        assert_eq!(variations, vec![0, 1, 2, 3, 4, 0, 1]);
        assert!(req.paths.iter().all(|p| (p.distance - 500.0).abs() < 1e-9));
    }

    #[test]
    fn missing_paths_field_reads_as_empty() {
        let resp: PathsResponse = serde_json::from_str("{}").unwrap();
        assert!(resp.paths.is_empty());
    }

    #[test]
    fn clear_request_viewport_is_optional() {
        let all: ClearPathsRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(all.viewport, None);

        let one: ClearPathsRequest =
            serde_json::from_str(r#"{"viewport":{"width":1024,"height":768}}"#).unwrap();
        assert_eq!(one.viewport, Some(Viewport::new(1024, 768)));
    }

    #[test]
    fn store_request_wire_shape() {
        let req = StorePathsRequest::from_paths(
            Viewport::new(10, 20),
            &[path("p", vec![GridPoint::new(0, 0), GridPoint::new(3, 4)])],
            5,
        );
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["viewport"]["width"], 10);
        assert_eq!(json["paths"][0]["variation"], 0);
        assert_eq!(json["paths"][0]["points"][1]["y"], 4);
        assert_eq!(json["paths"][0]["distance"], 5.0);
    }
}
