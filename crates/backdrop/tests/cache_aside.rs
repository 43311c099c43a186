use axum::{http::StatusCode, routing::get, Router};
use backdrop::{HttpPathCache, PathCache, PathOrigin, PathSource};
use dotgrid::{compute_hotspots, GridConfig, Viewport};
use path_store::{router, AppState, Metrics, PathStore};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Duration;

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service()).await.unwrap();
    });
    format!("http://{addr}")
}

async fn spawn_store() -> String {
    let state = Arc::new(AppState::new(PathStore::new(16, 20_000), Arc::new(Metrics::new())));
    serve(router(state, 32 * 1024 * 1024)).await
}

fn source(base: &str) -> PathSource<HttpPathCache> {
    let cache = HttpPathCache::new(base, Duration::from_secs(5), 5).unwrap();
    PathSource::new(cache, Arc::new(GridConfig::default()), true)
}

#[tokio::test]
async fn unreachable_store_falls_back_to_local_generation() {
    // Grab a free port and release it so nothing is listening there.
    let addr = {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };
    let src = source(&format!("http://{addr}"));
    let vp = Viewport::new(1024, 768);
    let hotspots = compute_hotspots(vp, src.config());
    let mut rng = StdRng::seed_from_u64(1);

    let loaded = src.load(vp, &hotspots, &mut rng).await;
    assert_eq!(loaded.origin, PathOrigin::Generated);
    assert!(!loaded.paths.is_empty());
}

#[tokio::test]
async fn failing_store_falls_back_to_local_generation() {
    let app = Router::new().route(
        api::v1::PATHS_ROUTE,
        get(|| async { StatusCode::INTERNAL_SERVER_ERROR })
            .post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    );
    let src = source(&serve(app).await);
    let vp = Viewport::new(1024, 768);
    let hotspots = compute_hotspots(vp, src.config());
    let mut rng = StdRng::seed_from_u64(2);

    let loaded = src.load(vp, &hotspots, &mut rng).await;
    assert_eq!(loaded.origin, PathOrigin::Generated);
    assert!(!loaded.paths.is_empty());
    loaded.write_back.unwrap().await.unwrap();
}

#[tokio::test]
async fn generated_paths_are_served_on_the_next_load() {
    let base = spawn_store().await;
    let src = source(&base);
    let vp = Viewport::new(1280, 800);
    let hotspots = compute_hotspots(vp, src.config());
    let mut rng = StdRng::seed_from_u64(3);

    let first = src.load(vp, &hotspots, &mut rng).await;
    assert_eq!(first.origin, PathOrigin::Generated);
    first.write_back.unwrap().await.unwrap();

    let second = src.load(vp, &hotspots, &mut rng).await;
    assert_eq!(second.origin, PathOrigin::Cache);
    assert_eq!(second.paths.len(), first.paths.len());
    for (got, want) in second.paths.iter().zip(&first.paths) {
        assert_eq!((&got.from, &got.to, &got.points), (&want.from, &want.to, &want.points));
    }

    assert_eq!(src.cache().clear(Some(vp)).await.unwrap(), 1);
    let third = src.load(vp, &hotspots, &mut rng).await;
    assert_eq!(third.origin, PathOrigin::Generated);
}
