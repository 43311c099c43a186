use api::v1::{
    ClearPathsRequest, ClearPathsResponse, PathsQuery, PathsResponse, StorePathsRequest,
    StorePathsResponse, CLEAR_PATHS_ROUTE, PATHS_ROUTE,
};
use async_trait::async_trait;
use dotgrid::{Path, Viewport};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("path store request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("path store answered with status {0}")]
    Status(StatusCode),
}

/// Remote keyed storage for generated path sets.
#[async_trait]
pub trait PathCache: Send + Sync + 'static {
    /// Paths stored for `viewport`; an empty list means a miss.
    async fn fetch(&self, viewport: Viewport) -> Result<Vec<Path>, StoreError>;

    /// Persists `paths` for `viewport`, returning how many were accepted.
    async fn store(&self, viewport: Viewport, paths: &[Path]) -> Result<usize, StoreError>;

    /// Invalidates one viewport, or all of them.
    async fn clear(&self, viewport: Option<Viewport>) -> Result<usize, StoreError>;
}

/// [`PathCache`] backed by the path_store HTTP service.
#[derive(Debug, Clone)]
pub struct HttpPathCache {
    client: Client,
    base_url: String,
    variation_slots: u32,
}

impl HttpPathCache {
    /// `timeout` bounds each request, so a slow store costs at most one round trip.
    pub fn new(base_url: &str, timeout: Duration, variation_slots: u32) -> Result<Self, StoreError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            variation_slots,
        })
    }

    fn url(&self, route: &str) -> String {
        format!("{}{}", self.base_url, route)
    }
}

fn check(status: StatusCode) -> Result<(), StoreError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(StoreError::Status(status))
    }
}

#[async_trait]
impl PathCache for HttpPathCache {
    async fn fetch(&self, viewport: Viewport) -> Result<Vec<Path>, StoreError> {
        let resp = self
            .client
            .get(self.url(PATHS_ROUTE))
            .query(&PathsQuery::from(viewport))
            .send()
            .await?;
        check(resp.status())?;
        let body: PathsResponse = resp.json().await?;
        Ok(body.paths.into_iter().map(Path::from).collect())
    }

    async fn store(&self, viewport: Viewport, paths: &[Path]) -> Result<usize, StoreError> {
        let req = StorePathsRequest::from_paths(viewport, paths, self.variation_slots);
        let resp = self.client.post(self.url(PATHS_ROUTE)).json(&req).send().await?;
        check(resp.status())?;
        let body: StorePathsResponse = resp.json().await?;
        Ok(body.stored)
    }

    async fn clear(&self, viewport: Option<Viewport>) -> Result<usize, StoreError> {
        let resp = self
            .client
            .post(self.url(CLEAR_PATHS_ROUTE))
            .json(&ClearPathsRequest { viewport })
            .send()
            .await?;
        check(resp.status())?;
        let body: ClearPathsResponse = resp.json().await?;
        Ok(body.cleared)
    }
}
