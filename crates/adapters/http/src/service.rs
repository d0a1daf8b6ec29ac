//! Remote ResourceService

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use tmii_common::{AckResponse, ApiResponse, PageResult, QueryParams};
use tmii_domain_core::Resource;
use tmii_errors::AppResult;
use tmii_ports::ResourceService;

use crate::request::ApiRequest;
use crate::transport::HttpTransport;

/// `ResourceService` backed by the dashboard API
///
/// The collection lives at `endpoint`; single records at `endpoint/{id}`.
pub struct RemoteResourceService<R> {
    transport: Arc<HttpTransport>,
    endpoint: String,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> RemoteResourceService<R> {
    pub fn new(transport: Arc<HttpTransport>, endpoint: impl Into<String>) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
            _resource: PhantomData,
        }
    }

    fn item_path(&self, id: &str) -> String {
        format!("{}/{}", self.endpoint.trim_end_matches('/'), id)
    }
}

#[async_trait]
impl<R: Resource> ResourceService<R> for RemoteResourceService<R> {
    async fn fetch_page(&self, params: &QueryParams) -> AppResult<PageResult<R>> {
        let request = ApiRequest::get(self.endpoint.clone()).with_query(params.to_query_pairs());
        let page: PageResult<R> = self.transport.send(request).await?.into_data()?;

        // the server sends only items and count
        Ok(PageResult::new(page.items, page.count, params))
    }

    async fn create(&self, payload: &R::Create) -> AppResult<ApiResponse<R>> {
        let request = ApiRequest::post(self.endpoint.clone()).with_json(payload)?;
        self.transport.send(request).await
    }

    async fn update(&self, id: &str, payload: &R::Update) -> AppResult<ApiResponse<R>> {
        let request = ApiRequest::put(self.item_path(id)).with_json(payload)?;
        self.transport.send(request).await
    }

    async fn delete(&self, id: &str) -> AppResult<AckResponse> {
        self.transport
            .send(ApiRequest::delete(self.item_path(id)))
            .await
    }
}
