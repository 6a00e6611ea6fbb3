//! Explorer service facade.
//!
//! Ties the registry, cache, and projection layers together: every operation resolves
//! an API identifier, fetches the (possibly cached) document, and projects it. The
//! `*_page` variants run the shared list pipeline — filter first, then paginate — so
//! totals and navigation always describe the filtered population.

use crate::cache::SchemaCache;
use crate::error::Result;
use crate::page::{EndpointFilter, ModelFilter, Paginated, PaginationParams, search_endpoints};
use crate::projection::{
    self, ApiInfo, Endpoint, EndpointDetails, Model, ModelSchema,
};
use crate::registry::ApiRegistry;
use serde_json::Value;
use std::sync::Arc;

pub struct Explorer {
    registry: Arc<ApiRegistry>,
    cache: Arc<SchemaCache>,
}

impl Explorer {
    #[must_use]
    pub fn new(registry: Arc<ApiRegistry>, cache: Arc<SchemaCache>) -> Self {
        Self { registry, cache }
    }

    #[must_use]
    pub fn registry(&self) -> &ApiRegistry {
        &self.registry
    }

    #[must_use]
    pub fn cache(&self) -> &SchemaCache {
        &self.cache
    }

    async fn document(&self, api: &str) -> Result<(String, Arc<Value>)> {
        let (url, headers) = self.registry.resolve(api)?;
        let doc = self.cache.get_schema(&url, &headers).await?;
        Ok((url, doc))
    }

    /// General information about an API.
    ///
    /// # Errors
    ///
    /// Fails on identifier resolution or document acquisition.
    pub async fn api_info(&self, api: &str) -> Result<ApiInfo> {
        let (url, doc) = self.document(api).await?;
        Ok(projection::api_info(&doc, &url))
    }

    /// All endpoints in an API, unfiltered.
    ///
    /// # Errors
    ///
    /// Fails on identifier resolution or document acquisition.
    pub async fn list_endpoints(&self, api: &str) -> Result<Vec<Endpoint>> {
        let (_, doc) = self.document(api).await?;
        let endpoints = projection::project_endpoints(&doc);
        tracing::info!("Found {} endpoints for API {api}", endpoints.len());
        Ok(endpoints)
    }

    /// One filtered, paginated page of endpoints.
    ///
    /// # Errors
    ///
    /// Fails on identifier resolution or document acquisition; filter and pagination
    /// parameters are validated by their constructors before this is called.
    pub async fn list_endpoints_page(
        &self,
        api: &str,
        filter: &EndpointFilter,
        params: PaginationParams,
    ) -> Result<Paginated<Endpoint>> {
        let endpoints = self.list_endpoints(api).await?;
        Ok(Paginated::slice(filter.apply(endpoints), params))
    }

    /// One filtered, paginated page of endpoints matching a free-text query.
    ///
    /// # Errors
    ///
    /// Fails on identifier resolution or document acquisition.
    pub async fn search_endpoints_page(
        &self,
        api: &str,
        query: &str,
        filter: &EndpointFilter,
        params: PaginationParams,
    ) -> Result<Paginated<Endpoint>> {
        let endpoints = self.list_endpoints(api).await?;
        let hits = search_endpoints(filter.apply(endpoints), query);
        tracing::info!("Found {} endpoints matching '{query}' for API {api}", hits.len());
        Ok(Paginated::slice(hits, params))
    }

    /// Full details for one operation.
    ///
    /// # Errors
    ///
    /// Fails on identifier resolution, document acquisition, or an unknown
    /// path/method.
    pub async fn endpoint_details(
        &self,
        api: &str,
        path: &str,
        method: &str,
        include_responses: bool,
    ) -> Result<EndpointDetails> {
        let (_, doc) = self.document(api).await?;
        let details = projection::endpoint_details(&doc, path, method, include_responses)?;
        tracing::info!("Retrieved details for {} {path}", details.method);
        Ok(details)
    }

    /// All models in an API, unfiltered.
    ///
    /// # Errors
    ///
    /// Fails on identifier resolution or document acquisition.
    pub async fn list_models(&self, api: &str) -> Result<Vec<Model>> {
        let (_, doc) = self.document(api).await?;
        let models = projection::project_models(&doc);
        tracing::info!("Found {} models for API {api}", models.len());
        Ok(models)
    }

    /// One filtered, paginated page of models.
    ///
    /// # Errors
    ///
    /// Fails on identifier resolution or document acquisition.
    pub async fn list_models_page(
        &self,
        api: &str,
        filter: &ModelFilter,
        params: PaginationParams,
    ) -> Result<Paginated<Model>> {
        let models = self.list_models(api).await?;
        Ok(Paginated::slice(filter.apply(models), params))
    }

    /// The raw schema fragment for one named model.
    ///
    /// # Errors
    ///
    /// Fails on identifier resolution, document acquisition, or an unknown model name.
    pub async fn model_schema(&self, api: &str, name: &str) -> Result<ModelSchema> {
        let (_, doc) = self.document(api).await?;
        projection::model_schema(&doc, name)
    }
}
