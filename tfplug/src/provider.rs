//! Provider trait, factories and instantiation helpers

use crate::context::Context;
use crate::data_source::{ConfigureDataSourceRequest, DataSourceWithConfigure};
use crate::error::{Result, TfplugError};
use crate::resource::{ConfigureResourceRequest, ResourceWithConfigure};
use crate::schema::Schema;
use crate::types::{Diagnostic, DynamicValue, ServerCapabilities};
use async_trait::async_trait;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// Factories build a fresh, unconfigured instance per request
pub type ResourceFactory = Box<dyn Fn() -> Box<dyn ResourceWithConfigure> + Send + Sync>;
pub type DataSourceFactory = Box<dyn Fn() -> Box<dyn DataSourceWithConfigure> + Send + Sync>;

pub type ProviderData = Arc<dyn Any + Send + Sync>;

#[async_trait]
pub trait Provider: Send + Sync {
    fn type_name(&self) -> &str;

    async fn metadata(
        &self,
        ctx: Context,
        request: ProviderMetadataRequest,
    ) -> ProviderMetadataResponse;

    async fn schema(&self, ctx: Context, request: ProviderSchemaRequest) -> ProviderSchemaResponse;

    /// Called once with the provider block. Whatever lands in
    /// response.provider_data is handed to every resource and data source.
    async fn configure(
        &mut self,
        ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse;

    async fn validate(
        &self,
        ctx: Context,
        request: ValidateProviderConfigRequest,
    ) -> ValidateProviderConfigResponse;

    fn resources(&self) -> HashMap<String, ResourceFactory>;

    fn data_sources(&self) -> HashMap<String, DataSourceFactory>;
}

pub struct ProviderMetadataRequest;

pub struct ProviderMetadataResponse {
    pub type_name: String,
    pub server_capabilities: ServerCapabilities,
}

pub struct ProviderSchemaRequest;

pub struct ProviderSchemaResponse {
    pub schema: Schema,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct ConfigureProviderRequest {
    pub terraform_version: String,
    pub config: DynamicValue,
}

pub struct ConfigureProviderResponse {
    pub diagnostics: Vec<Diagnostic>,
    pub provider_data: Option<ProviderData>,
}

pub struct ValidateProviderConfigRequest {
    pub config: DynamicValue,
}

pub struct ValidateProviderConfigResponse {
    pub diagnostics: Vec<Diagnostic>,
}

/// Build a resource through its factory and hand it the provider data.
/// Configure diagnostics are returned alongside the instance.
pub async fn instantiate_resource(
    provider: &dyn Provider,
    ctx: Context,
    type_name: &str,
    provider_data: Option<ProviderData>,
) -> Result<(Box<dyn ResourceWithConfigure>, Vec<Diagnostic>)> {
    let factories = provider.resources();
    let factory = factories
        .get(type_name)
        .ok_or_else(|| TfplugError::ResourceNotFound(type_name.to_string()))?;

    tracing::debug!("instantiating resource {}", type_name);
    let mut resource = factory();
    let response = resource
        .configure(ctx, ConfigureResourceRequest { provider_data })
        .await;

    Ok((resource, response.diagnostics))
}

pub async fn instantiate_data_source(
    provider: &dyn Provider,
    ctx: Context,
    type_name: &str,
    provider_data: Option<ProviderData>,
) -> Result<(Box<dyn DataSourceWithConfigure>, Vec<Diagnostic>)> {
    let factories = provider.data_sources();
    let factory = factories
        .get(type_name)
        .ok_or_else(|| TfplugError::DataSourceNotFound(type_name.to_string()))?;

    tracing::debug!("instantiating data source {}", type_name);
    let mut data_source = factory();
    let response = data_source
        .configure(ctx, ConfigureDataSourceRequest { provider_data })
        .await;

    Ok((data_source, response.diagnostics))
}
