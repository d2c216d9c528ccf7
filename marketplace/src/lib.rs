//! Terraform provider for the OTC Marketplace seller API

pub mod api;
pub mod data_sources;
pub mod logging;
pub mod provider_data;
pub mod resources;
pub mod state;

pub use provider_data::MarketplaceProviderData;

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tfplug::context::Context;
use tfplug::provider::{
    ConfigureProviderRequest, ConfigureProviderResponse, DataSourceFactory, Provider,
    ProviderMetadataRequest, ProviderMetadataResponse, ProviderSchemaRequest,
    ProviderSchemaResponse, ResourceFactory, ValidateProviderConfigRequest,
    ValidateProviderConfigResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, SchemaBuilder};
use tfplug::types::{Diagnostic, DynamicValue, ServerCapabilities};
use tfplug::{DataSourceWithConfigure, ResourceWithConfigure};

use api::{Client, ClientConfig, Credentials, MissingConfiguration};

/// Provider block as written in configuration
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProviderConfigModel {
    domain_name: Option<String>,
    username: Option<String>,
    password: Option<String>,
    endpoint: Option<String>,
    timeout_seconds: Option<i64>,
    strict_configuration: Option<bool>,
}

impl ProviderConfigModel {
    fn from_config(config: &DynamicValue) -> Result<Self, Diagnostic> {
        if config.is_null() {
            return Ok(Self::default());
        }
        state::decode_model(config, "provider configuration")
    }
}

fn string_setting(value: Option<String>, env: &str) -> Option<String> {
    value
        .filter(|v| !v.is_empty())
        .or_else(|| std::env::var(env).ok().filter(|v| !v.is_empty()))
}

/// Holds no state of its own: everything configure produces travels to
/// resources and data sources as provider data
#[derive(Default)]
pub struct MarketplaceProvider;

impl MarketplaceProvider {
    pub fn new() -> Self {
        Self
    }

    fn client_config(model: &ProviderConfigModel) -> Result<ClientConfig, Diagnostic> {
        let mut config = ClientConfig::default();

        if let Some(endpoint) = string_setting(model.endpoint.clone(), "MARKETPLACE_ENDPOINT") {
            config = config.with_base_url(endpoint);
        }

        let timeout = match model.timeout_seconds {
            Some(seconds) => Some(seconds),
            None => match std::env::var("MARKETPLACE_TIMEOUT") {
                Ok(raw) => Some(raw.trim().parse::<i64>().map_err(|e| {
                    Diagnostic::error(
                        "Invalid timeout",
                        format!("MARKETPLACE_TIMEOUT must be a number of seconds: {}", e),
                    )
                })?),
                Err(_) => None,
            },
        };
        if let Some(seconds) = timeout {
            if seconds <= 0 {
                return Err(Diagnostic::error(
                    "Invalid timeout",
                    "timeout_seconds must be greater than zero",
                ));
            }
            config.request_timeout = Duration::from_secs(seconds as u64);
        }

        if model.strict_configuration.unwrap_or(false) {
            config.missing_configuration = MissingConfiguration::Reject;
        }

        Ok(config)
    }

    async fn connect(
        ctx: &Context,
        config: &DynamicValue,
    ) -> Result<MarketplaceProviderData, Diagnostic> {
        let model = ProviderConfigModel::from_config(config)?;

        let credentials = Credentials::new(
            string_setting(model.domain_name.clone(), "MARKETPLACE_DOMAIN_NAME").unwrap_or_default(),
            string_setting(model.username.clone(), "MARKETPLACE_USERNAME").unwrap_or_default(),
            string_setting(model.password.clone(), "MARKETPLACE_PASSWORD").unwrap_or_default(),
        );
        if !credentials.is_complete() {
            return Err(Diagnostic::error(
                "Missing Configuration",
                "All of 'domain_name', 'username', and 'password' must be provided.",
            ));
        }

        let client_config = Self::client_config(&model)?;
        tracing::debug!(
            "logging in to {} as {:?}",
            client_config.base_url,
            credentials
        );

        let client = Client::login(ctx, &client_config, &credentials)
            .await
            .map_err(|e| {
                Diagnostic::error(
                    "Couldn't authenticate",
                    format!("Couldn't get instance of marketplaceClient: {}", e),
                )
            })?;

        Ok(MarketplaceProviderData::new(client))
    }
}

#[async_trait]
impl Provider for MarketplaceProvider {
    fn type_name(&self) -> &str {
        "otc-marketplace"
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: ProviderMetadataRequest,
    ) -> ProviderMetadataResponse {
        ProviderMetadataResponse {
            type_name: self.type_name().to_string(),
            server_capabilities: ServerCapabilities::default(),
        }
    }

    async fn schema(&self, _ctx: Context, _request: ProviderSchemaRequest) -> ProviderSchemaResponse {
        let schema = SchemaBuilder::new()
            .version(0)
            .description("Interact with the OTC Marketplace seller API")
            .attribute(
                AttributeBuilder::new("domain_name", AttributeType::String)
                    .description("OTC domain name. May also be set with MARKETPLACE_DOMAIN_NAME")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("username", AttributeType::String)
                    .description("OTC user name. May also be set with MARKETPLACE_USERNAME")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("password", AttributeType::String)
                    .description("OTC password. May also be set with MARKETPLACE_PASSWORD")
                    .optional()
                    .sensitive()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("endpoint", AttributeType::String)
                    .description("Seller API base URL. May also be set with MARKETPLACE_ENDPOINT")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("timeout_seconds", AttributeType::Number)
                    .description("Per request timeout. May also be set with MARKETPLACE_TIMEOUT")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("strict_configuration", AttributeType::Bool)
                    .description(
                        "Fail instead of passing documents through when a product revision has no configuration list",
                    )
                    .optional()
                    .build(),
            )
            .build();

        ProviderSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn configure(
        &mut self,
        ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse {
        logging::init();
        tracing::info!(
            "configuring provider for terraform {}",
            request.terraform_version
        );

        match Self::connect(&ctx, &request.config).await {
            Ok(provider_data) => ConfigureProviderResponse {
                diagnostics: vec![],
                provider_data: Some(Arc::new(provider_data)),
            },
            Err(diag) => ConfigureProviderResponse {
                diagnostics: vec![diag],
                provider_data: None,
            },
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateProviderConfigRequest,
    ) -> ValidateProviderConfigResponse {
        let mut diagnostics = vec![];

        match ProviderConfigModel::from_config(&request.config) {
            Ok(model) => {
                if matches!(model.timeout_seconds, Some(seconds) if seconds <= 0) {
                    diagnostics.push(Diagnostic::error(
                        "Invalid timeout",
                        "timeout_seconds must be greater than zero",
                    ));
                }
                if let Some(endpoint) = model.endpoint.filter(|e| !e.is_empty()) {
                    if let Err(e) = url::Url::parse(&endpoint) {
                        diagnostics.push(Diagnostic::error(
                            "Invalid endpoint",
                            format!("{}: {}", endpoint, e),
                        ));
                    }
                }
            }
            Err(diag) => diagnostics.push(diag),
        }

        ValidateProviderConfigResponse { diagnostics }
    }

    fn resources(&self) -> HashMap<String, ResourceFactory> {
        let mut factories: HashMap<String, ResourceFactory> = HashMap::new();

        factories.insert(
            "otc-marketplace_product".to_string(),
            Box::new(|| {
                Box::new(resources::ProductResource::new()) as Box<dyn ResourceWithConfigure>
            }),
        );
        factories.insert(
            "otc-marketplace_product_revision".to_string(),
            Box::new(|| {
                Box::new(resources::ProductRevisionResource::new())
                    as Box<dyn ResourceWithConfigure>
            }),
        );
        factories.insert(
            "otc-marketplace_application".to_string(),
            Box::new(|| {
                Box::new(resources::ApplicationResource::new()) as Box<dyn ResourceWithConfigure>
            }),
        );

        factories
    }

    fn data_sources(&self) -> HashMap<String, DataSourceFactory> {
        fn factory<D>() -> DataSourceFactory
        where
            D: DataSourceWithConfigure + Default + 'static,
        {
            Box::new(|| Box::new(D::default()) as Box<dyn DataSourceWithConfigure>)
        }

        let mut factories: HashMap<String, DataSourceFactory> = HashMap::new();
        factories.insert(
            "otc-marketplace_whoami".to_string(),
            factory::<data_sources::WhoAmIDataSource>(),
        );
        factories.insert(
            "otc-marketplace_category".to_string(),
            factory::<data_sources::CategoriesDataSource>(),
        );
        factories.insert(
            "otc-marketplace_cluster".to_string(),
            factory::<data_sources::ClustersDataSource>(),
        );
        factories.insert(
            "otc-marketplace_namespace".to_string(),
            factory::<data_sources::NamespacesDataSource>(),
        );
        factories.insert(
            "otc-marketplace_project".to_string(),
            factory::<data_sources::ProjectsDataSource>(),
        );
        factories.insert(
            "otc-marketplace_sales_history".to_string(),
            factory::<data_sources::SalesHistoryDataSource>(),
        );
        factories.insert(
            "otc-marketplace_product".to_string(),
            factory::<data_sources::ProductsDataSource>(),
        );
        factories.insert(
            "otc-marketplace_product_revision".to_string(),
            factory::<data_sources::ProductRevisionsDataSource>(),
        );
        factories.insert(
            "otc-marketplace_application".to_string(),
            factory::<data_sources::ApplicationsDataSource>(),
        );
        factories.insert(
            "otc-marketplace_profile".to_string(),
            factory::<data_sources::ProfileDataSource>(),
        );
        factories
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;
    use serial_test::serial;
    use tfplug::types::AttributePath;

    const ENV_VARS: [&str; 5] = [
        "MARKETPLACE_DOMAIN_NAME",
        "MARKETPLACE_USERNAME",
        "MARKETPLACE_PASSWORD",
        "MARKETPLACE_ENDPOINT",
        "MARKETPLACE_TIMEOUT",
    ];

    fn clear_env() {
        for name in ENV_VARS {
            std::env::remove_var(name);
        }
    }

    fn configure_request(config: DynamicValue) -> ConfigureProviderRequest {
        ConfigureProviderRequest {
            terraform_version: "1.9.0".to_string(),
            config,
        }
    }

    fn provider_block(endpoint: &str) -> DynamicValue {
        let mut config = DynamicValue::null();
        for (name, value) in [
            ("domain_name", "OTC-EU-DE-1"),
            ("username", "seller"),
            ("password", "hunter2"),
            ("endpoint", endpoint),
        ] {
            config
                .set_string(&AttributePath::new(name), value.to_string())
                .unwrap();
        }
        config
    }

    #[tokio::test]
    #[serial]
    async fn configure_logs_in_and_hands_out_client() {
        clear_env();
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/login")
            .match_body(Matcher::Json(json!({
                "domain_name": "OTC-EU-DE-1",
                "username": "seller",
                "password": "hunter2"
            })))
            .with_body(r#"{"token":"abc"}"#)
            .create_async()
            .await;

        let mut provider = MarketplaceProvider::new();
        let response = provider
            .configure(Context::new(), configure_request(provider_block(&server.url())))
            .await;

        assert!(response.diagnostics.is_empty());
        let data = response.provider_data.unwrap();
        let data = data.downcast_ref::<MarketplaceProviderData>().unwrap();
        assert_eq!(data.client.base_url(), server.url());
        mock.assert_async().await;
    }

    #[tokio::test]
    #[serial]
    async fn configure_falls_back_to_environment() {
        clear_env();
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/login")
            .match_body(Matcher::PartialJson(json!({"username": "env-user"})))
            .with_body(r#"{"token":"abc"}"#)
            .create_async()
            .await;

        std::env::set_var("MARKETPLACE_DOMAIN_NAME", "OTC-EU-DE-1");
        std::env::set_var("MARKETPLACE_USERNAME", "env-user");
        std::env::set_var("MARKETPLACE_PASSWORD", "secret");
        std::env::set_var("MARKETPLACE_ENDPOINT", server.url());
        std::env::set_var("MARKETPLACE_TIMEOUT", "5");

        let mut provider = MarketplaceProvider::new();
        let response = provider
            .configure(Context::new(), configure_request(DynamicValue::null()))
            .await;

        assert!(response.diagnostics.is_empty());
        mock.assert_async().await;
        clear_env();
    }

    #[tokio::test]
    #[serial]
    async fn configure_requires_credentials() {
        clear_env();
        let mut config = DynamicValue::null();
        config
            .set_string(&AttributePath::new("username"), "seller".to_string())
            .unwrap();

        let mut provider = MarketplaceProvider::new();
        let response = provider
            .configure(Context::new(), configure_request(config))
            .await;

        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(response.diagnostics[0].summary, "Missing Configuration");
        assert!(response.provider_data.is_none());
    }

    #[tokio::test]
    #[serial]
    async fn configure_reports_failed_login() {
        clear_env();
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/login")
            .with_status(401)
            .create_async()
            .await;

        let mut provider = MarketplaceProvider::new();
        let response = provider
            .configure(Context::new(), configure_request(provider_block(&server.url())))
            .await;

        assert_eq!(response.diagnostics[0].summary, "Couldn't authenticate");
        assert!(response.diagnostics[0].detail.contains("401"));
        assert!(response.provider_data.is_none());
    }

    #[tokio::test]
    #[serial]
    async fn configure_rejects_bad_timeout_env() {
        clear_env();
        std::env::set_var("MARKETPLACE_TIMEOUT", "soon");

        let mut provider = MarketplaceProvider::new();
        let response = provider
            .configure(
                Context::new(),
                configure_request(provider_block("http://127.0.0.1:1")),
            )
            .await;

        assert_eq!(response.diagnostics[0].summary, "Invalid timeout");
        clear_env();
    }

    #[test]
    fn strict_configuration_selects_reject_policy() {
        let model = ProviderConfigModel {
            strict_configuration: Some(true),
            timeout_seconds: Some(3),
            ..Default::default()
        };

        let config = MarketplaceProvider::client_config(&model).unwrap();
        assert_eq!(config.missing_configuration, MissingConfiguration::Reject);
        assert_eq!(config.request_timeout, Duration::from_secs(3));
    }

    #[tokio::test]
    async fn validate_flags_bad_endpoint() {
        let mut config = DynamicValue::null();
        config
            .set_string(&AttributePath::new("endpoint"), "not a url".to_string())
            .unwrap();

        let response = MarketplaceProvider::new()
            .validate(Context::new(), ValidateProviderConfigRequest { config })
            .await;

        assert_eq!(response.diagnostics[0].summary, "Invalid endpoint");
    }

    #[test]
    fn registers_every_type() {
        let provider = MarketplaceProvider::new();
        let resources = provider.resources();
        let data_sources = provider.data_sources();

        assert_eq!(resources.len(), 3);
        assert_eq!(data_sources.len(), 10);

        for (name, factory) in &resources {
            assert_eq!(factory().type_name(), name.as_str());
        }
        for (name, factory) in &data_sources {
            assert_eq!(factory().type_name(), name.as_str());
        }
    }
}
