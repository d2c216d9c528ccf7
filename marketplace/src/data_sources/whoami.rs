//! Whoami data source implementation

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceMetadataRequest,
    DataSourceMetadataResponse, DataSourceSchemaRequest, DataSourceSchemaResponse,
    DataSourceWithConfigure, ReadDataSourceRequest, ReadDataSourceResponse,
    ValidateDataSourceConfigRequest, ValidateDataSourceConfigResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, SchemaBuilder};

use crate::MarketplaceProviderData;

#[derive(Default)]
pub struct WhoAmIDataSource {
    provider_data: Option<MarketplaceProviderData>,
}

impl WhoAmIDataSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DataSource for WhoAmIDataSource {
    fn type_name(&self) -> &str {
        "otc-marketplace_whoami"
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: DataSourceMetadataRequest,
    ) -> DataSourceMetadataResponse {
        DataSourceMetadataResponse {
            type_name: self.type_name().to_string(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: DataSourceSchemaRequest,
    ) -> DataSourceSchemaResponse {
        let schema = SchemaBuilder::new()
            .version(0)
            .description("Gets the identity behind the provider's credentials")
            .attribute(
                AttributeBuilder::new("domain_name", AttributeType::String)
                    .description("OTC domain of the logged in user")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("username", AttributeType::String)
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("last_project_id", AttributeType::String)
                    .description("Project the user last worked in")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("llm_hub", AttributeType::Bool)
                    .description("Whether the seller has LLM hub access")
                    .computed()
                    .build(),
            )
            .build();

        DataSourceSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        _request: ValidateDataSourceConfigRequest,
    ) -> ValidateDataSourceConfigResponse {
        ValidateDataSourceConfigResponse {
            diagnostics: vec![],
        }
    }

    async fn read(&self, ctx: Context, _request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let client = match super::client(&self.provider_data) {
            Ok(client) => client,
            Err(diag) => return super::failed(diag),
        };

        super::respond(client.account().whoami(&ctx).await, "whoami")
    }
}

#[async_trait]
impl DataSourceWithConfigure for WhoAmIDataSource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        super::configure(&mut self.provider_data, request.provider_data)
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use crate::data_sources::test_support::provider_data;
    use mockito::Server;
    use tfplug::types::{AttributePath, DynamicValue};

    #[tokio::test]
    async fn read_flattens_whoami() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/whoami")
            .match_header("authorization", "Bearer token")
            .with_body(r#"{"domain_name":"OTC-EU-DE-1","username":"seller","llm_hub":true}"#)
            .create_async()
            .await;

        let data_source = WhoAmIDataSource {
            provider_data: provider_data(&server),
        };
        let response = data_source
            .read(
                Context::new(),
                ReadDataSourceRequest {
                    type_name: "otc-marketplace_whoami".to_string(),
                    config: DynamicValue::null(),
                },
            )
            .await;

        assert!(response.diagnostics.is_empty());
        assert_eq!(
            response
                .state
                .get_string(&AttributePath::new("username"))
                .unwrap(),
            "seller"
        );
        assert!(response
            .state
            .get_bool(&AttributePath::new("llm_hub"))
            .unwrap());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn read_reports_unexpected_status() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/whoami")
            .with_status(401)
            .create_async()
            .await;

        let data_source = WhoAmIDataSource {
            provider_data: provider_data(&server),
        };
        let response = data_source
            .read(
                Context::new(),
                ReadDataSourceRequest {
                    type_name: "otc-marketplace_whoami".to_string(),
                    config: DynamicValue::null(),
                },
            )
            .await;

        assert_eq!(response.diagnostics[0].summary, "Failed to read whoami");
        assert!(response.diagnostics[0].detail.contains("401"));
    }

    #[tokio::test]
    async fn unconfigured_read_fails() {
        let response = WhoAmIDataSource::new()
            .read(
                Context::new(),
                ReadDataSourceRequest {
                    type_name: "otc-marketplace_whoami".to_string(),
                    config: DynamicValue::null(),
                },
            )
            .await;

        assert_eq!(response.diagnostics[0].summary, "Provider not configured");
    }
}
