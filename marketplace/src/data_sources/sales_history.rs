//! Sales history data source implementation

use async_trait::async_trait;
use serde::Serialize;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceMetadataRequest,
    DataSourceMetadataResponse, DataSourceSchemaRequest, DataSourceSchemaResponse,
    DataSourceWithConfigure, ReadDataSourceRequest, ReadDataSourceResponse,
    ValidateDataSourceConfigRequest, ValidateDataSourceConfigResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, SchemaBuilder};

use crate::api::sales_history::SalesHistoryEntry;
use crate::state::list_or_null;
use crate::MarketplaceProviderData;

#[derive(Serialize)]
struct SalesHistoryState {
    sales_history: Option<Vec<SalesHistoryEntry>>,
}

#[derive(Default)]
pub struct SalesHistoryDataSource {
    provider_data: Option<MarketplaceProviderData>,
}

impl SalesHistoryDataSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DataSource for SalesHistoryDataSource {
    fn type_name(&self) -> &str {
        "otc-marketplace_sales_history"
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
        let entry = AttributeType::object([
            ("customer_company_name", AttributeType::String),
            ("customer_company_url", AttributeType::String),
            ("customer_contact_email", AttributeType::String),
            ("customer_contact_number", AttributeType::String),
            ("deployed_at", AttributeType::String),
            ("product_id", AttributeType::String),
            ("product_name", AttributeType::String),
            ("product_revision_id", AttributeType::String),
        ]);

        let schema = SchemaBuilder::new()
            .version(0)
            .description("Lists deployments of the seller's products by customers")
            .attribute(
                AttributeBuilder::new("sales_history", AttributeType::list_of(entry))
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

        let result = client
            .sales_history()
            .list(&ctx)
            .await
            .map(|entries| SalesHistoryState {
                sales_history: list_or_null(entries),
            });
        super::respond(result, "sales history")
    }
}

#[async_trait]
impl DataSourceWithConfigure for SalesHistoryDataSource {
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
    use serde::Deserialize;
    use tfplug::types::DynamicValue;

    #[derive(Deserialize)]
    struct State {
        sales_history: Option<Vec<SalesHistoryEntry>>,
    }

    #[tokio::test]
    async fn read_lists_sales() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/sales-history")
            .with_body(
                r#"[{"product_id":"p-1","product_name":"widget",
                     "customer_company_name":"Globex","deployed_at":"2024-05-01T10:00:00Z"}]"#,
            )
            .create_async()
            .await;

        let data_source = SalesHistoryDataSource {
            provider_data: provider_data(&server),
        };
        let response = data_source
            .read(
                Context::new(),
                ReadDataSourceRequest {
                    type_name: "otc-marketplace_sales_history".to_string(),
                    config: DynamicValue::null(),
                },
            )
            .await;

        assert!(response.diagnostics.is_empty());
        let state: State = response.state.deserialize_into().unwrap();
        let sales = state.sales_history.unwrap();
        assert_eq!(sales[0].customer_company_name, "Globex");
    }
}
