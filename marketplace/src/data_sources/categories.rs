//! Categories data source implementation

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

use crate::api::categories::Category;
use crate::state::list_or_null;
use crate::MarketplaceProviderData;

#[derive(Serialize)]
struct CategoriesState {
    categories: Option<Vec<Category>>,
}

#[derive(Default)]
pub struct CategoriesDataSource {
    provider_data: Option<MarketplaceProviderData>,
}

impl CategoriesDataSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DataSource for CategoriesDataSource {
    fn type_name(&self) -> &str {
        "otc-marketplace_category"
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
        let category = AttributeType::object([
            ("description", AttributeType::String),
            ("id", AttributeType::String),
            ("name", AttributeType::String),
            ("position", AttributeType::Number),
            ("state", AttributeType::String),
        ]);

        let schema = SchemaBuilder::new()
            .version(0)
            .description("Lists the product categories of the marketplace")
            .attribute(
                AttributeBuilder::new("categories", AttributeType::list_of(category))
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
            .categories()
            .list(&ctx)
            .await
            .map(|categories| CategoriesState {
                categories: list_or_null(categories),
            });
        super::respond(result, "categories")
    }
}

#[async_trait]
impl DataSourceWithConfigure for CategoriesDataSource {
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
        categories: Option<Vec<Category>>,
    }

    fn request() -> ReadDataSourceRequest {
        ReadDataSourceRequest {
            type_name: "otc-marketplace_category".to_string(),
            config: DynamicValue::null(),
        }
    }

    #[tokio::test]
    async fn read_lists_categories() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/categories")
            .with_body(r#"[{"id":"c-1","name":"Databases","position":2},{"id":"c-2","name":"AI"}]"#)
            .create_async()
            .await;

        let data_source = CategoriesDataSource {
            provider_data: provider_data(&server),
        };
        let response = data_source.read(Context::new(), request()).await;

        assert!(response.diagnostics.is_empty());
        let state: State = response.state.deserialize_into().unwrap();
        let categories = state.categories.unwrap();
        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].position, 2);
        assert_eq!(categories[1].name, "AI");
    }

    #[tokio::test]
    async fn empty_list_is_stored_as_null() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/categories")
            .with_body("[]")
            .create_async()
            .await;

        let data_source = CategoriesDataSource {
            provider_data: provider_data(&server),
        };
        let response = data_source.read(Context::new(), request()).await;

        let state: State = response.state.deserialize_into().unwrap();
        assert!(state.categories.is_none());
    }
}
