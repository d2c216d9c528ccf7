//! Products data source implementation

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

use crate::resources::product::{product_type, ProductModel};
use crate::state::list_or_null;
use crate::MarketplaceProviderData;

#[derive(Serialize)]
struct ProductsState {
    products: Option<Vec<ProductModel>>,
}

#[derive(Default)]
pub struct ProductsDataSource {
    provider_data: Option<MarketplaceProviderData>,
}

impl ProductsDataSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DataSource for ProductsDataSource {
    fn type_name(&self) -> &str {
        "otc-marketplace_product"
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
            .description("Lists the seller's products")
            .attribute(
                AttributeBuilder::new("products", AttributeType::list_of(product_type()))
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

        let result = client.products().list(&ctx).await.map(|products| ProductsState {
            products: list_or_null(products.into_iter().map(ProductModel::from).collect()),
        });
        super::respond(result, "products")
    }
}

#[async_trait]
impl DataSourceWithConfigure for ProductsDataSource {
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
        products: Option<Vec<ProductModel>>,
    }

    #[tokio::test]
    async fn read_lists_products() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/products")
            .with_body(
                r#"[{"id":"p-1","name":"widget","type":"k8s","weight":3,
                     "seller":{"name":"acme","support_email":""}}]"#,
            )
            .create_async()
            .await;

        let data_source = ProductsDataSource {
            provider_data: provider_data(&server),
        };
        let response = data_source
            .read(
                Context::new(),
                ReadDataSourceRequest {
                    type_name: "otc-marketplace_product".to_string(),
                    config: DynamicValue::null(),
                },
            )
            .await;

        assert!(response.diagnostics.is_empty());
        let state: State = response.state.deserialize_into().unwrap();
        let product = &state.products.unwrap()[0];
        assert_eq!(product.product_type.as_deref(), Some("k8s"));
        assert_eq!(product.weight, Some(3));
        let seller = product.seller.as_ref().unwrap();
        assert_eq!(seller.name.as_deref(), Some("acme"));
        assert_eq!(seller.support_email, None);
    }
}
