//! Product revisions data source implementation

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

use crate::resources::product_revision::{product_revision_type, ProductRevisionModel};
use crate::state::list_or_null;
use crate::MarketplaceProviderData;

#[derive(Serialize)]
struct ProductRevisionsState {
    product_revisions: Option<Vec<ProductRevisionModel>>,
}

#[derive(Default)]
pub struct ProductRevisionsDataSource {
    provider_data: Option<MarketplaceProviderData>,
}

impl ProductRevisionsDataSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DataSource for ProductRevisionsDataSource {
    fn type_name(&self) -> &str {
        "otc-marketplace_product_revision"
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
            .description("Lists the revisions of all the seller's products")
            .attribute(
                AttributeBuilder::new(
                    "product_revisions",
                    AttributeType::list_of(product_revision_type()),
                )
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
            .product_revisions()
            .list(&ctx)
            .await
            .map(|revisions| ProductRevisionsState {
                product_revisions: list_or_null(
                    revisions
                        .into_iter()
                        .map(ProductRevisionModel::from)
                        .collect(),
                ),
            });
        super::respond(result, "product revisions")
    }
}

#[async_trait]
impl DataSourceWithConfigure for ProductRevisionsDataSource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        super::configure(&mut self.provider_data, request.provider_data)
    }
}
