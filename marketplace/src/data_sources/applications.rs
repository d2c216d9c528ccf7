//! Applications data source implementation

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

use crate::resources::application::{configuration_pair_type, ApplicationModel};
use crate::resources::product::{product_type, seller_type};
use crate::resources::product_revision::product_revision_type;
use crate::state::list_or_null;
use crate::MarketplaceProviderData;

#[derive(Serialize)]
struct ApplicationsState {
    applications: Option<Vec<ApplicationModel>>,
}

fn application_type() -> AttributeType {
    AttributeType::object([
        ("byol_license", AttributeType::String),
        ("cluster_id", AttributeType::String),
        (
            "configuration",
            AttributeType::list_of(configuration_pair_type()),
        ),
        ("created_at", AttributeType::String),
        ("description", AttributeType::String),
        ("error", AttributeType::String),
        ("id", AttributeType::String),
        ("namespace", AttributeType::String),
        ("product", product_type()),
        ("product_revision", product_revision_type()),
        ("product_revision_id", AttributeType::String),
        ("project_id", AttributeType::String),
        ("release_name", AttributeType::String),
        ("seller", seller_type()),
        ("state", AttributeType::String),
        ("username", AttributeType::String),
    ])
}

#[derive(Default)]
pub struct ApplicationsDataSource {
    provider_data: Option<MarketplaceProviderData>,
}

impl ApplicationsDataSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DataSource for ApplicationsDataSource {
    fn type_name(&self) -> &str {
        "otc-marketplace_application"
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
            .description("Lists applications deployed from the seller's products")
            .attribute(
                AttributeBuilder::new("applications", AttributeType::list_of(application_type()))
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
            .applications()
            .list(&ctx)
            .await
            .map(|applications| ApplicationsState {
                applications: list_or_null(
                    applications
                        .into_iter()
                        .map(ApplicationModel::from)
                        .collect(),
                ),
            });
        super::respond(result, "applications")
    }
}

#[async_trait]
impl DataSourceWithConfigure for ApplicationsDataSource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        super::configure(&mut self.provider_data, request.provider_data)
    }
}
