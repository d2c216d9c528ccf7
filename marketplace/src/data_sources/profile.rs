//! Seller profile data source implementation

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

const PROFILE_ATTRIBUTES: [&str; 14] = [
    "customer_support_number",
    "description",
    "email",
    "id",
    "name",
    "status",
    "support_email",
    "support_url",
    "temp_customer_support_number",
    "temp_description",
    "temp_email",
    "temp_name",
    "temp_support_email",
    "temp_support_url",
];

#[derive(Default)]
pub struct ProfileDataSource {
    provider_data: Option<MarketplaceProviderData>,
}

impl ProfileDataSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DataSource for ProfileDataSource {
    fn type_name(&self) -> &str {
        "otc-marketplace_profile"
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
        // temp_* hold edits awaiting marketplace approval
        let schema = PROFILE_ATTRIBUTES
            .iter()
            .fold(
                SchemaBuilder::new()
                    .version(0)
                    .description("Gets the seller profile"),
                |builder, name| {
                    builder.attribute(
                        AttributeBuilder::new(name, AttributeType::String)
                            .computed()
                            .build(),
                    )
                },
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

        super::respond(client.account().profile(&ctx).await, "profile")
    }
}

#[async_trait]
impl DataSourceWithConfigure for ProfileDataSource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        super::configure(&mut self.provider_data, request.provider_data)
    }
}
