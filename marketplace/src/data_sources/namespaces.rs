//! Namespaces data source implementation

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
use tfplug::types::{Diagnostic, DynamicValue};

use crate::api::infrastructure::Namespace;
use crate::state::{list_or_null, required_string, sanitize};
use crate::MarketplaceProviderData;

#[derive(Serialize)]
struct NamespacesState {
    project_id: String,
    cluster_id: String,
    namespaces: Option<Vec<Namespace>>,
}

fn lookup_ids(config: &DynamicValue) -> Result<(String, String), Diagnostic> {
    let project_id = required_string(config, "project_id")?;
    let cluster_id = required_string(config, "cluster_id")?;
    Ok((
        sanitize(Some(project_id)).unwrap_or_default(),
        sanitize(Some(cluster_id)).unwrap_or_default(),
    ))
}

#[derive(Default)]
pub struct NamespacesDataSource {
    provider_data: Option<MarketplaceProviderData>,
}

impl NamespacesDataSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DataSource for NamespacesDataSource {
    fn type_name(&self) -> &str {
        "otc-marketplace_namespace"
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
        let namespace = AttributeType::object([
            ("cluster_id", AttributeType::String),
            ("name", AttributeType::String),
            ("project_id", AttributeType::String),
        ]);

        let schema = SchemaBuilder::new()
            .version(0)
            .description("Lists the Kubernetes namespaces of a cluster")
            .attribute(
                AttributeBuilder::new("project_id", AttributeType::String)
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("cluster_id", AttributeType::String)
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("namespaces", AttributeType::list_of(namespace))
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

    async fn read(&self, ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let client = match super::client(&self.provider_data) {
            Ok(client) => client,
            Err(diag) => return super::failed(diag),
        };

        let (project_id, cluster_id) = match lookup_ids(&request.config) {
            Ok(ids) => ids,
            Err(diag) => return super::failed(diag),
        };

        let result = client
            .infrastructure()
            .namespaces(&ctx, &project_id, &cluster_id)
            .await
            .map(|namespaces| NamespacesState {
                project_id: project_id.clone(),
                cluster_id: cluster_id.clone(),
                namespaces: list_or_null(namespaces),
            });
        super::respond(result, "namespaces")
    }
}

#[async_trait]
impl DataSourceWithConfigure for NamespacesDataSource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        super::configure(&mut self.provider_data, request.provider_data)
    }
}
