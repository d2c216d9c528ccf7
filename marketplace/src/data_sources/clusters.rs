//! Clusters data source implementation

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

use crate::api::infrastructure::Cluster;
use crate::state::{list_or_null, required_string, sanitize};
use crate::MarketplaceProviderData;

#[derive(Serialize)]
struct ClustersState {
    project_id: String,
    clusters: Option<Vec<Cluster>>,
}

#[derive(Default)]
pub struct ClustersDataSource {
    provider_data: Option<MarketplaceProviderData>,
}

impl ClustersDataSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DataSource for ClustersDataSource {
    fn type_name(&self) -> &str {
        "otc-marketplace_cluster"
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
        let cluster = AttributeType::object([
            ("id", AttributeType::String),
            ("name", AttributeType::String),
        ]);

        let schema = SchemaBuilder::new()
            .version(0)
            .description("Lists the CCE clusters of a project")
            .attribute(
                AttributeBuilder::new("project_id", AttributeType::String)
                    .description("Project to list clusters for")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("clusters", AttributeType::list_of(cluster))
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

        let project_id = match required_string(&request.config, "project_id") {
            Ok(project_id) => sanitize(Some(project_id)).unwrap_or_default(),
            Err(diag) => return super::failed(diag),
        };

        let result = client
            .infrastructure()
            .clusters(&ctx, &project_id)
            .await
            .map(|clusters| ClustersState {
                project_id: project_id.clone(),
                clusters: list_or_null(clusters),
            });
        super::respond(result, "clusters")
    }
}

#[async_trait]
impl DataSourceWithConfigure for ClustersDataSource {
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
    use mockito::{Matcher, Server};
    use tfplug::types::{AttributePath, DynamicValue};

    #[tokio::test]
    async fn read_filters_by_project() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/clusters")
            .match_query(Matcher::UrlEncoded(
                "project_id".to_string(),
                "proj-1".to_string(),
            ))
            .with_body(r#"[{"id":"c-1","name":"prod"}]"#)
            .create_async()
            .await;

        let mut config = DynamicValue::null();
        config
            .set_string(&AttributePath::new("project_id"), "\"proj-1\"".to_string())
            .unwrap();

        let data_source = ClustersDataSource {
            provider_data: provider_data(&server),
        };
        let response = data_source
            .read(
                Context::new(),
                ReadDataSourceRequest {
                    type_name: "otc-marketplace_cluster".to_string(),
                    config,
                },
            )
            .await;

        assert!(response.diagnostics.is_empty());
        assert_eq!(
            response
                .state
                .get_string(&AttributePath::new("project_id"))
                .unwrap(),
            "proj-1"
        );
        assert_eq!(
            response
                .state
                .get_list(&AttributePath::new("clusters"))
                .unwrap()
                .len(),
            1
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn read_requires_project_id() {
        let server = Server::new_async().await;
        let data_source = ClustersDataSource {
            provider_data: provider_data(&server),
        };

        let response = data_source
            .read(
                Context::new(),
                ReadDataSourceRequest {
                    type_name: "otc-marketplace_cluster".to_string(),
                    config: DynamicValue::null(),
                },
            )
            .await;

        assert_eq!(response.diagnostics[0].summary, "project_id needs to be set");
    }
}
