//! Projects data source implementation

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

use crate::api::infrastructure::Project;
use crate::state::list_or_null;
use crate::MarketplaceProviderData;

#[derive(Serialize)]
struct ProjectsState {
    projects: Option<Vec<Project>>,
}

#[derive(Default)]
pub struct ProjectsDataSource {
    provider_data: Option<MarketplaceProviderData>,
}

impl ProjectsDataSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DataSource for ProjectsDataSource {
    fn type_name(&self) -> &str {
        "otc-marketplace_project"
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
        let project = AttributeType::object([
            ("id", AttributeType::String),
            ("name", AttributeType::String),
        ]);

        let schema = SchemaBuilder::new()
            .version(0)
            .description("Lists the OTC projects applications can be deployed into")
            .attribute(
                AttributeBuilder::new("projects", AttributeType::list_of(project))
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
            .infrastructure()
            .projects(&ctx)
            .await
            .map(|projects| ProjectsState {
                projects: list_or_null(projects),
            });
        super::respond(result, "projects")
    }
}

#[async_trait]
impl DataSourceWithConfigure for ProjectsDataSource {
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
    use tfplug::types::DynamicValue;

    #[tokio::test]
    async fn read_lists_projects() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/projects")
            .with_body(r#"[{"id":"proj-1","name":"eu-de_demo"}]"#)
            .create_async()
            .await;

        let data_source = ProjectsDataSource {
            provider_data: provider_data(&server),
        };
        let response = data_source
            .read(
                Context::new(),
                ReadDataSourceRequest {
                    type_name: "otc-marketplace_project".to_string(),
                    config: DynamicValue::null(),
                },
            )
            .await;

        assert!(response.diagnostics.is_empty());
        let projects = response
            .state
            .get_list(&tfplug::types::AttributePath::new("projects"))
            .unwrap();
        assert_eq!(projects.len(), 1);
        mock.assert_async().await;
    }
}
