//! Projects, clusters and namespaces applications can be deployed into

use serde::{Deserialize, Serialize};
use tfplug::context::Context;

use super::common::ApiQueryParams;
use super::{ApiError, Client};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cluster {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Namespace {
    pub name: String,
    pub cluster_id: String,
    pub project_id: String,
}

pub struct InfrastructureApi<'a> {
    client: &'a Client,
}

impl<'a> InfrastructureApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /projects
    pub async fn projects(&self, ctx: &Context) -> Result<Vec<Project>, ApiError> {
        self.client.get(ctx, "/projects").await
    }

    /// GET /clusters?project_id=
    pub async fn clusters(&self, ctx: &Context, project_id: &str) -> Result<Vec<Cluster>, ApiError> {
        let params = ApiQueryParams::new().add("project_id", project_id);
        self.client
            .get(ctx, &format!("/clusters{}", params.to_query_string()))
            .await
    }

    /// GET /namespaces?project_id=&cluster_id=
    pub async fn namespaces(
        &self,
        ctx: &Context,
        project_id: &str,
        cluster_id: &str,
    ) -> Result<Vec<Namespace>, ApiError> {
        let params = ApiQueryParams::new()
            .add("project_id", project_id)
            .add("cluster_id", cluster_id);
        self.client
            .get(ctx, &format!("/namespaces{}", params.to_query_string()))
            .await
    }
}
