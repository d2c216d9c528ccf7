//! Application API implementation

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tfplug::context::Context;

use super::common::{decode_document, resource_path};
use super::normalize::{MissingConfiguration, Normalizer};
use super::product_revisions::ProductRevision;
use super::products::{Product, Seller};
use super::{ApiError, Client};

const APPLICATIONS_PATH: &str = "/applications";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Application {
    pub byol_license: String,
    pub cluster_id: String,
    pub configuration: Vec<ConfigurationPair>,
    pub created_at: String,
    pub description: String,
    pub error: String,
    pub id: String,
    pub namespace: String,
    pub product: Product,
    pub product_revision: ProductRevision,
    pub product_revision_id: String,
    pub project_id: String,
    pub release_name: String,
    pub seller: Seller,
    pub state: String,
    pub username: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigurationPair {
    pub key: String,
    pub value: String,
}

/// Request body for POST /applications and PATCH /applications/{id}
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ApplicationRequest {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub product_revision_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub project_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cluster_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub release_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub state: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub username: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub byol_license: String,
    #[serde(
        rename = "application_configuration",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub configuration: Vec<ConfigurationPair>,
}

pub struct ApplicationsApi<'a> {
    client: &'a Client,
}

impl<'a> ApplicationsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /applications
    pub async fn list(&self, ctx: &Context) -> Result<Vec<Application>, ApiError> {
        let raw: Vec<Value> = self.client.get(ctx, APPLICATIONS_PATH).await?;
        raw.into_iter()
            .map(decode_application)
            .collect()
    }

    /// GET /applications/{id}
    pub async fn get(&self, ctx: &Context, id: &str) -> Result<Application, ApiError> {
        let raw: Value = self
            .client
            .get(ctx, &resource_path(APPLICATIONS_PATH, id))
            .await?;
        decode_application(raw)
    }

    /// POST /applications
    pub async fn create(
        &self,
        ctx: &Context,
        request: &ApplicationRequest,
    ) -> Result<Application, ApiError> {
        let raw: Value = self.client.post(ctx, APPLICATIONS_PATH, request).await?;
        decode_application(raw)
    }

    /// PATCH /applications/{id}
    pub async fn update(
        &self,
        ctx: &Context,
        id: &str,
        request: &ApplicationRequest,
    ) -> Result<Application, ApiError> {
        let raw: Value = self
            .client
            .patch(ctx, &resource_path(APPLICATIONS_PATH, id), request)
            .await?;
        decode_application(raw)
    }

    /// DELETE /applications/{id}
    pub async fn delete(&self, ctx: &Context, id: &str) -> Result<(), ApiError> {
        self.client
            .delete(ctx, &resource_path(APPLICATIONS_PATH, id))
            .await
    }
}

/// The embedded product revision carries the polymorphic configuration
/// list, so it is normalized before the whole document is decoded. An
/// embedded revision is a summary and may leave `configuration` out, so
/// the strict policy does not apply to it.
fn decode_application(mut document: Value) -> Result<Application, ApiError> {
    if let Some(object) = document.as_object_mut() {
        if let Some(revision) = object.remove("product_revision") {
            let revision = match revision {
                Value::Object(_) => {
                    Normalizer::new(MissingConfiguration::PassThrough).inbound(revision)?
                }
                other => other,
            };
            object.insert("product_revision".to_string(), revision);
        }
    }

    decode_document(document)
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use crate::api::ClientConfig;
    use mockito::Server;
    use serde_json::json;

    fn strict_client(server: &Server) -> Client {
        let mut config = ClientConfig::default().with_base_url(server.url());
        config.missing_configuration = MissingConfiguration::Reject;
        Client::new(&config, "t").unwrap()
    }

    #[tokio::test]
    async fn get_treats_null_members_as_unset() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/applications/a-1")
            .with_body(
                r#"{"id":"a-1","error":null,"product_revision":null,
                    "configuration":null,"seller":{"name":null}}"#,
            )
            .create_async()
            .await;

        let client = strict_client(&server);
        let application = client
            .applications()
            .get(&Context::new(), "a-1")
            .await
            .unwrap();

        assert_eq!(application.id, "a-1");
        assert_eq!(application.error, "");
        assert_eq!(application.product_revision, ProductRevision::default());
        assert!(application.configuration.is_empty());
        assert_eq!(application.seller.name, "");
    }

    #[tokio::test]
    async fn embedded_revision_without_configuration_passes_strict_policy() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/applications")
            .with_body(
                r#"[
                    {"id":"a-1","product_revision":{"id":"rev-1","version":"1.0.0"}},
                    {"id":"a-2","product_revision":{"id":"rev-2","configuration":[
                        {"key":"tls","input_type":"switch","default_value":true}]}}
                ]"#,
            )
            .create_async()
            .await;

        let client = strict_client(&server);
        let applications = client.applications().list(&Context::new()).await.unwrap();

        assert_eq!(applications[0].product_revision.version, "1.0.0");
        assert!(applications[0].product_revision.configuration.is_empty());
        assert_eq!(
            applications[1].product_revision.configuration[0]
                .default_value
                .as_deref(),
            Some("true")
        );
    }

    #[test]
    fn request_renames_configuration() {
        let request = ApplicationRequest {
            product_revision_id: "rev-1".to_string(),
            project_id: "proj".to_string(),
            cluster_id: "c-1".to_string(),
            namespace: "default".to_string(),
            configuration: vec![ConfigurationPair {
                key: "replicas".to_string(),
                value: "2".to_string(),
            }],
            ..Default::default()
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "product_revision_id": "rev-1",
                "project_id": "proj",
                "cluster_id": "c-1",
                "namespace": "default",
                "application_configuration": [{"key": "replicas", "value": "2"}]
            })
        );
    }
}
