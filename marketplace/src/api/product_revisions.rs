//! Product revision API implementation
//!
//! Every call in this family goes through the configuration normalizer since
//! `configuration[].default_value` changes type with `input_type` on the wire.

use serde::{Deserialize, Serialize};
use tfplug::context::Context;

use super::common::{decode_document, resource_path};
use super::{ApiError, Client};

const PRODUCT_REVISIONS_PATH: &str = "/product-revisions";

fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductRevision {
    pub admin_suggestion: String,
    pub eula: String,
    pub configuration: Vec<ConfigurationEntry>,
    pub contractual_documents_info: Vec<ContractualDocumentInfo>,
    pub categories: Vec<String>,
    pub description: String,
    pub description_short: String,
    pub guidance: String,
    pub helm_external: String,
    pub icon: String,
    pub id: String,
    pub license_fee: String,
    pub license_info: String,
    pub post_deployment_info: String,
    pub pre_deployment_info: String,
    pub pricing_info: String,
    pub product_id: String,
    pub proposed_release_date: String,
    pub scheduled_release_date: String,
    pub scheduled_release_until_date: String,
    pub state: String,
    pub number: i64,
    pub used_software: Vec<UsedSoftware>,
    pub version: String,
    pub byol: Byol,
}

/// One entry of a revision's application configuration. `default_value` is
/// always text locally; the normalizer converts `switch` entries to booleans
/// on the way out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigurationEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub confidential: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub hidden: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub hint: String,
    pub input_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub label: String,
    #[serde(skip_serializing_if = "is_false")]
    pub multiple: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub required: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tooltip: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub validation: Vec<ConfigurationValidation>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<ConfigurationValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigurationValidation {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pattern: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigurationValue {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub value: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractualDocumentInfo {
    pub file_name: String,
    pub url: String,
}

/// Document upload, only ever sent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractualDocument {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub file_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub content: String,
    #[serde(skip_serializing_if = "is_false")]
    pub is_deleted: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsedSoftware {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub license_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub license_url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Byol {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub activation_url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub file_name_in_secret: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub secret_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub webshop_url: String,
}

/// Request body for POST /product-revisions and PATCH /product-revisions/{id}.
/// Empty fields are left out.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductRevisionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub byol: Option<Byol>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub product_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description_short: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub icon: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pre_deployment_info: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub post_deployment_info: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub proposed_release_date: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub license_info: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub guidance: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub helm_external: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub license_fee: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub pricing_info: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub used_software: Vec<UsedSoftware>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub configuration: Vec<ConfigurationEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub contractual_documents: Vec<ContractualDocument>,
}

pub struct ProductRevisionsApi<'a> {
    client: &'a Client,
}

impl<'a> ProductRevisionsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /product-revisions
    ///
    /// The response is an array, so each element is normalized on its own.
    pub async fn list(&self, ctx: &Context) -> Result<Vec<ProductRevision>, ApiError> {
        let raw: Vec<serde_json::Value> = self.client.get(ctx, PRODUCT_REVISIONS_PATH).await?;

        raw.into_iter()
            .map(|document| {
                let document = self.client.normalize_inbound(document)?;
                decode_document(document)
            })
            .collect()
    }

    /// GET /product-revisions/{id}
    pub async fn get(&self, ctx: &Context, id: &str) -> Result<ProductRevision, ApiError> {
        self.client
            .get_normalized(ctx, &resource_path(PRODUCT_REVISIONS_PATH, id))
            .await
    }

    /// POST /product-revisions
    pub async fn create(
        &self,
        ctx: &Context,
        request: &ProductRevisionRequest,
    ) -> Result<ProductRevision, ApiError> {
        self.client
            .post_normalized(ctx, PRODUCT_REVISIONS_PATH, request)
            .await
    }

    /// PATCH /product-revisions/{id}
    pub async fn update(
        &self,
        ctx: &Context,
        id: &str,
        request: &ProductRevisionRequest,
    ) -> Result<ProductRevision, ApiError> {
        self.client
            .patch_normalized(ctx, &resource_path(PRODUCT_REVISIONS_PATH, id), request)
            .await
    }

    /// DELETE /product-revisions/{id}
    pub async fn delete(&self, ctx: &Context, id: &str) -> Result<(), ApiError> {
        self.client
            .delete(ctx, &resource_path(PRODUCT_REVISIONS_PATH, id))
            .await
    }
}
