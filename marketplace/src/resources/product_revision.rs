//! Product revision resource implementation
//!
//! The API rewrites most revision fields after create and update, so state
//! is settled from the plan and only the id is taken from the response. A
//! refresh is needed afterwards to pick up server-side values.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tfplug::context::Context;
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceMetadataRequest, ResourceMetadataResponse,
    ResourceSchemaRequest, ResourceSchemaResponse, ResourceWithConfigure, UpdateResourceRequest,
    UpdateResourceResponse, ValidateResourceConfigRequest, ValidateResourceConfigResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, SchemaBuilder};
use tfplug::types::{Diagnostic, DynamicValue};

use super::product::resource_id;
use crate::api::product_revisions::{
    Byol, ConfigurationEntry, ConfigurationValidation, ConfigurationValue, ContractualDocument,
    ContractualDocumentInfo, ProductRevision, ProductRevisionRequest, UsedSoftware,
};
use crate::api::{ApiError, Client};
use crate::state::{decode_model, encode_model, list_or_null, require, sanitize, string_or_null};
use crate::MarketplaceProviderData;

const DRIFT_DETAIL: &str = "Run `terraform apply -refresh-only` now.";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductRevisionModel {
    pub admin_suggestion: Option<String>,
    pub byol: Option<ByolModel>,
    pub categories: Option<Vec<String>>,
    pub contractual_documents: Option<Vec<ContractualDocumentModel>>,
    pub contractual_documents_info: Option<Vec<ContractualDocumentInfoModel>>,
    pub description: Option<String>,
    pub description_short: Option<String>,
    pub eula: Option<String>,
    pub guidance: Option<String>,
    pub helm_external: Option<String>,
    pub icon: Option<String>,
    pub id: Option<String>,
    pub license_fee: Option<String>,
    pub license_info: Option<String>,
    pub number: Option<i64>,
    pub post_deployment_info: Option<String>,
    pub pre_deployment_info: Option<String>,
    pub pricing_info: Option<String>,
    pub product_id: Option<String>,
    pub product_revision_application_configuration: Option<Vec<ConfigurationEntryModel>>,
    pub proposed_release_date: Option<String>,
    pub scheduled_release_date: Option<String>,
    pub scheduled_release_until_date: Option<String>,
    pub state: Option<String>,
    pub used_software: Option<Vec<UsedSoftwareModel>>,
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ByolModel {
    pub activation_url: Option<String>,
    pub file_name_in_secret: Option<String>,
    pub secret_name: Option<String>,
    pub webshop_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractualDocumentModel {
    pub file_name: Option<String>,
    pub content: Option<String>,
    pub is_deleted: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractualDocumentInfoModel {
    pub file_name: Option<String>,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsedSoftwareModel {
    pub license_name: Option<String>,
    pub license_url: Option<String>,
    pub name: Option<String>,
}

/// `default_value` is kept as text in state whatever the entry's input type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigurationEntryModel {
    pub confidential: Option<bool>,
    pub default_value: Option<String>,
    pub hidden: Option<bool>,
    pub hint: Option<String>,
    pub input_type: Option<String>,
    pub key: Option<String>,
    pub label: Option<String>,
    pub multiple: Option<bool>,
    pub required: Option<bool>,
    pub tooltip: Option<String>,
    pub validation: Option<Vec<ValidationModel>>,
    pub values: Option<Vec<ValueModel>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationModel {
    pub message: Option<String>,
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueModel {
    pub label: Option<String>,
    pub value: Option<String>,
}

fn text(value: Option<String>) -> String {
    value.unwrap_or_default()
}

impl From<ConfigurationEntry> for ConfigurationEntryModel {
    fn from(entry: ConfigurationEntry) -> Self {
        Self {
            confidential: Some(entry.confidential),
            default_value: entry.default_value,
            hidden: Some(entry.hidden),
            hint: string_or_null(entry.hint),
            input_type: string_or_null(entry.input_type),
            key: string_or_null(entry.key),
            label: string_or_null(entry.label),
            multiple: Some(entry.multiple),
            required: Some(entry.required),
            tooltip: string_or_null(entry.tooltip),
            validation: list_or_null(
                entry
                    .validation
                    .into_iter()
                    .map(|v| ValidationModel {
                        message: string_or_null(v.message),
                        pattern: string_or_null(v.pattern),
                    })
                    .collect(),
            ),
            values: list_or_null(
                entry
                    .values
                    .into_iter()
                    .map(|v| ValueModel {
                        label: string_or_null(v.label),
                        value: string_or_null(v.value),
                    })
                    .collect(),
            ),
        }
    }
}

impl From<ConfigurationEntryModel> for ConfigurationEntry {
    fn from(model: ConfigurationEntryModel) -> Self {
        Self {
            default_value: model.default_value.filter(|value| !value.is_empty()),
            confidential: model.confidential.unwrap_or(false),
            hidden: model.hidden.unwrap_or(false),
            hint: text(model.hint),
            input_type: text(model.input_type),
            key: text(model.key),
            label: text(model.label),
            multiple: model.multiple.unwrap_or(false),
            required: model.required.unwrap_or(false),
            tooltip: text(model.tooltip),
            validation: model
                .validation
                .unwrap_or_default()
                .into_iter()
                .map(|v| ConfigurationValidation {
                    message: text(v.message),
                    pattern: text(v.pattern),
                })
                .collect(),
            values: model
                .values
                .unwrap_or_default()
                .into_iter()
                .map(|v| ConfigurationValue {
                    value: text(v.value),
                    label: text(v.label),
                })
                .collect(),
        }
    }
}

impl From<Byol> for ByolModel {
    fn from(byol: Byol) -> Self {
        Self {
            activation_url: string_or_null(byol.activation_url),
            file_name_in_secret: string_or_null(byol.file_name_in_secret),
            secret_name: string_or_null(byol.secret_name),
            webshop_url: string_or_null(byol.webshop_url),
        }
    }
}

impl From<ByolModel> for Byol {
    fn from(model: ByolModel) -> Self {
        Self {
            activation_url: text(model.activation_url),
            file_name_in_secret: text(model.file_name_in_secret),
            secret_name: text(model.secret_name),
            webshop_url: text(model.webshop_url),
        }
    }
}

impl From<UsedSoftware> for UsedSoftwareModel {
    fn from(software: UsedSoftware) -> Self {
        Self {
            license_name: string_or_null(software.license_name),
            license_url: string_or_null(software.license_url),
            name: string_or_null(software.name),
        }
    }
}

impl From<ContractualDocumentInfo> for ContractualDocumentInfoModel {
    fn from(info: ContractualDocumentInfo) -> Self {
        Self {
            file_name: string_or_null(info.file_name),
            url: string_or_null(info.url),
        }
    }
}

impl From<ProductRevision> for ProductRevisionModel {
    fn from(revision: ProductRevision) -> Self {
        Self {
            admin_suggestion: string_or_null(revision.admin_suggestion),
            byol: Some(revision.byol.into()),
            categories: list_or_null(revision.categories),
            contractual_documents: None,
            contractual_documents_info: list_or_null(
                revision
                    .contractual_documents_info
                    .into_iter()
                    .map(Into::into)
                    .collect(),
            ),
            description: string_or_null(revision.description),
            description_short: string_or_null(revision.description_short),
            eula: string_or_null(revision.eula),
            guidance: string_or_null(revision.guidance),
            helm_external: string_or_null(revision.helm_external),
            icon: string_or_null(revision.icon),
            id: string_or_null(revision.id),
            license_fee: string_or_null(revision.license_fee),
            license_info: string_or_null(revision.license_info),
            number: Some(revision.number),
            post_deployment_info: string_or_null(revision.post_deployment_info),
            pre_deployment_info: string_or_null(revision.pre_deployment_info),
            pricing_info: string_or_null(revision.pricing_info),
            product_id: string_or_null(revision.product_id),
            product_revision_application_configuration: list_or_null(
                revision.configuration.into_iter().map(Into::into).collect(),
            ),
            proposed_release_date: string_or_null(revision.proposed_release_date),
            scheduled_release_date: string_or_null(revision.scheduled_release_date),
            scheduled_release_until_date: string_or_null(revision.scheduled_release_until_date),
            state: string_or_null(revision.state),
            used_software: list_or_null(
                revision.used_software.into_iter().map(Into::into).collect(),
            ),
            version: string_or_null(revision.version),
        }
    }
}

impl ProductRevisionModel {
    /// Body for create and update, built from planned values
    fn to_request(&self) -> ProductRevisionRequest {
        ProductRevisionRequest {
            byol: self.byol.clone().map(Into::into),
            categories: self.categories.clone().unwrap_or_default(),
            product_id: text(sanitize(self.product_id.clone())),
            description: text(self.description.clone()),
            description_short: text(self.description_short.clone()),
            icon: text(self.icon.clone()),
            pre_deployment_info: text(self.pre_deployment_info.clone()),
            post_deployment_info: text(self.post_deployment_info.clone()),
            proposed_release_date: text(self.proposed_release_date.clone()),
            license_info: text(self.license_info.clone()),
            guidance: text(self.guidance.clone()),
            version: text(self.version.clone()),
            helm_external: text(self.helm_external.clone()),
            license_fee: text(self.license_fee.clone()),
            pricing_info: text(self.pricing_info.clone()),
            used_software: self
                .used_software
                .clone()
                .unwrap_or_default()
                .into_iter()
                .map(|s| UsedSoftware {
                    license_name: text(s.license_name),
                    license_url: text(s.license_url),
                    name: text(s.name),
                })
                .collect(),
            configuration: self
                .product_revision_application_configuration
                .clone()
                .unwrap_or_default()
                .into_iter()
                .map(Into::into)
                .collect(),
            contractual_documents: self
                .contractual_documents
                .clone()
                .unwrap_or_default()
                .into_iter()
                .map(|d| ContractualDocument {
                    file_name: text(d.file_name),
                    content: text(d.content),
                    is_deleted: d.is_deleted.unwrap_or(false),
                })
                .collect(),
        }
    }

    /// State written after create or update: the plan with empty values
    /// nulled and the server-assigned id
    fn settle(self, id: String) -> Self {
        let blank = |value: Option<String>| value.and_then(string_or_null);

        Self {
            admin_suggestion: blank(self.admin_suggestion),
            byol: self.byol,
            categories: self.categories.and_then(list_or_null),
            contractual_documents: self.contractual_documents.and_then(list_or_null),
            contractual_documents_info: self.contractual_documents_info.and_then(list_or_null),
            description: blank(self.description),
            description_short: blank(self.description_short),
            eula: blank(self.eula),
            guidance: blank(self.guidance),
            helm_external: blank(self.helm_external),
            icon: blank(self.icon),
            id: string_or_null(id),
            license_fee: blank(self.license_fee),
            license_info: blank(self.license_info),
            number: Some(self.number.unwrap_or(0)),
            post_deployment_info: blank(self.post_deployment_info),
            pre_deployment_info: blank(self.pre_deployment_info),
            pricing_info: blank(self.pricing_info),
            product_id: blank(self.product_id),
            product_revision_application_configuration: self
                .product_revision_application_configuration
                .and_then(list_or_null),
            proposed_release_date: blank(self.proposed_release_date),
            scheduled_release_date: blank(self.scheduled_release_date),
            scheduled_release_until_date: blank(self.scheduled_release_until_date),
            state: blank(self.state),
            used_software: self.used_software.and_then(list_or_null),
            version: blank(self.version),
        }
    }
}

pub fn configuration_entry_type() -> AttributeType {
    AttributeType::object([
        ("confidential", AttributeType::Bool),
        ("default_value", AttributeType::String),
        ("hidden", AttributeType::Bool),
        ("hint", AttributeType::String),
        ("input_type", AttributeType::String),
        ("key", AttributeType::String),
        ("label", AttributeType::String),
        ("multiple", AttributeType::Bool),
        ("required", AttributeType::Bool),
        ("tooltip", AttributeType::String),
        (
            "validation",
            AttributeType::list_of(AttributeType::object([
                ("message", AttributeType::String),
                ("pattern", AttributeType::String),
            ])),
        ),
        (
            "values",
            AttributeType::list_of(AttributeType::object([
                ("label", AttributeType::String),
                ("value", AttributeType::String),
            ])),
        ),
    ])
}

pub fn byol_type() -> AttributeType {
    AttributeType::object([
        ("activation_url", AttributeType::String),
        ("file_name_in_secret", AttributeType::String),
        ("secret_name", AttributeType::String),
        ("webshop_url", AttributeType::String),
    ])
}

pub fn used_software_type() -> AttributeType {
    AttributeType::object([
        ("license_name", AttributeType::String),
        ("license_url", AttributeType::String),
        ("name", AttributeType::String),
    ])
}

pub fn contractual_document_info_type() -> AttributeType {
    AttributeType::object([
        ("file_name", AttributeType::String),
        ("url", AttributeType::String),
    ])
}

pub fn contractual_document_type() -> AttributeType {
    AttributeType::object([
        ("content", AttributeType::String),
        ("file_name", AttributeType::String),
        ("is_deleted", AttributeType::Bool),
    ])
}

/// Attribute types of a revision as nested inside other objects
pub fn product_revision_type() -> AttributeType {
    AttributeType::object([
        ("admin_suggestion", AttributeType::String),
        ("byol", byol_type()),
        ("categories", AttributeType::list_of(AttributeType::String)),
        (
            "contractual_documents",
            AttributeType::list_of(contractual_document_type()),
        ),
        (
            "contractual_documents_info",
            AttributeType::list_of(contractual_document_info_type()),
        ),
        ("description", AttributeType::String),
        ("description_short", AttributeType::String),
        ("eula", AttributeType::String),
        ("guidance", AttributeType::String),
        ("helm_external", AttributeType::String),
        ("icon", AttributeType::String),
        ("id", AttributeType::String),
        ("license_fee", AttributeType::String),
        ("license_info", AttributeType::String),
        ("number", AttributeType::Number),
        ("post_deployment_info", AttributeType::String),
        ("pre_deployment_info", AttributeType::String),
        ("pricing_info", AttributeType::String),
        ("product_id", AttributeType::String),
        (
            "product_revision_application_configuration",
            AttributeType::list_of(configuration_entry_type()),
        ),
        ("proposed_release_date", AttributeType::String),
        ("scheduled_release_date", AttributeType::String),
        ("scheduled_release_until_date", AttributeType::String),
        ("state", AttributeType::String),
        ("used_software", AttributeType::list_of(used_software_type())),
        ("version", AttributeType::String),
    ])
}

#[derive(Default)]
pub struct ProductRevisionResource {
    provider_data: Option<MarketplaceProviderData>,
}

impl ProductRevisionResource {
    pub fn new() -> Self {
        Self::default()
    }

    fn client(&self) -> Result<&Client, Diagnostic> {
        self.provider_data
            .as_ref()
            .map(|data| data.client.as_ref())
            .ok_or_else(|| {
                Diagnostic::error(
                    "Provider not configured",
                    "Provider data was not properly configured",
                )
            })
    }

    async fn create_revision(
        &self,
        ctx: &Context,
        planned_state: &DynamicValue,
    ) -> Result<DynamicValue, Diagnostic> {
        let client = self.client()?;
        let plan: ProductRevisionModel = decode_model(planned_state, "planned product revision")?;
        require(plan.product_id.clone(), "product_id")?;

        let revision = client
            .product_revisions()
            .create(ctx, &plan.to_request())
            .await
            .map_err(|e| {
                Diagnostic::error(
                    "Failed to create product revision",
                    format!("API error: {}", e),
                )
            })?;

        encode_model(&plan.settle(revision.id))
    }

    async fn read_revision(
        &self,
        ctx: &Context,
        current_state: &DynamicValue,
    ) -> Result<Option<DynamicValue>, Diagnostic> {
        let client = self.client()?;
        let current: ProductRevisionModel = decode_model(current_state, "product revision state")?;
        let id = resource_id(current.id)?;

        match client.product_revisions().get(ctx, &id).await {
            Ok(revision) => {
                let mut model = ProductRevisionModel::from(revision);
                // never returned by the API
                model.contractual_documents = current.contractual_documents;
                encode_model(&model).map(Some)
            }
            Err(ApiError::UnexpectedStatus { status: 404 }) => {
                tracing::debug!("product revision {} no longer exists", id);
                Ok(None)
            }
            Err(e) => Err(Diagnostic::error(
                "Failed to read product revision",
                format!("API error: {}", e),
            )),
        }
    }

    async fn update_revision(
        &self,
        ctx: &Context,
        prior_state: &DynamicValue,
        planned_state: &DynamicValue,
    ) -> Result<DynamicValue, Diagnostic> {
        let client = self.client()?;
        let prior: ProductRevisionModel = decode_model(prior_state, "product revision state")?;
        let plan: ProductRevisionModel = decode_model(planned_state, "planned product revision")?;

        let id = prior
            .id
            .ok_or_else(|| Diagnostic::error("Id needs to be set", "this resource has no ID"))?;

        let revision = client
            .product_revisions()
            .update(ctx, &id, &plan.to_request())
            .await
            .map_err(|e| {
                Diagnostic::error(
                    "Failed to update product revision",
                    format!("API error: {}", e),
                )
            })?;

        tracing::warn!("Read required after Update. {}", DRIFT_DETAIL);
        encode_model(&plan.settle(revision.id))
    }
}

#[async_trait]
impl Resource for ProductRevisionResource {
    fn type_name(&self) -> &str {
        "otc-marketplace_product_revision"
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: ResourceMetadataRequest,
    ) -> ResourceMetadataResponse {
        ResourceMetadataResponse {
            type_name: self.type_name().to_string(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ResourceSchemaRequest,
    ) -> ResourceSchemaResponse {
        let optional = |name: &str, attr_type: AttributeType| {
            AttributeBuilder::new(name, attr_type).optional().build()
        };
        let computed = |name: &str, attr_type: AttributeType| {
            AttributeBuilder::new(name, attr_type).computed().build()
        };

        let schema = SchemaBuilder::new()
            .version(0)
            .description("Manages a revision of a marketplace product")
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .description("The product revision ID")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("product_id", AttributeType::String)
                    .description("ID of the parent product")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new(
                    "product_revision_application_configuration",
                    AttributeType::list_of(configuration_entry_type()),
                )
                .description("Configuration options offered to buyers on install")
                .optional()
                .build(),
            )
            .attribute(
                AttributeBuilder::new(
                    "contractual_documents",
                    AttributeType::list_of(contractual_document_type()),
                )
                .description("Documents to upload. Not returned by the API")
                .optional()
                .sensitive()
                .build(),
            )
            .attribute(optional("byol", byol_type()))
            .attribute(optional(
                "categories",
                AttributeType::list_of(AttributeType::String),
            ))
            .attribute(optional("description", AttributeType::String))
            .attribute(optional("description_short", AttributeType::String))
            .attribute(optional("guidance", AttributeType::String))
            .attribute(optional("helm_external", AttributeType::String))
            .attribute(optional("icon", AttributeType::String))
            .attribute(optional("license_fee", AttributeType::String))
            .attribute(optional("license_info", AttributeType::String))
            .attribute(optional("post_deployment_info", AttributeType::String))
            .attribute(optional("pre_deployment_info", AttributeType::String))
            .attribute(optional("pricing_info", AttributeType::String))
            .attribute(optional("proposed_release_date", AttributeType::String))
            .attribute(optional(
                "used_software",
                AttributeType::list_of(used_software_type()),
            ))
            .attribute(optional("version", AttributeType::String))
            .attribute(computed("admin_suggestion", AttributeType::String))
            .attribute(computed(
                "contractual_documents_info",
                AttributeType::list_of(contractual_document_info_type()),
            ))
            .attribute(computed("eula", AttributeType::String))
            .attribute(computed("number", AttributeType::Number))
            .attribute(computed("scheduled_release_date", AttributeType::String))
            .attribute(computed("scheduled_release_until_date", AttributeType::String))
            .attribute(computed("state", AttributeType::String))
            .build();

        ResourceSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        let mut diagnostics = vec![];

        if let Ok(model) = request.config.deserialize_into::<ProductRevisionModel>() {
            let entries = model
                .product_revision_application_configuration
                .unwrap_or_default();
            for entry in entries {
                if entry.input_type.as_deref().map_or(true, str::is_empty) {
                    diagnostics.push(Diagnostic::error(
                        "Invalid configuration entry",
                        format!(
                            "configuration entry {:?} has no input_type",
                            entry.key.unwrap_or_default()
                        ),
                    ));
                }
            }
        }

        ValidateResourceConfigResponse { diagnostics }
    }

    async fn create(&self, ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        match self.create_revision(&ctx, &request.planned_state).await {
            Ok(new_state) => CreateResourceResponse {
                new_state,
                diagnostics: vec![Diagnostic::warning(
                    "Expecting state drift",
                    format!("Read required after Create. {}", DRIFT_DETAIL),
                )],
            },
            Err(diag) => CreateResourceResponse {
                new_state: request.planned_state,
                diagnostics: vec![diag],
            },
        }
    }

    async fn read(&self, ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        match self.read_revision(&ctx, &request.current_state).await {
            Ok(new_state) => ReadResourceResponse {
                new_state,
                diagnostics: vec![],
            },
            Err(diag) => ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics: vec![diag],
            },
        }
    }

    async fn update(&self, ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        match self
            .update_revision(&ctx, &request.prior_state, &request.planned_state)
            .await
        {
            Ok(new_state) => UpdateResourceResponse {
                new_state,
                diagnostics: vec![],
            },
            Err(diag) => UpdateResourceResponse {
                new_state: request.prior_state,
                diagnostics: vec![diag],
            },
        }
    }

    /// Failures only warn: a revision often can't be removed before its
    /// parent product, and Terraform deletes the product later in the plan
    async fn delete(&self, ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let mut diagnostics = vec![];

        let client = match self.client() {
            Ok(client) => client,
            Err(diag) => {
                diagnostics.push(diag);
                return DeleteResourceResponse { diagnostics };
            }
        };

        let id = match decode_model::<ProductRevisionModel>(
            &request.prior_state,
            "product revision state",
        )
        .and_then(|model| resource_id(model.id))
        {
            Ok(id) => id,
            Err(diag) => {
                diagnostics.push(diag);
                return DeleteResourceResponse { diagnostics };
            }
        };

        if let Err(e) = client.product_revisions().delete(&ctx, &id).await {
            tracing::warn!("failed to delete product revision {}: {}", id, e);
            diagnostics.push(Diagnostic::warning(
                "Failed to delete product revision",
                format!(
                    "ignoring error in the hope the parent product will be deleted later as part of the plan.\n\
                     if this resource was to be replaced, please recreate its parent.\nerror: {}",
                    e
                ),
            ));
        }

        DeleteResourceResponse { diagnostics }
    }
}

#[async_trait]
impl ResourceWithConfigure for ProductRevisionResource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureResourceRequest,
    ) -> ConfigureResourceResponse {
        let mut diagnostics = vec![];

        match MarketplaceProviderData::from_provider_data(request.provider_data, "resource") {
            Ok(provider_data) => self.provider_data = Some(provider_data),
            Err(diag) => diagnostics.push(diag),
        }

        ConfigureResourceResponse { diagnostics }
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use crate::api::ClientConfig;
    use mockito::{Matcher, Server};
    use serde_json::json;
    use tfplug::types::{AttributePath, DiagnosticSeverity};

    fn configured(server: &Server) -> ProductRevisionResource {
        let config = ClientConfig::default().with_base_url(server.url());
        let client = Client::new(&config, "token").unwrap();
        ProductRevisionResource {
            provider_data: Some(MarketplaceProviderData::new(client)),
        }
    }

    fn plan() -> ProductRevisionModel {
        ProductRevisionModel {
            product_id: Some("p-1".to_string()),
            version: Some("1.2.0".to_string()),
            description: Some(String::new()),
            categories: Some(vec![]),
            contractual_documents: Some(vec![ContractualDocumentModel {
                file_name: Some("eula.pdf".to_string()),
                content: Some("Zm9v".to_string()),
                is_deleted: None,
            }]),
            product_revision_application_configuration: Some(vec![ConfigurationEntryModel {
                key: Some("tls".to_string()),
                input_type: Some("switch".to_string()),
                default_value: Some("T".to_string()),
                ..Default::default()
            }]),
            ..Default::default()
        }
    }

    fn with_id(mut model: ProductRevisionModel, id: &str) -> DynamicValue {
        model.id = Some(id.to_string());
        encode_model(&model).unwrap()
    }

    #[tokio::test]
    async fn create_sends_switch_default_as_bool_and_keeps_plan() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/product-revisions")
            .match_body(Matcher::Json(json!({
                "product_id": "p-1",
                "version": "1.2.0",
                "configuration": [
                    {"key": "tls", "input_type": "switch", "default_value": true}
                ],
                "contractual_documents": [
                    {"file_name": "eula.pdf", "content": "Zm9v"}
                ]
            })))
            .with_status(201)
            .with_body(
                r#"{"id":"rev-1","version":"1.2.0-server","number":4,
                    "configuration":[{"key":"tls","input_type":"switch","default_value":true}]}"#,
            )
            .create_async()
            .await;

        let planned = encode_model(&plan()).unwrap();
        let response = configured(&server)
            .create(
                Context::new(),
                CreateResourceRequest {
                    type_name: "otc-marketplace_product_revision".to_string(),
                    planned_state: planned.clone(),
                    config: planned,
                },
            )
            .await;

        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(response.diagnostics[0].severity, DiagnosticSeverity::Warning);
        assert_eq!(response.diagnostics[0].summary, "Expecting state drift");

        let state: ProductRevisionModel = response.new_state.deserialize_into().unwrap();
        assert_eq!(state.id.as_deref(), Some("rev-1"));
        assert_eq!(state.version.as_deref(), Some("1.2.0"));
        assert_eq!(state.number, Some(0));
        assert_eq!(state.description, None);
        assert_eq!(state.categories, None);
        assert_eq!(
            state.product_revision_application_configuration.unwrap()[0]
                .default_value
                .as_deref(),
            Some("T")
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn create_requires_product_id() {
        let server = Server::new_async().await;
        let planned = encode_model(&ProductRevisionModel::default()).unwrap();

        let response = configured(&server)
            .create(
                Context::new(),
                CreateResourceRequest {
                    type_name: "otc-marketplace_product_revision".to_string(),
                    planned_state: planned.clone(),
                    config: planned,
                },
            )
            .await;

        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(response.diagnostics[0].summary, "product_id needs to be set");
        assert_eq!(
            response.diagnostics[0].attribute,
            Some(AttributePath::new("product_id"))
        );
    }

    #[tokio::test]
    async fn unrecognized_switch_default_fails_before_sending() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/product-revisions")
            .expect(0)
            .create_async()
            .await;

        let mut model = plan();
        if let Some(entries) = model.product_revision_application_configuration.as_mut() {
            entries[0].default_value = Some("maybe".to_string());
        }
        let planned = encode_model(&model).unwrap();

        let response = configured(&server)
            .create(
                Context::new(),
                CreateResourceRequest {
                    type_name: "otc-marketplace_product_revision".to_string(),
                    planned_state: planned.clone(),
                    config: planned,
                },
            )
            .await;

        assert!(response.diagnostics[0].is_error());
        assert!(response.diagnostics[0].detail.contains("maybe"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn read_stringifies_switch_defaults_and_keeps_documents() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/product-revisions/rev-1")
            .with_body(
                r#"{"id":"rev-1","product_id":"p-1","number":2,"state":"draft",
                    "configuration":[
                        {"key":"tls","input_type":"switch","default_value":false},
                        {"key":"size","input_type":"text","default_value":"small"}
                    ],
                    "byol":{"secret_name":"lic"}}"#,
            )
            .create_async()
            .await;

        let response = configured(&server)
            .read(
                Context::new(),
                ReadResourceRequest {
                    type_name: "otc-marketplace_product_revision".to_string(),
                    current_state: with_id(plan(), "rev-1"),
                },
            )
            .await;

        assert!(response.diagnostics.is_empty());
        let state: ProductRevisionModel = response
            .new_state
            .unwrap()
            .deserialize_into()
            .unwrap();
        let entries = state.product_revision_application_configuration.unwrap();
        assert_eq!(entries[0].default_value.as_deref(), Some("false"));
        assert_eq!(entries[1].default_value.as_deref(), Some("small"));
        assert_eq!(state.number, Some(2));
        assert_eq!(state.byol.unwrap().secret_name.as_deref(), Some("lic"));
        assert_eq!(state.contractual_documents, plan().contractual_documents);
        assert_eq!(state.used_software, None);
    }

    #[tokio::test]
    async fn read_requires_id() {
        let server = Server::new_async().await;
        let response = configured(&server)
            .read(
                Context::new(),
                ReadResourceRequest {
                    type_name: "otc-marketplace_product_revision".to_string(),
                    current_state: encode_model(&plan()).unwrap(),
                },
            )
            .await;

        assert_eq!(response.diagnostics[0].summary, "resource id needs to be set");
        assert_eq!(
            response.diagnostics[0].detail,
            "resource id is either null or unknown"
        );
    }

    #[tokio::test]
    async fn update_patches_by_prior_id() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PATCH", "/product-revisions/rev-1")
            .match_body(Matcher::PartialJson(json!({"version": "2.0.0"})))
            .with_body(r#"{"id":"rev-1","version":"2.0.0"}"#)
            .create_async()
            .await;

        let mut planned_model = plan();
        planned_model.version = Some("2.0.0".to_string());
        let planned = encode_model(&planned_model).unwrap();

        let response = configured(&server)
            .update(
                Context::new(),
                UpdateResourceRequest {
                    type_name: "otc-marketplace_product_revision".to_string(),
                    prior_state: with_id(plan(), "rev-1"),
                    planned_state: planned.clone(),
                    config: planned,
                },
            )
            .await;

        assert!(response.diagnostics.is_empty());
        let state: ProductRevisionModel = response.new_state.deserialize_into().unwrap();
        assert_eq!(state.id.as_deref(), Some("rev-1"));
        assert_eq!(state.version.as_deref(), Some("2.0.0"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn delete_failure_only_warns() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("DELETE", "/product-revisions/rev-1")
            .with_status(409)
            .create_async()
            .await;

        let response = configured(&server)
            .delete(
                Context::new(),
                DeleteResourceRequest {
                    type_name: "otc-marketplace_product_revision".to_string(),
                    prior_state: with_id(plan(), "rev-1"),
                },
            )
            .await;

        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(response.diagnostics[0].severity, DiagnosticSeverity::Warning);
        assert!(response.diagnostics[0]
            .detail
            .contains("please recreate its parent"));
        assert!(!tfplug::types::has_errors(&response.diagnostics));
    }

    #[tokio::test]
    async fn validate_flags_entries_without_input_type() {
        let resource = ProductRevisionResource::new();
        let mut model = plan();
        model.product_revision_application_configuration = Some(vec![ConfigurationEntryModel {
            key: Some("orphan".to_string()),
            ..Default::default()
        }]);

        let response = resource
            .validate(
                Context::new(),
                ValidateResourceConfigRequest {
                    type_name: "otc-marketplace_product_revision".to_string(),
                    config: encode_model(&model).unwrap(),
                },
            )
            .await;

        assert_eq!(response.diagnostics.len(), 1);
        assert!(response.diagnostics[0].detail.contains("orphan"));
    }
}
