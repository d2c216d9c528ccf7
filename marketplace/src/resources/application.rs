//! Application resource implementation

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

use super::product::{product_type, resource_id, ProductModel, SellerModel};
use super::product_revision::{product_revision_type, ProductRevisionModel};
use crate::api::applications::{Application, ApplicationRequest, ConfigurationPair};
use crate::api::{ApiError, Client};
use crate::state::{decode_model, encode_model, list_or_null, require, sanitize, string_or_null};
use crate::MarketplaceProviderData;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationModel {
    pub byol_license: Option<String>,
    pub cluster_id: Option<String>,
    pub configuration: Option<Vec<ConfigurationPairModel>>,
    pub created_at: Option<String>,
    pub description: Option<String>,
    pub error: Option<String>,
    pub id: Option<String>,
    pub namespace: Option<String>,
    pub product: Option<ProductModel>,
    pub product_revision: Option<ProductRevisionModel>,
    pub product_revision_id: Option<String>,
    pub project_id: Option<String>,
    pub release_name: Option<String>,
    pub seller: Option<SellerModel>,
    pub state: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigurationPairModel {
    pub key: Option<String>,
    pub value: Option<String>,
}

impl From<Application> for ApplicationModel {
    fn from(application: Application) -> Self {
        Self {
            byol_license: string_or_null(application.byol_license),
            cluster_id: string_or_null(application.cluster_id),
            configuration: list_or_null(
                application
                    .configuration
                    .into_iter()
                    .map(|pair| ConfigurationPairModel {
                        key: string_or_null(pair.key),
                        value: string_or_null(pair.value),
                    })
                    .collect(),
            ),
            created_at: string_or_null(application.created_at),
            description: string_or_null(application.description),
            error: string_or_null(application.error),
            id: string_or_null(application.id),
            namespace: string_or_null(application.namespace),
            product: Some(application.product.into()),
            product_revision: Some(application.product_revision.into()),
            product_revision_id: string_or_null(application.product_revision_id),
            project_id: string_or_null(application.project_id),
            release_name: string_or_null(application.release_name),
            seller: Some(application.seller.into()),
            state: string_or_null(application.state),
            username: string_or_null(application.username),
        }
    }
}

pub fn configuration_pair_type() -> AttributeType {
    AttributeType::object([
        ("key", AttributeType::String),
        ("value", AttributeType::String),
    ])
}

/// Validate the plan and build the request body
fn application_request(plan: &ApplicationModel) -> Result<ApplicationRequest, Diagnostic> {
    let field = |value: &Option<String>| sanitize(value.clone()).unwrap_or_default();

    Ok(ApplicationRequest {
        product_revision_id: require(sanitize(plan.product_revision_id.clone()), "product_revision_id")?,
        project_id: require(sanitize(plan.project_id.clone()), "project_id")?,
        cluster_id: require(sanitize(plan.cluster_id.clone()), "cluster_id")?,
        namespace: require(sanitize(plan.namespace.clone()), "namespace")?,
        release_name: field(&plan.release_name),
        description: field(&plan.description),
        state: field(&plan.state),
        username: field(&plan.username),
        byol_license: field(&plan.byol_license),
        configuration: plan
            .configuration
            .clone()
            .unwrap_or_default()
            .into_iter()
            .map(|pair| ConfigurationPair {
                key: pair.key.unwrap_or_default(),
                value: pair.value.unwrap_or_default(),
            })
            .collect(),
    })
}

#[derive(Default)]
pub struct ApplicationResource {
    provider_data: Option<MarketplaceProviderData>,
}

impl ApplicationResource {
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

    async fn create_application(
        &self,
        ctx: &Context,
        planned_state: &DynamicValue,
    ) -> Result<DynamicValue, Diagnostic> {
        let client = self.client()?;
        let plan: ApplicationModel = decode_model(planned_state, "planned application")?;
        let request = application_request(&plan)?;

        let application = client
            .applications()
            .create(ctx, &request)
            .await
            .map_err(|e| {
                Diagnostic::error("Failed to create application", format!("API error: {}", e))
            })?;

        let mut model = ApplicationModel::from(application);
        model.product_revision_id = plan.product_revision_id;
        tracing::warn!("Read required after Create. Run `terraform apply -refresh-only` now.");
        encode_model(&model)
    }

    async fn read_application(
        &self,
        ctx: &Context,
        current_state: &DynamicValue,
    ) -> Result<Option<DynamicValue>, Diagnostic> {
        let client = self.client()?;
        let current: ApplicationModel = decode_model(current_state, "application state")?;
        let id = resource_id(current.id)?;

        match client.applications().get(ctx, &id).await {
            Ok(application) => encode_model(&ApplicationModel::from(application)).map(Some),
            Err(ApiError::UnexpectedStatus { status: 404 }) => {
                tracing::debug!("application {} no longer exists", id);
                Ok(None)
            }
            Err(e) => Err(Diagnostic::error(
                "Failed to read application",
                format!("API error: {}", e),
            )),
        }
    }

    async fn update_application(
        &self,
        ctx: &Context,
        prior_state: &DynamicValue,
        planned_state: &DynamicValue,
    ) -> Result<DynamicValue, Diagnostic> {
        let client = self.client()?;
        let prior: ApplicationModel = decode_model(prior_state, "application state")?;
        let plan: ApplicationModel = decode_model(planned_state, "planned application")?;

        let id = prior
            .id
            .ok_or_else(|| Diagnostic::error("Id needs to be set", "this resource has no ID"))?;
        let request = application_request(&plan)?;

        let application = client
            .applications()
            .update(ctx, &id, &request)
            .await
            .map_err(|e| {
                Diagnostic::error("Failed to update application", format!("API error: {}", e))
            })?;

        let mut model = ApplicationModel::from(application);
        model.product_revision_id = plan.product_revision_id;
        encode_model(&model)
    }
}

#[async_trait]
impl Resource for ApplicationResource {
    fn type_name(&self) -> &str {
        "otc-marketplace_application"
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
        let schema = SchemaBuilder::new()
            .version(0)
            .description("Deploys a product revision into a cluster namespace")
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .description("The application ID")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("product_revision_id", AttributeType::String)
                    .description("Product revision to deploy")
                    .required()
                    .build(),
            )
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
                AttributeBuilder::new("namespace", AttributeType::String)
                    .description("Kubernetes namespace to install into")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("release_name", AttributeType::String)
                    .optional()
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("description", AttributeType::String)
                    .optional()
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("state", AttributeType::String)
                    .optional()
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("username", AttributeType::String)
                    .optional()
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("byol_license", AttributeType::String)
                    .optional()
                    .sensitive()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new(
                    "configuration",
                    AttributeType::list_of(configuration_pair_type()),
                )
                .description("Values for the product revision's configuration keys")
                .optional()
                .build(),
            )
            .attribute(
                AttributeBuilder::new("created_at", AttributeType::String)
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("error", AttributeType::String)
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("product", product_type())
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("product_revision", product_revision_type())
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("seller", super::product::seller_type())
                    .computed()
                    .build(),
            )
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

        if let Ok(model) = request.config.deserialize_into::<ApplicationModel>() {
            for pair in model.configuration.unwrap_or_default() {
                if pair.key.as_deref().map_or(true, str::is_empty) {
                    diagnostics.push(Diagnostic::error(
                        "Invalid configuration",
                        "every configuration entry needs a key",
                    ));
                }
            }
        }

        ValidateResourceConfigResponse { diagnostics }
    }

    async fn create(&self, ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        match self.create_application(&ctx, &request.planned_state).await {
            Ok(new_state) => CreateResourceResponse {
                new_state,
                diagnostics: vec![],
            },
            Err(diag) => CreateResourceResponse {
                new_state: request.planned_state,
                diagnostics: vec![diag],
            },
        }
    }

    async fn read(&self, ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        match self.read_application(&ctx, &request.current_state).await {
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
            .update_application(&ctx, &request.prior_state, &request.planned_state)
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

    async fn delete(&self, ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let mut diagnostics = vec![];

        let client = match self.client() {
            Ok(client) => client,
            Err(diag) => {
                diagnostics.push(diag);
                return DeleteResourceResponse { diagnostics };
            }
        };

        let id = match decode_model::<ApplicationModel>(&request.prior_state, "application state")
            .and_then(|model| resource_id(model.id))
        {
            Ok(id) => id,
            Err(diag) => {
                diagnostics.push(diag);
                return DeleteResourceResponse { diagnostics };
            }
        };

        if let Err(e) = client.applications().delete(&ctx, &id).await {
            tracing::warn!("failed to delete application {}: {}", id, e);
            diagnostics.push(Diagnostic::warning(
                "Failed to delete application",
                format!("error: {}\n ignoring error and carrying on...", e),
            ));
        }

        DeleteResourceResponse { diagnostics }
    }
}

#[async_trait]
impl ResourceWithConfigure for ApplicationResource {
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
