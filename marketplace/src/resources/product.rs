//! Product resource implementation

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

use crate::api::products::{
    CreateProductRequest, LlmHub, Product, Seller, UpdateProductRequest,
};
use crate::api::{ApiError, Client};
use crate::state::{decode_model, encode_model, require, sanitize, string_or_null};
use crate::MarketplaceProviderData;

const REUSED_NAME_HINT: &str = "This might mean you're trying to create a product with a previously used name. \nProduct names on the OTC must be new and unique.";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductModel {
    pub active_revision_id: Option<String>,
    pub created_at: Option<String>,
    pub eol: Option<bool>,
    pub eol_date: Option<String>,
    pub id: Option<String>,
    pub license_type: Option<String>,
    pub llm_hub: Option<LlmHubModel>,
    pub name: Option<String>,
    pub seller: Option<SellerModel>,
    pub state: Option<String>,
    #[serde(rename = "type")]
    pub product_type: Option<String>,
    pub weight: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SellerModel {
    pub description: Option<String>,
    pub id: Option<String>,
    pub name: Option<String>,
    pub state: Option<String>,
    pub support_email: Option<String>,
    pub support_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmHubModel {
    pub external_api: Option<String>,
}

impl From<Seller> for SellerModel {
    fn from(seller: Seller) -> Self {
        Self {
            description: string_or_null(seller.description),
            id: string_or_null(seller.id),
            name: string_or_null(seller.name),
            state: string_or_null(seller.state),
            support_email: string_or_null(seller.support_email),
            support_url: string_or_null(seller.support_url),
        }
    }
}

impl From<LlmHub> for LlmHubModel {
    fn from(llm_hub: LlmHub) -> Self {
        Self {
            external_api: string_or_null(llm_hub.external_api),
        }
    }
}

impl From<Product> for ProductModel {
    fn from(product: Product) -> Self {
        Self {
            active_revision_id: string_or_null(product.active_revision_id),
            created_at: string_or_null(product.created_at),
            eol: Some(product.eol),
            eol_date: string_or_null(product.eol_date),
            id: string_or_null(product.id),
            license_type: string_or_null(product.license_type),
            llm_hub: Some(product.llm_hub.into()),
            name: string_or_null(product.name),
            seller: Some(product.seller.into()),
            state: string_or_null(product.state),
            product_type: string_or_null(product.product_type),
            weight: Some(product.weight),
        }
    }
}

pub fn seller_type() -> AttributeType {
    AttributeType::object([
        ("description", AttributeType::String),
        ("id", AttributeType::String),
        ("name", AttributeType::String),
        ("state", AttributeType::String),
        ("support_email", AttributeType::String),
        ("support_url", AttributeType::String),
    ])
}

pub fn llm_hub_type() -> AttributeType {
    AttributeType::object([("external_api", AttributeType::String)])
}

/// Attribute types of a product as nested inside other objects
pub fn product_type() -> AttributeType {
    AttributeType::object([
        ("active_revision_id", AttributeType::String),
        ("created_at", AttributeType::String),
        ("eol", AttributeType::Bool),
        ("eol_date", AttributeType::String),
        ("id", AttributeType::String),
        ("license_type", AttributeType::String),
        ("llm_hub", llm_hub_type()),
        ("name", AttributeType::String),
        ("seller", seller_type()),
        ("state", AttributeType::String),
        ("type", AttributeType::String),
        ("weight", AttributeType::Number),
    ])
}

/// Fields sent on create and update, already validated
struct ProductFields {
    license_type: String,
    name: String,
    product_type: String,
    weight: i64,
}

impl ProductFields {
    fn from_model(model: &ProductModel) -> Result<Self, Diagnostic> {
        Ok(Self {
            license_type: require(sanitize(model.license_type.clone()), "license_type")?,
            name: require(sanitize(model.name.clone()), "name")?,
            product_type: require(sanitize(model.product_type.clone()), "type")?,
            weight: require(model.weight, "weight")?,
        })
    }
}

#[derive(Default)]
pub struct ProductResource {
    provider_data: Option<MarketplaceProviderData>,
}

impl ProductResource {
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

    async fn create_product(
        &self,
        ctx: &Context,
        planned_state: &DynamicValue,
    ) -> Result<DynamicValue, Diagnostic> {
        let client = self.client()?;
        let plan: ProductModel = decode_model(planned_state, "planned product")?;
        let fields = ProductFields::from_model(&plan)?;

        let request = CreateProductRequest {
            license_type: fields.license_type,
            name: fields.name,
            product_type: fields.product_type,
            weight: fields.weight,
        };

        let product = client
            .products()
            .create(ctx, &request)
            .await
            .map_err(|e| {
                let hint = if e.status() == Some(500) {
                    format!("{} ", REUSED_NAME_HINT)
                } else {
                    String::new()
                };
                Diagnostic::error(
                    "Failed to create product",
                    format!("{}API error: {}", hint, e),
                )
            })?;

        let mut model = ProductModel::from(product);
        if model.eol_date.is_none() {
            model.eol = Some(false);
        }
        encode_model(&model)
    }

    async fn read_product(
        &self,
        ctx: &Context,
        current_state: &DynamicValue,
    ) -> Result<Option<DynamicValue>, Diagnostic> {
        let client = self.client()?;
        let current: ProductModel = decode_model(current_state, "product state")?;
        let id = resource_id(current.id)?;

        match client.products().get(ctx, &id).await {
            Ok(product) => encode_model(&ProductModel::from(product)).map(Some),
            Err(ApiError::UnexpectedStatus { status: 404 }) => {
                tracing::debug!("product {} no longer exists", id);
                Ok(None)
            }
            Err(e) => Err(Diagnostic::error(
                "Failed to read product",
                format!("API error: {}", e),
            )),
        }
    }

    async fn update_product(
        &self,
        ctx: &Context,
        prior_state: &DynamicValue,
        planned_state: &DynamicValue,
    ) -> Result<DynamicValue, Diagnostic> {
        let client = self.client()?;
        let prior: ProductModel = decode_model(prior_state, "product state")?;
        let plan: ProductModel = decode_model(planned_state, "planned product")?;

        let id = prior
            .id
            .ok_or_else(|| Diagnostic::error("Id needs to be set", "this resource has no ID"))?;
        let fields = ProductFields::from_model(&plan)?;
        let eol = plan.eol.unwrap_or(false);

        let request = UpdateProductRequest {
            eol,
            license_type: fields.license_type,
            name: fields.name,
            product_type: fields.product_type,
            weight: fields.weight,
        };

        let product = client
            .products()
            .update(ctx, &id, &request)
            .await
            .map_err(|e| {
                Diagnostic::error("Failed to update product", format!("API error: {}", e))
            })?;

        // eol is not echoed reliably, keep what was planned
        let mut model = ProductModel::from(product);
        model.eol = Some(eol);
        encode_model(&model)
    }
}

/// Id of an existing remote object taken from state
pub(crate) fn resource_id(id: Option<String>) -> Result<String, Diagnostic> {
    id.filter(|id| !id.is_empty()).ok_or_else(|| {
        Diagnostic::error(
            "resource id needs to be set",
            "resource id is either null or unknown",
        )
    })
}

#[async_trait]
impl Resource for ProductResource {
    fn type_name(&self) -> &str {
        "otc-marketplace_product"
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
            .description("Manages a product on the OTC marketplace")
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .description("The product ID")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .description("Product name, unique across the marketplace")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("license_type", AttributeType::String)
                    .description("License model of the product")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("type", AttributeType::String)
                    .description("Product type")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("weight", AttributeType::Number)
                    .description("Ordering weight in listings")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("eol", AttributeType::Bool)
                    .description("Whether the product reached end of life")
                    .optional()
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("eol_date", AttributeType::String)
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("created_at", AttributeType::String)
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("state", AttributeType::String)
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("active_revision_id", AttributeType::String)
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("seller", seller_type())
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("llm_hub", llm_hub_type())
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

        if let Ok(model) = request.config.deserialize_into::<ProductModel>() {
            if matches!(model.weight, Some(weight) if weight < 0) {
                diagnostics.push(Diagnostic::error(
                    "Invalid weight",
                    "weight must not be negative",
                ));
            }
        }

        ValidateResourceConfigResponse { diagnostics }
    }

    async fn create(&self, ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        match self.create_product(&ctx, &request.planned_state).await {
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
        match self.read_product(&ctx, &request.current_state).await {
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
            .update_product(&ctx, &request.prior_state, &request.planned_state)
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

        let id = match decode_model::<ProductModel>(&request.prior_state, "product state")
            .and_then(|model| resource_id(model.id))
        {
            Ok(id) => id,
            Err(diag) => {
                diagnostics.push(diag);
                return DeleteResourceResponse { diagnostics };
            }
        };

        if let Err(e) = client.products().delete(&ctx, &id).await {
            diagnostics.push(Diagnostic::error(
                "Failed to delete product",
                format!("API error: {}", e),
            ));
        }

        DeleteResourceResponse { diagnostics }
    }
}

#[async_trait]
impl ResourceWithConfigure for ProductResource {
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
