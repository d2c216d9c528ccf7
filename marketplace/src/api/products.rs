//! Product API implementation

use serde::{Deserialize, Serialize};
use tfplug::context::Context;

use super::common::resource_path;
use super::{ApiError, Client};

const PRODUCTS_PATH: &str = "/products";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Product {
    pub id: String,
    pub created_at: String,
    pub eol_date: String,
    pub eol: bool,
    pub license_type: String,
    pub name: String,
    pub seller: Seller,
    pub state: String,
    pub weight: i64,
    #[serde(rename = "type")]
    pub product_type: String,
    pub active_revision_id: String,
    pub llm_hub: LlmHub,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Seller {
    pub description: String,
    pub id: String,
    pub name: String,
    pub state: String,
    pub support_email: String,
    pub support_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmHub {
    pub external_api: String,
}

/// Request body for POST /products
#[derive(Debug, Clone, Serialize)]
pub struct CreateProductRequest {
    pub license_type: String,
    pub name: String,
    #[serde(rename = "type")]
    pub product_type: String,
    pub weight: i64,
}

/// Request body for PATCH /products/{id}
#[derive(Debug, Clone, Serialize)]
pub struct UpdateProductRequest {
    pub eol: bool,
    pub license_type: String,
    pub name: String,
    #[serde(rename = "type")]
    pub product_type: String,
    pub weight: i64,
}

pub struct ProductsApi<'a> {
    client: &'a Client,
}

impl<'a> ProductsApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /products
    pub async fn list(&self, ctx: &Context) -> Result<Vec<Product>, ApiError> {
        self.client.get(ctx, PRODUCTS_PATH).await
    }

    /// GET /products/{id}
    pub async fn get(&self, ctx: &Context, id: &str) -> Result<Product, ApiError> {
        self.client.get(ctx, &resource_path(PRODUCTS_PATH, id)).await
    }

    /// POST /products
    pub async fn create(
        &self,
        ctx: &Context,
        request: &CreateProductRequest,
    ) -> Result<Product, ApiError> {
        self.client.post(ctx, PRODUCTS_PATH, request).await
    }

    /// PATCH /products/{id}
    pub async fn update(
        &self,
        ctx: &Context,
        id: &str,
        request: &UpdateProductRequest,
    ) -> Result<Product, ApiError> {
        self.client
            .patch(ctx, &resource_path(PRODUCTS_PATH, id), request)
            .await
    }

    /// DELETE /products/{id}
    pub async fn delete(&self, ctx: &Context, id: &str) -> Result<(), ApiError> {
        self.client
            .delete(ctx, &resource_path(PRODUCTS_PATH, id))
            .await
    }
}
