//! Account endpoints: the logged-in user and the seller profile

use serde::{Deserialize, Serialize};
use tfplug::context::Context;

use super::{ApiError, Client};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WhoAmI {
    pub domain_name: String,
    pub last_project_id: String,
    pub username: String,
    pub llm_hub: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub customer_support_number: String,
    pub description: String,
    pub email: String,
    pub id: String,
    pub name: String,
    pub status: String,
    pub support_email: String,
    pub support_url: String,
    pub temp_customer_support_number: String,
    pub temp_description: String,
    pub temp_email: String,
    pub temp_name: String,
    pub temp_support_email: String,
    pub temp_support_url: String,
}

pub struct AccountApi<'a> {
    client: &'a Client,
}

impl<'a> AccountApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /whoami
    pub async fn whoami(&self, ctx: &Context) -> Result<WhoAmI, ApiError> {
        self.client.get(ctx, "/whoami").await
    }

    /// GET /profiles/profile
    pub async fn profile(&self, ctx: &Context) -> Result<Profile, ApiError> {
        self.client.get(ctx, "/profiles/profile").await
    }
}
