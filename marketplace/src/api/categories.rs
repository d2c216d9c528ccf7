use serde::{Deserialize, Serialize};
use tfplug::context::Context;

use super::{ApiError, Client};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Category {
    pub id: String,
    pub description: String,
    pub name: String,
    pub state: String,
    pub position: i64,
}

pub struct CategoriesApi<'a> {
    client: &'a Client,
}

impl<'a> CategoriesApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /categories
    pub async fn list(&self, ctx: &Context) -> Result<Vec<Category>, ApiError> {
        self.client.get(ctx, "/categories").await
    }
}
