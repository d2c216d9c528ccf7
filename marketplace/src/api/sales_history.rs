use serde::{Deserialize, Serialize};
use tfplug::context::Context;

use super::{ApiError, Client};

/// One deployment of a seller's product by a customer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SalesHistoryEntry {
    pub product_revision_id: String,
    pub product_id: String,
    pub product_name: String,
    pub customer_company_name: String,
    pub customer_company_url: String,
    pub customer_contact_number: String,
    pub customer_contact_email: String,
    pub deployed_at: String,
}

pub struct SalesHistoryApi<'a> {
    client: &'a Client,
}

impl<'a> SalesHistoryApi<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// GET /sales-history
    pub async fn list(&self, ctx: &Context) -> Result<Vec<SalesHistoryEntry>, ApiError> {
        self.client.get(ctx, "/sales-history").await
    }
}
