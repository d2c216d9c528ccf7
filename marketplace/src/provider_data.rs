//! Provider data structure passed to resources and data sources

use crate::api::Client;
use std::sync::Arc;
use tfplug::types::Diagnostic;
use tfplug::ProviderData;

#[derive(Clone)]
pub struct MarketplaceProviderData {
    pub client: Arc<Client>,
}

impl MarketplaceProviderData {
    pub fn new(client: Client) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Recover the provider data handed over at configure time. `kind` names
    /// the receiver ("resource" or "data source") in the diagnostics.
    pub fn from_provider_data(
        provider_data: Option<ProviderData>,
        kind: &str,
    ) -> Result<Self, Diagnostic> {
        let Some(data) = provider_data else {
            tracing::warn!("No provider data provided to {}", kind);
            return Err(Diagnostic::error(
                "No provider data",
                format!("No provider data was provided to the {}", kind),
            ));
        };

        match data.downcast_ref::<MarketplaceProviderData>() {
            Some(provider_data) => Ok(provider_data.clone()),
            None => Err(Diagnostic::error(
                "Invalid provider data",
                "Failed to extract MarketplaceProviderData from provider data",
            )),
        }
    }
}
