//! Data source implementations

pub mod applications;
pub mod categories;
pub mod clusters;
pub mod namespaces;
pub mod product_revisions;
pub mod products;
pub mod profile;
pub mod projects;
pub mod sales_history;
pub mod whoami;

pub use applications::ApplicationsDataSource;
pub use categories::CategoriesDataSource;
pub use clusters::ClustersDataSource;
pub use namespaces::NamespacesDataSource;
pub use product_revisions::ProductRevisionsDataSource;
pub use products::ProductsDataSource;
pub use profile::ProfileDataSource;
pub use projects::ProjectsDataSource;
pub use sales_history::SalesHistoryDataSource;
pub use whoami::WhoAmIDataSource;

use serde::Serialize;
use tfplug::data_source::{ConfigureDataSourceResponse, ReadDataSourceResponse};
use tfplug::types::{Diagnostic, DynamicValue};
use tfplug::ProviderData;

use crate::api::{ApiError, Client};
use crate::state::encode_model;
use crate::MarketplaceProviderData;

fn client(provider_data: &Option<MarketplaceProviderData>) -> Result<&Client, Diagnostic> {
    provider_data
        .as_ref()
        .map(|data| data.client.as_ref())
        .ok_or_else(|| {
            Diagnostic::error(
                "Provider not configured",
                "Provider data was not properly configured",
            )
        })
}

fn configure(
    slot: &mut Option<MarketplaceProviderData>,
    provider_data: Option<ProviderData>,
) -> ConfigureDataSourceResponse {
    let mut diagnostics = vec![];

    match MarketplaceProviderData::from_provider_data(provider_data, "data source") {
        Ok(provider_data) => *slot = Some(provider_data),
        Err(diag) => diagnostics.push(diag),
    }

    ConfigureDataSourceResponse { diagnostics }
}

/// Turn the outcome of a read into a response. `what` names the fetched
/// object in the error summary.
fn respond<T: Serialize>(result: Result<T, ApiError>, what: &str) -> ReadDataSourceResponse {
    let state = result
        .map_err(|e| {
            Diagnostic::error(format!("Failed to read {}", what), format!("API error: {}", e))
        })
        .and_then(|model| encode_model(&model));

    match state {
        Ok(state) => ReadDataSourceResponse {
            state,
            diagnostics: vec![],
        },
        Err(diag) => failed(diag),
    }
}

fn failed(diag: Diagnostic) -> ReadDataSourceResponse {
    ReadDataSourceResponse {
        state: DynamicValue::null(),
        diagnostics: vec![diag],
    }
}
