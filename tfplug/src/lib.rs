//! tfplug - Terraform provider framework boundary for Rust
//!
//! The trait surface a provider implements (provider, resources, data
//! sources), the dynamic value model Terraform exchanges with it, schemas and
//! diagnostics. The plugin wire protocol lives outside this crate.

pub mod context;
pub mod error;
pub mod schema;
pub mod types;

pub mod data_source;
pub mod provider;
pub mod resource;

pub use context::Context;
pub use data_source::{DataSource, DataSourceWithConfigure};
pub use error::{Result, TfplugError};
pub use provider::{
    instantiate_data_source, instantiate_resource, DataSourceFactory, Provider, ProviderData,
    ResourceFactory,
};
pub use resource::{Resource, ResourceWithConfigure};
pub use schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
pub use types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
