//! Marketplace seller API client

pub mod account;
pub mod applications;
pub mod auth;
pub mod categories;
pub mod client;
pub mod common;
pub mod error;
pub mod infrastructure;
pub mod normalize;
pub mod product_revisions;
pub mod products;
pub mod sales_history;

pub use auth::Credentials;
pub use client::{Client, ClientConfig, DEFAULT_BASE_URL};
pub use error::ApiError;
pub use normalize::{MissingConfiguration, NormalizeError, Normalizer};
