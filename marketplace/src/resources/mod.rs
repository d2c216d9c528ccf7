//! Resource implementations

pub mod application;
pub mod product;
pub mod product_revision;

pub use application::ApplicationResource;
pub use product::ProductResource;
pub use product_revision::ProductRevisionResource;
