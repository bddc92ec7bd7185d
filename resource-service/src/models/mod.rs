//! Domain models for the resource service.

pub mod resources;

pub use resources::{ResourceBundle, ResourceCategory, ResourceItem, SchemaError};
