// Chat registration module - moderator records and their invariants.

pub mod registry_models;
pub mod registry_service;

pub use registry_models::*;
pub use registry_service::*;
