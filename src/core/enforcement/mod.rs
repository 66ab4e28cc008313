// Moderation enforcement module - the action engine and its transport port.

pub mod enforcement_models;
pub mod enforcement_service;
pub mod report;
pub mod transport;

pub use enforcement_models::*;
pub use enforcement_service::*;
pub use transport::*;
