// Spam classification module - signal extractors plus the decision policy.

pub mod classifier_models;
pub mod classifier_service;
pub mod signals;

pub use classifier_models::*;
pub use classifier_service::*;
