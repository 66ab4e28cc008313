// Manual ban voting module - quorum sessions and their in-memory registry.

pub mod vote_models;
pub mod vote_tracker;

pub use vote_models::*;
pub use vote_tracker::*;
