// The core module contains all business logic.
// Each feature gets its own submodule; nothing here knows about Telegram.

#[path = "classifier/mod.rs"]
pub mod classifier;

#[path = "registry/mod.rs"]
pub mod registry;

#[path = "enforcement/mod.rs"]
pub mod enforcement;

#[path = "voting/mod.rs"]
pub mod voting;
