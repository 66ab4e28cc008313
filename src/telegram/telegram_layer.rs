// Telegram layer - commands, event handlers and the transport adapter.

#[path = "commands.rs"]
pub mod commands;

#[path = "formatter.rs"]
pub mod formatter;

#[path = "handlers.rs"]
pub mod handlers;

#[path = "transport.rs"]
pub mod transport;

use crate::core::classifier::SpamClassifier;
use crate::core::enforcement::EnforcementService;
use crate::core::registry::RegistryService;
use crate::core::voting::VoteTracker;
use crate::infra::registry::JsonRegistryStore;
use std::sync::Arc;
use teloxide::dispatching::UpdateHandler;
use teloxide::dptree;
use teloxide::prelude::*;
use transport::TelegramTransport;

/// Shared state handed to every handler through the dispatcher.
pub struct AppContext {
    pub registry: Arc<RegistryService<JsonRegistryStore>>,
    pub classifier: SpamClassifier,
    pub enforcement: EnforcementService<TelegramTransport, JsonRegistryStore>,
    pub votes: VoteTracker,
    /// Shared with the enforcement engine; command handlers use it for
    /// admin checks and chat titles so those calls get the same bounded
    /// timeout.
    pub transport: Arc<TelegramTransport>,
}

/// The dispatch tree: commands first, then the automatic check; callback
/// queries feed the vote tracker.
pub fn schema() -> UpdateHandler<anyhow::Error> {
    dptree::entry()
        .branch(
            Update::filter_message()
                .branch(
                    dptree::entry()
                        .filter_command::<commands::Command>()
                        .endpoint(commands::handle_command),
                )
                .endpoint(handlers::handle_message),
        )
        .branch(Update::filter_callback_query().endpoint(handlers::handle_callback))
}
