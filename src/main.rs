// This is the entry point of the anti-spam bot.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic)
// - `infra/` = Implementations of core traits (storage)
// - `telegram/` = Telegram-specific adapters (commands, events, transport)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Set up the dispatcher and start polling

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "infra/infra_layer.rs"]
mod infra;
#[path = "telegram/telegram_layer.rs"]
mod telegram;

use crate::core::classifier::{ClassifierConfig, SpamClassifier};
use crate::core::enforcement::EnforcementService;
use crate::core::registry::RegistryService;
use crate::core::voting::VoteTracker;
use crate::infra::registry::JsonRegistryStore;
use crate::telegram::transport::TelegramTransport;
use crate::telegram::AppContext;
use std::sync::Arc;
use std::time::Duration;
use teloxide::dptree;
use teloxide::prelude::*;

const DEFAULT_TRANSPORT_TIMEOUT_SECS: u64 = 30;

fn env_flag(name: &str, default: bool) -> bool {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse::<bool>().ok())
        .unwrap_or(default)
}

#[tokio::main]
async fn main() {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let token = std::env::var("ANTISPAM_TOKEN").expect(
        "Missing ANTISPAM_TOKEN environment variable! Create a .env file with your bot token.",
    );

    // Keep the runtime registry in a dedicated folder so the repo root stays
    // tidy.
    let data_dir = "data";
    std::fs::create_dir_all(data_dir).expect("Failed to create data directory");
    let registry_path = format!("{}/registry.json", data_dir);

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // Create our services with their dependencies.
    // This is the "composition root" where we wire everything together.

    let registry = Arc::new(RegistryService::new(JsonRegistryStore::new(&registry_path)));

    let classifier_config = ClassifierConfig {
        enable_betting_signal: env_flag("ENABLE_BETTING_SIGNAL", true),
        require_premium_and_non_reply: env_flag("REQUIRE_PREMIUM_NON_REPLY", false),
    };
    tracing::info!(?classifier_config, "Classifier configured");
    let classifier = SpamClassifier::new(classifier_config);

    let timeout = std::env::var("TRANSPORT_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(DEFAULT_TRANSPORT_TIMEOUT_SECS);

    let bot = Bot::new(token);
    let transport = Arc::new(TelegramTransport::new(
        bot.clone(),
        Duration::from_secs(timeout),
    ));
    let enforcement = EnforcementService::new(Arc::clone(&transport), Arc::clone(&registry));

    let context = Arc::new(AppContext {
        registry,
        classifier,
        enforcement,
        votes: VoteTracker::new(),
        transport,
    });

    // ========================================================================
    // DISPATCHER SETUP
    // ========================================================================

    tracing::info!("Bot is starting up...");

    Dispatcher::builder(bot, telegram::schema())
        .dependencies(dptree::deps![context])
        .default_handler(|_upd| async move {})
        .error_handler(LoggingErrorHandler::with_custom_text("Dispatcher error"))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}
