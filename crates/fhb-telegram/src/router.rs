use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*, update_listeners::webhooks};
use tracing::{debug, info};

use fhb_core::{
    config::Config,
    engine::ConversationEngine,
    messaging::{
        port::MessagingPort,
        throttled::{ThrottleConfig, ThrottledMessenger},
    },
};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ConversationEngine>,
    pub messenger: Arc<dyn MessagingPort>,
}

/// Run the bot until the process is stopped.
///
/// With a public base URL configured this serves the Telegram webhook
/// (registered on startup); otherwise it long-polls.
pub async fn run(cfg: Arc<Config>, engine: Arc<ConversationEngine>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    match bot.get_me().await {
        Ok(me) => info!("fhb started: @{}", me.username()),
        Err(e) => anyhow::bail!("telegram getMe failed: {e}"),
    }
    info!(
        subreddit = %cfg.subreddit,
        limit = cfg.listing_limit,
        "serving listings"
    );

    // Split listings go out as bursts; throttle them below Telegram's flood limits.
    let raw_messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(
        bot.clone(),
        cfg.telegram_message_limit,
    ));
    let messenger: Arc<dyn MessagingPort> = Arc::new(ThrottledMessenger::new(
        raw_messenger,
        ThrottleConfig::default(),
    ));

    let state = Arc::new(AppState {
        engine,
        messenger,
    });

    let handler = Update::filter_message().endpoint(handlers::handle_message);

    let mut dispatcher = Dispatcher::builder(bot.clone(), handler)
        .dependencies(dptree::deps![state])
        .default_handler(|upd| async move {
            debug!(update_id = upd.id, "ignoring non-message update");
        })
        .build();

    match cfg.webhook_url() {
        Some(url) => {
            // The URL carries the bot token; log only the listen address.
            info!(addr = %cfg.listen_addr, "webhook mode");
            let options = webhooks::Options::new(cfg.listen_addr, url.parse()?);
            let listener = webhooks::axum(bot, options).await?;
            dispatcher
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("webhook listener error"),
                )
                .await;
        }
        None => {
            info!("long polling mode");
            dispatcher.dispatch().await;
        }
    }

    Ok(())
}
