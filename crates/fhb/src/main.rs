use std::sync::Arc;

use fhb_core::{
    config::Config,
    engine::{ConversationEngine, EngineConfig},
    session::InMemorySessionStore,
};
use fhb_reddit::{RedditClient, RedditCredentials, RedditTokenProvider};

#[tokio::main]
async fn main() -> Result<(), fhb_core::Error> {
    fhb_core::logging::init("fhb")?;

    let cfg = Arc::new(Config::load()?);

    let http = fhb_reddit::http_client(&cfg.reddit_user_agent, cfg.collaborator_timeout)?;
    let auth = Arc::new(RedditTokenProvider::new(
        http.clone(),
        RedditCredentials {
            client_id: cfg.reddit_client_id.clone(),
            client_secret: cfg.reddit_client_secret.clone(),
            refresh_token: cfg.reddit_refresh_token.clone(),
        },
    ));
    let reddit = Arc::new(RedditClient::new(http, auth, cfg.reference_prefix()));

    let engine = Arc::new(ConversationEngine::new(
        EngineConfig::from(cfg.as_ref()),
        reddit,
        Arc::new(InMemorySessionStore::new()),
    ));

    fhb_telegram::router::run(cfg, engine)
        .await
        .map_err(|e| fhb_core::Error::External(format!("telegram bot failed: {e}")))?;

    tracing::info!("fhb stopped");
    Ok(())
}
