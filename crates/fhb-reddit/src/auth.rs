//! Reddit OAuth token provider (refresh-token grant).

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::debug;

use fhb_core::{errors::Error, ports::CredentialProvider, Result};

const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";

/// Tokens are treated as stale this long before Reddit expires them.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Reddit hands out one-hour tokens when `expires_in` is missing.
const DEFAULT_LIFETIME: Duration = Duration::from_secs(3600);

#[derive(Clone, Debug)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

#[derive(Debug)]
struct CachedToken {
    value: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_fresh_at(&self, now: Instant) -> bool {
        now + EXPIRY_MARGIN < self.expires_at
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<u64>,
    error: Option<String>,
}

impl TokenResponse {
    fn into_token(self, now: Instant) -> Result<CachedToken> {
        if let Some(err) = self.error {
            return Err(Error::Auth(format!("reddit token error: {err}")));
        }
        let Some(value) = self.access_token.filter(|t| !t.is_empty()) else {
            return Err(Error::Auth(
                "reddit token response has no access_token".to_string(),
            ));
        };
        let lifetime = self
            .expires_in
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_LIFETIME);
        Ok(CachedToken {
            value,
            expires_at: now + lifetime,
        })
    }
}

/// Caches one access token and refreshes it when stale.
///
/// The cache lock is held during a refresh, so concurrent callers wait for a
/// single token request instead of racing.
pub struct RedditTokenProvider {
    http: reqwest::Client,
    creds: RedditCredentials,
    cached: Mutex<Option<CachedToken>>,
}

impl RedditTokenProvider {
    pub fn new(http: reqwest::Client, creds: RedditCredentials) -> Self {
        Self {
            http,
            creds,
            cached: Mutex::new(None),
        }
    }

    async fn refresh(&self) -> Result<CachedToken> {
        let resp = self
            .http
            .post(TOKEN_URL)
            .basic_auth(&self.creds.client_id, Some(&self.creds.client_secret))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", self.creds.refresh_token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::Auth(format!("reddit token request error: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Auth(format!(
                "reddit token refresh failed: {status} {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        let body: TokenResponse = resp
            .json()
            .await
            .map_err(|e| Error::Auth(format!("reddit token json error: {e}")))?;
        body.into_token(Instant::now())
    }
}

#[async_trait]
impl CredentialProvider for RedditTokenProvider {
    async fn bearer(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.is_fresh_at(Instant::now()) {
                return Ok(token.value.clone());
            }
        }

        debug!("refreshing reddit access token");
        let fresh = self.refresh().await?;
        let value = fresh.value.clone();
        *cached = Some(fresh);
        Ok(value)
    }

    async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }
}
