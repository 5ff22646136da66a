//! Reddit adapter (content source).
//!
//! Implements the `fhb-core` ContentSource port over the Reddit OAuth API.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use fhb_core::{
    errors::Error,
    listing::{ListingEntry, PostRecord},
    ports::{ContentSource, CredentialProvider},
    Result,
};

mod api;
pub mod auth;

pub use auth::{RedditCredentials, RedditTokenProvider};

const WEB_BASE: &str = "https://www.reddit.com";
const OAUTH_BASE: &str = "https://oauth.reddit.com";

/// Shared HTTP client: every Reddit request carries the user agent and a timeout.
pub fn http_client(user_agent: &str, timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()
        .map_err(|e| Error::Config(format!("reddit http client: {e}")))
}

/// Rewrite a `www.reddit.com` post URL to the OAuth host.
pub fn to_oauth_url(reference: &str) -> String {
    match reference.strip_prefix(WEB_BASE) {
        Some(rest) => format!("{OAUTH_BASE}{rest}"),
        None => reference.to_string(),
    }
}

pub struct RedditClient {
    http: reqwest::Client,
    auth: Arc<dyn CredentialProvider>,
    reference_prefix: String,
}

impl RedditClient {
    pub fn new(
        http: reqwest::Client,
        auth: Arc<dyn CredentialProvider>,
        reference_prefix: impl Into<String>,
    ) -> Self {
        Self {
            http,
            auth,
            reference_prefix: reference_prefix.into(),
        }
    }

    async fn send_get(&self, url: &str) -> Result<reqwest::Response> {
        let token = self.auth.bearer().await?;
        self.http
            .get(url)
            .bearer_auth(token)
            .query(&[("raw_json", "1")])
            .send()
            .await
            .map_err(|e| Error::External(format!("reddit request error: {e}")))
    }

    /// GET with a bearer token; a 401 drops the token and retries once.
    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        let resp = self.send_get(url).await?;
        if resp.status() != StatusCode::UNAUTHORIZED {
            return Ok(resp);
        }

        warn!("reddit rejected the access token, refreshing");
        self.auth.invalidate().await;
        self.send_get(url).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<T> {
        let resp = self.get(url).await?;
        if !resp.status().is_success() {
            return Err(status_error(what, resp).await);
        }

        resp.json()
            .await
            .map_err(|e| Error::External(format!("reddit {what} json error: {e}")))
    }

    /// The post behind a comments-page URL, `None` if the URL is not a post.
    async fn lookup_post(&self, reference: &str) -> Result<Option<api::Post>> {
        let resp = self.get(&to_oauth_url(reference)).await?;
        let status = resp.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::BAD_REQUEST {
            debug!(%status, "no post at reference");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(status_error("post", resp).await);
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| Error::External(format!("reddit post read error: {e}")))?;
        let pages: Vec<api::Listing<serde_json::Value>> = match serde_json::from_slice(&body) {
            Ok(pages) => pages,
            Err(e) => {
                debug!(error = %e, "reference is not a comments page");
                return Ok(None);
            }
        };
        Ok(api::post_from_comments_page(pages).ok())
    }
}

/// 401/403 are credential failures; every other status is an upstream failure.
async fn status_error(what: &str, resp: reqwest::Response) -> Error {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    let msg = format!(
        "reddit {what} failed: {status} {}",
        body.chars().take(200).collect::<String>()
    );
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Auth(msg),
        _ => Error::External(msg),
    }
}

#[async_trait]
impl ContentSource for RedditClient {
    async fn fetch_recent(&self, source: &str, limit: usize) -> Result<Vec<ListingEntry>> {
        let url = format!("{OAUTH_BASE}/r/{source}/new?limit={limit}");
        let page: api::Listing<api::Post> = self.get_json(&url, "listing").await?;
        Ok(page.into_items().map(api::Post::into_entry).collect())
    }

    async fn fetch_detail(&self, reference: &str) -> Result<PostRecord> {
        self.lookup_post(reference)
            .await?
            .map(api::Post::into_record)
            .ok_or_else(|| Error::External(format!("reddit has no post at {reference}")))
    }

    /// True only when the URL has the post prefix and resolves to a post.
    async fn validate(&self, candidate: &str) -> Result<bool> {
        if !candidate.starts_with(&self.reference_prefix) {
            return Ok(false);
        }
        Ok(self.lookup_post(candidate).await?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    #[derive(Default)]
    struct CountingAuth {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CredentialProvider for CountingAuth {
        async fn bearer(&self) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(Error::Auth("offline".to_string()))
        }

        async fn invalidate(&self) {}
    }

    #[test]
    fn rewrites_web_urls_to_oauth_host() {
        assert_eq!(
            to_oauth_url("https://www.reddit.com/r/forhire/comments/abc/x/"),
            "https://oauth.reddit.com/r/forhire/comments/abc/x/"
        );
        assert_eq!(to_oauth_url("https://example.com/a"), "https://example.com/a");
    }

    #[tokio::test]
    async fn validate_rejects_foreign_prefix_without_requests() {
        let auth = Arc::new(CountingAuth::default());
        let client = RedditClient::new(
            reqwest::Client::new(),
            auth.clone(),
            "https://www.reddit.com/r/forhire/comments/",
        );

        let ok = client
            .validate("https://www.reddit.com/r/rust/comments/abc/")
            .await
            .unwrap();
        assert!(!ok);
        assert_eq!(auth.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn credential_failure_surfaces_as_auth_error() {
        let auth = Arc::new(CountingAuth::default());
        let client = RedditClient::new(
            reqwest::Client::new(),
            auth.clone(),
            "https://www.reddit.com/r/forhire/comments/",
        );

        let err = client.fetch_recent("forhire", 5).await.unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
        assert_eq!(auth.calls.load(Ordering::SeqCst), 1);
    }

    #[derive(Default)]
    struct StaticAuth {
        invalidations: AtomicUsize,
    }

    #[async_trait]
    impl CredentialProvider for StaticAuth {
        async fn bearer(&self) -> Result<String> {
            Ok("token".to_string())
        }

        async fn invalidate(&self) {
            self.invalidations.fetch_add(1, Ordering::SeqCst);
        }
    }

    const POST_PATH: &str = "/r/forhire/comments/abc/logo/";

    fn comments_page() -> serde_json::Value {
        json!([
            {"kind": "Listing", "data": {"children": [{"kind": "t3", "data": {
                "title": "[Hiring] Logo",
                "link_flair_text": "Hiring",
                "permalink": POST_PATH,
                "ups": 2,
                "author": "alice",
                "num_comments": 3,
                "created_utc": 0.0
            }}]}},
            {"kind": "Listing", "data": {"children": []}}
        ])
    }

    async fn client_for(server: &MockServer) -> (RedditClient, Arc<StaticAuth>) {
        let auth = Arc::new(StaticAuth::default());
        let client = RedditClient::new(
            reqwest::Client::new(),
            auth.clone(),
            format!("{}/r/forhire/comments/", server.uri()),
        );
        (client, auth)
    }

    async fn respond(server: &MockServer, status: u16) {
        Mock::given(method("GET"))
            .and(path(POST_PATH))
            .respond_with(ResponseTemplate::new(status))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn validate_accepts_a_resolvable_post() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(POST_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(comments_page()))
            .mount(&server)
            .await;
        let (client, _) = client_for(&server).await;
        let url = format!("{}{POST_PATH}", server.uri());

        assert!(client.validate(&url).await.unwrap());
        let record = client.fetch_detail(&url).await.unwrap();
        assert_eq!(record.author, "alice");
        assert_eq!(record.comment_count, 3);
    }

    #[tokio::test]
    async fn validate_rejects_missing_post() {
        let server = MockServer::start().await;
        respond(&server, 404).await;
        let (client, _) = client_for(&server).await;

        let ok = client
            .validate(&format!("{}{POST_PATH}", server.uri()))
            .await
            .unwrap();
        assert!(!ok);
    }

    #[tokio::test]
    async fn validate_rejects_pages_that_are_not_posts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/r/forhire/comments/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"kind": "Listing", "data": {"children": []}})),
            )
            .mount(&server)
            .await;
        let (client, _) = client_for(&server).await;
        let url = format!("{}/r/forhire/comments/", server.uri());

        assert!(!client.validate(&url).await.unwrap());
        assert!(matches!(
            client.fetch_detail(&url).await,
            Err(Error::External(_))
        ));
    }

    #[tokio::test]
    async fn persistent_unauthorized_is_an_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(POST_PATH))
            .respond_with(ResponseTemplate::new(401))
            .expect(2)
            .mount(&server)
            .await;
        let (client, auth) = client_for(&server).await;

        let err = client
            .validate(&format!("{}{POST_PATH}", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
        assert_eq!(auth.invalidations.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn forbidden_is_an_auth_error() {
        let server = MockServer::start().await;
        respond(&server, 403).await;
        let (client, _) = client_for(&server).await;

        let err = client
            .validate(&format!("{}{POST_PATH}", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
    }

    #[tokio::test]
    async fn rate_limit_and_server_errors_are_not_invalid_urls() {
        for status in [429, 503] {
            let server = MockServer::start().await;
            respond(&server, status).await;
            let (client, _) = client_for(&server).await;

            let err = client
                .validate(&format!("{}{POST_PATH}", server.uri()))
                .await
                .unwrap_err();
            assert!(matches!(err, Error::External(_)), "status {status}");
            assert!(err.is_collaborator_failure());
        }
    }

    #[tokio::test]
    async fn refreshed_token_retry_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(POST_PATH))
            .respond_with(ResponseTemplate::new(401))
            .up_to_n_times(1)
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(POST_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(comments_page()))
            .mount(&server)
            .await;
        let (client, auth) = client_for(&server).await;

        assert!(client
            .validate(&format!("{}{POST_PATH}", server.uri()))
            .await
            .unwrap());
        assert_eq!(auth.invalidations.load(Ordering::SeqCst), 1);
    }
}
