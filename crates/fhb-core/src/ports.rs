use async_trait::async_trait;

use crate::{
    listing::{ListingEntry, PostRecord},
    Result,
};

/// Hexagonal port for the content feed (Reddit today).
///
/// Any error returned here is a collaborator failure; the engine does not retry.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Newest posts of `source`, newest first, at most `limit`.
    async fn fetch_recent(&self, source: &str, limit: usize) -> Result<Vec<ListingEntry>>;

    /// A single post by reference. Fails if the reference does not resolve.
    async fn fetch_detail(&self, reference: &str) -> Result<PostRecord>;

    /// True only if `candidate` is a post reference of this source that resolves.
    async fn validate(&self, candidate: &str) -> Result<bool>;
}

/// Supplies a bearer credential for authorized content-source calls.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Current token, refreshed first if missing or stale.
    async fn bearer(&self) -> Result<String>;

    /// Drop the cached token so the next `bearer()` refreshes (e.g. after a 401).
    async fn invalidate(&self);
}
