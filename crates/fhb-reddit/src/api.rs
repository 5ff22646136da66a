//! Reddit JSON shapes (`Listing` → `Thing` → post data).

use serde::Deserialize;

use fhb_core::{
    errors::Error,
    listing::{ListingEntry, PostRecord},
    Result,
};

use crate::WEB_BASE;

#[derive(Debug, Deserialize)]
pub struct Listing<T> {
    pub data: ListingData<T>,
}

#[derive(Debug, Deserialize)]
pub struct ListingData<T> {
    pub children: Vec<Thing<T>>,
}

#[derive(Debug, Deserialize)]
pub struct Thing<T> {
    pub data: T,
}

impl<T> Listing<T> {
    pub fn into_items(self) -> impl Iterator<Item = T> {
        self.data.children.into_iter().map(|t| t.data)
    }
}

#[derive(Debug, Deserialize)]
pub struct Post {
    pub title: String,
    #[serde(default)]
    pub link_flair_text: Option<String>,
    #[serde(default)]
    pub ups: i64,
    #[serde(default)]
    pub downs: i64,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub num_comments: i64,
    pub permalink: String,
    #[serde(default)]
    pub over_18: bool,
    #[serde(default)]
    pub created_utc: f64,
}

impl Post {
    /// Canonical `https://www.reddit.com/...` URL of the post.
    pub fn reference(&self) -> String {
        format!("{WEB_BASE}{}", self.permalink)
    }

    pub fn into_entry(self) -> ListingEntry {
        ListingEntry {
            reference: self.reference(),
            title: self.title,
            category: self.link_flair_text,
            age_restricted: self.over_18,
        }
    }

    pub fn into_record(self) -> PostRecord {
        PostRecord {
            reference: self.reference(),
            title: self.title,
            category: self.link_flair_text,
            up_score: self.ups,
            down_score: self.downs,
            author: self.author,
            comment_count: self.num_comments,
            created_at_epoch_seconds: self.created_utc as i64,
        }
    }
}

/// The post of a `/comments/<id>` response: `[post listing, comment listing]`.
pub fn post_from_comments_page(pages: Vec<Listing<serde_json::Value>>) -> Result<Post> {
    let data = pages
        .into_iter()
        .next()
        .and_then(|page| page.into_items().next())
        .ok_or_else(|| Error::External("reddit post response has no post".to_string()))?;
    Ok(serde_json::from_value(data)?)
}
