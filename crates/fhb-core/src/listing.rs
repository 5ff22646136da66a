//! Post types and the listing policy (title cleanup, closed/NSFW filtering).

use chrono::{DateTime, Utc};
use regex::Regex;

/// Bracketed title tags shorter than this (brackets included) are flair noise.
const MAX_STRIPPED_TAG_LEN: usize = 11;

/// Flair fragments that mark a listing as closed or not a hiring post.
const EXCLUDED_FLAIR_FRAGMENTS: [&str; 2] = ["for", "filled"];

/// One entry of a listing fetch, as returned by the content source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListingEntry {
    pub title: String,
    pub category: Option<String>,
    pub reference: String,
    pub age_restricted: bool,
}

/// One post as returned by a detail fetch.
#[derive(Clone, Debug, PartialEq)]
pub struct PostRecord {
    pub title: String,
    pub category: Option<String>,
    pub up_score: i64,
    pub down_score: i64,
    pub author: String,
    pub comment_count: i64,
    pub reference: String,
    pub created_at_epoch_seconds: i64,
}

/// A listing row ready for display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemSummary {
    pub title: String,
    pub reference: String,
}

/// A post ready for display.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemDetail {
    pub title: String,
    pub category: Option<String>,
    pub up_score: i64,
    pub down_score: i64,
    pub author: String,
    pub comment_count: i64,
    pub reference: String,
    pub created_at: String,
}

impl From<PostRecord> for ItemDetail {
    fn from(p: PostRecord) -> Self {
        Self {
            title: sanitize_title(&p.title),
            category: p.category,
            up_score: p.up_score,
            down_score: p.down_score,
            author: p.author,
            comment_count: p.comment_count,
            reference: p.reference,
            created_at: format_created_at(p.created_at_epoch_seconds),
        }
    }
}

/// Remove short bracketed tags like `[M]` or `[Hiring]` from a title.
///
/// Tags of 11 characters or more are part of the title and stay.
pub fn sanitize_title(title: &str) -> String {
    let tag_re = Regex::new(r"\[(.*?)\]").expect("valid regex");

    let short_tags: Vec<&str> = tag_re
        .find_iter(title)
        .map(|m| m.as_str())
        .filter(|tag| tag.chars().count() < MAX_STRIPPED_TAG_LEN)
        .collect();

    let mut out = title.to_string();
    for tag in short_tags {
        out = out.replacen(tag, "", 1).trim().to_string();
    }
    out
}

/// Whether a listing entry is shown to the user.
///
/// Age-restricted posts are always hidden. So are posts whose flair contains
/// "for" or "filled" (case-insensitive), i.e. `[For Hire]` and closed ads.
pub fn is_listable(entry: &ListingEntry) -> bool {
    if entry.age_restricted {
        return false;
    }
    let Some(category) = &entry.category else {
        return true;
    };
    let lower = category.to_lowercase();
    !EXCLUDED_FLAIR_FRAGMENTS
        .iter()
        .any(|fragment| lower.contains(fragment))
}

/// Filter and clean a raw listing, keeping upstream order.
pub fn summarize(entries: Vec<ListingEntry>) -> Vec<ItemSummary> {
    entries
        .into_iter()
        .filter(is_listable)
        .map(|e| ItemSummary {
            title: sanitize_title(&e.title),
            reference: e.reference,
        })
        .collect()
}

/// RFC 7231 style UTC date, e.g. `Tue, 20 Oct 2026 08:00:00 GMT`.
pub fn format_created_at(epoch_seconds: i64) -> String {
    match DateTime::<Utc>::from_timestamp(epoch_seconds, 0) {
        Some(dt) => dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string(),
        None => "unknown".to_string(),
    }
}
