//! Formatting utilities (Telegram HTML for listings and post details).

use crate::listing::{ItemDetail, ItemSummary};

/// Trailing line of every listing reply.
pub const LISTING_INSTRUCTION: &str = "Send post number to get details.";

/// Escape HTML special characters for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// `<a href="url">text</a>` with both parts escaped.
pub fn link(href: &str, text: &str) -> String {
    format!(r#"<a href="{}">{}</a>"#, escape_html(href), escape_html(text))
}

/// Numbered listing, one `"<n> - <link>"` block per item, then the instruction.
pub fn format_listing(items: &[ItemSummary]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{} - {}", i + 1, link(&item.reference, &item.title)))
        .chain(std::iter::once(LISTING_INSTRUCTION.to_string()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn format_detail(post: &ItemDetail) -> String {
    let flair = post.category.as_deref().unwrap_or("none");
    let fields = [
        ("Title", link(&post.reference, &post.title)),
        ("Flair", escape_html(flair)),
        ("Upvotes", post.up_score.to_string()),
        ("Downvotes", post.down_score.to_string()),
        ("Author", escape_html(&post.author)),
        ("Comments", post.comment_count.to_string()),
        ("Date", escape_html(&post.created_at)),
    ];

    fields
        .iter()
        .map(|(label, value)| format!("- <b>{label} :</b> {value}"))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Split a reply into messages of at most `limit` characters.
///
/// Cuts only between blank-line separated blocks so a listing entry (and its
/// `<a>` tag) stays whole. A single block longer than `limit` is cut hard, see
/// [`hard_split`].
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    if text.chars().count() <= limit {
        return vec![text.to_string()];
    }

    let mut out = Vec::new();
    let mut cur = String::new();
    let mut cur_len = 0usize;

    for block in text.split("\n\n") {
        let block_len = block.chars().count();

        if block_len > limit {
            if !cur.is_empty() {
                out.push(std::mem::take(&mut cur));
                cur_len = 0;
            }
            hard_split(block, limit, &mut out);
            continue;
        }

        let sep = if cur.is_empty() { 0 } else { 2 };
        if cur_len + sep + block_len > limit {
            out.push(std::mem::take(&mut cur));
            cur_len = 0;
        }
        if !cur.is_empty() {
            cur.push_str("\n\n");
            cur_len += 2;
        }
        cur.push_str(block);
        cur_len += block_len;
    }

    if !cur.is_empty() {
        out.push(cur);
    }
    out
}

/// Cut `block` into pieces of at most `limit` chars, never inside a `<...>` tag.
///
/// An element can still open in one piece and close in the next. Blocks never
/// get that long in practice: Reddit caps titles at 300 chars.
fn hard_split(block: &str, limit: usize, out: &mut Vec<String>) {
    let chars: Vec<char> = block.chars().collect();
    let mut start = 0;
    while start < chars.len() {
        let mut end = (start + limit).min(chars.len());
        if end < chars.len() {
            let piece = &chars[start..end];
            let open = piece.iter().rposition(|&c| c == '<');
            let close = piece.iter().rposition(|&c| c == '>');
            if let Some(open) = open.filter(|&o| o > 0 && close.map_or(true, |c| c < o)) {
                end = start + open;
            }
        }
        out.push(chars[start..end].iter().collect());
        start = end;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(title: &str, n: usize) -> ItemSummary {
        ItemSummary {
            title: title.to_string(),
            reference: format!("https://www.reddit.com/r/forhire/comments/{n}"),
        }
    }

    #[test]
    fn escapes_html() {
        let s = r#"<a href="x&y">"#;
        assert_eq!(escape_html(s), "&lt;a href=&quot;x&amp;y&quot;&gt;");
    }

    #[test]
    fn formats_numbered_listing_with_instruction() {
        let html = format_listing(&[summary("Logo", 1), summary("Site", 2)]);
        assert_eq!(
            html,
            "1 - <a href=\"https://www.reddit.com/r/forhire/comments/1\">Logo</a>\n\n\
             2 - <a href=\"https://www.reddit.com/r/forhire/comments/2\">Site</a>\n\n\
             Send post number to get details."
        );
    }

    #[test]
    fn empty_listing_is_only_the_instruction() {
        assert_eq!(format_listing(&[]), LISTING_INSTRUCTION);
    }

    #[test]
    fn listing_titles_are_escaped() {
        let html = format_listing(&[summary("C++ & <Rust>", 1)]);
        assert!(html.contains("C++ &amp; &lt;Rust&gt;"));
    }

    #[test]
    fn formats_detail_block() {
        let detail = ItemDetail {
            title: "Need a logo".to_string(),
            category: None,
            up_score: 3,
            down_score: 0,
            author: "alice".to_string(),
            comment_count: 7,
            reference: "https://www.reddit.com/r/forhire/comments/abc".to_string(),
            created_at: "Thu, 01 Jan 1970 00:00:00 GMT".to_string(),
        };
        let html = format_detail(&detail);
        assert!(html.starts_with("- <b>Title :</b> <a href="));
        assert!(html.contains("- <b>Flair :</b> none"));
        assert!(html.contains("- <b>Upvotes :</b> 3\n\n- <b>Downvotes :</b> 0"));
        assert!(html.contains("- <b>Author :</b> alice"));
        assert!(html.ends_with("- <b>Date :</b> Thu, 01 Jan 1970 00:00:00 GMT"));
    }

    #[test]
    fn short_text_is_not_split() {
        assert_eq!(split_message("hello", 4096), vec!["hello".to_string()]);
    }

    #[test]
    fn splits_on_block_boundaries() {
        let text = "aaaa\n\nbbbb\n\ncccc";
        let chunks = split_message(text, 10);
        assert_eq!(chunks, vec!["aaaa\n\nbbbb", "cccc"]);
    }

    #[test]
    fn hard_splits_oversized_block() {
        let text = format!("{}\n\nok", "x".repeat(25));
        let chunks = split_message(&text, 10);
        assert_eq!(chunks.len(), 4);
        assert!(chunks.iter().all(|c| c.chars().count() <= 10));
        assert_eq!(chunks.last().map(String::as_str), Some("ok"));
    }

    #[test]
    fn hard_split_keeps_tags_whole() {
        let text = format!("{}<b>x</b>", "y".repeat(8));
        assert_eq!(split_message(&text, 10), vec!["yyyyyyyy", "<b>x</b>"]);
    }
}
