//! Alert text for newly detected competitor posts.

use chrono::{DateTime, Utc};
use scriptspy_db::CompetitorPostRow;

const CAPTION_PREVIEW_CHARS: usize = 100;

/// Build the Telegram message announcing a new post by `handle`.
#[must_use]
pub fn format_post_alert(handle: &str, post: &CompetitorPostRow, now: DateTime<Utc>) -> String {
    let kind = post
        .post_type
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map_or_else(|| "Post".to_string(), title_case);

    format!(
        "🚨 New {kind} from @{handle}!\nCaption: {caption}\nLink: {url}\nPosted: {posted}",
        caption = caption_preview(post.caption.as_deref()),
        url = post.post_url,
        posted = time_ago(post.posted_at, now),
    )
}

/// First 100 characters of the trimmed caption, with `...` when cut.
#[must_use]
pub fn caption_preview(caption: Option<&str>) -> String {
    let caption = caption.unwrap_or_default().trim();
    if caption.is_empty() {
        return "[no caption]".to_string();
    }
    let mut preview: String = caption.chars().take(CAPTION_PREVIEW_CHARS).collect();
    if caption.chars().count() > CAPTION_PREVIEW_CHARS {
        preview.push_str("...");
    }
    preview
}

/// Coarse relative age: `just now`, `Nm ago`, `Nh ago`, `Nd ago`, or `unknown`.
#[must_use]
pub fn time_ago(posted_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(posted_at) = posted_at else {
        return "unknown".to_string();
    };
    let minutes = (now - posted_at).num_minutes();
    if minutes < 1 {
        return "just now".to_string();
    }
    if minutes < 60 {
        return format!("{minutes}m ago");
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours}h ago");
    }
    format!("{}d ago", hours / 24)
}

/// Upper-case the first letter of each alphabetic run, lower-case the rest.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for ch in s.chars() {
        if ch.is_alphabetic() {
            if prev_alpha {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(ch);
            prev_alpha = false;
        }
    }
    out
}
