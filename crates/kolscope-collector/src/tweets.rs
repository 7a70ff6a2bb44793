//! Parser for the user-tweets timeline envelope.

use serde_json::Value;

use kolscope_core::Post;

use crate::paginate::Page;
use crate::wire::{count_field, parse_twitter_timestamp, str_field};

const INSTRUCTIONS_PATH: &str = "/data/data/user/result/timeline_v2/timeline/instructions";

/// Extracts posts and the next cursor from a normalized user-tweets response.
///
/// A `TimelinePinEntry` contributes its single entry: the pinned post is
/// analyzed like any other. Entries without a parsable `legacy` payload or
/// timestamp are dropped.
pub(crate) fn parse_tweets_page(root: &Value) -> Page<Post> {
    let mut items = Vec::new();
    let mut next_cursor = None;

    let instructions = root
        .pointer(INSTRUCTIONS_PATH)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    for instruction in instructions {
        let entries: Vec<&Value> = match instruction.get("type").and_then(Value::as_str) {
            Some("TimelineAddEntries") => instruction
                .get("entries")
                .and_then(Value::as_array)
                .map(|e| e.iter().collect())
                .unwrap_or_default(),
            Some("TimelinePinEntry") => instruction.get("entry").into_iter().collect(),
            _ => Vec::new(),
        };

        for entry in entries {
            let content = entry.get("content").cloned().unwrap_or(Value::Null);
            if content.get("cursorType").and_then(Value::as_str) == Some("Bottom") {
                if let Some(value) = content.get("value").and_then(Value::as_str) {
                    next_cursor = Some(value.to_owned());
                }
                continue;
            }
            let entry_id = entry.get("entryId").and_then(Value::as_str).unwrap_or("");
            if !entry_id.starts_with("tweet-") && !entry_id.starts_with("pinEntry-") {
                continue;
            }
            let result = content
                .pointer("/itemContent/tweet_results/result")
                .cloned()
                .unwrap_or(Value::Null);
            if let Some(post) = parse_tweet_result(&result) {
                items.push(post);
            }
        }
    }

    Page { items, next_cursor }
}

fn parse_tweet_result(result: &Value) -> Option<Post> {
    // Some entries nest the real tweet one level down.
    let tweet = result.get("tweet").unwrap_or(result);
    let legacy = tweet.get("legacy")?;
    let id = tweet.get("rest_id").and_then(Value::as_str)?;
    let created_at = legacy
        .get("created_at")
        .and_then(Value::as_str)
        .and_then(parse_twitter_timestamp)?;

    // View counts live under tweet.views on current payloads and under
    // legacy.views on older ones; either may be a string.
    let views = tweet
        .pointer("/views/count")
        .or_else(|| legacy.pointer("/views/count"));

    Some(Post::new(
        id,
        str_field(legacy, "full_text"),
        created_at,
        count_field(views),
        count_field(legacy.get("favorite_count")),
        count_field(legacy.get("retweet_count")),
        count_field(legacy.get("reply_count")),
    ))
}
