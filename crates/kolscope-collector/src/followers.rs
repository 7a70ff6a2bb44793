//! Parser for the followers-listing timeline envelope.

use serde_json::Value;

use kolscope_core::FollowerProfile;

use crate::paginate::Page;
use crate::wire::{bool_field, count_field, parse_twitter_timestamp, str_field};

const INSTRUCTIONS_PATH: &str = "/data/data/user/result/timeline/timeline/instructions";

/// Extracts follower profiles and the next cursor from a normalized
/// followers-listing response.
///
/// Tolerant by design: entries missing a `screen_name` (ads, prompts,
/// suspended accounts) are dropped, and a response without the expected
/// timeline structure parses as an empty, cursor-less page.
pub(crate) fn parse_followers_page(root: &Value) -> Page<FollowerProfile> {
    let mut items = Vec::new();
    let mut next_cursor = None;

    let instructions = root
        .pointer(INSTRUCTIONS_PATH)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    for instruction in instructions {
        if instruction.get("type").and_then(Value::as_str) != Some("TimelineAddEntries") {
            continue;
        }
        let entries = instruction
            .get("entries")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        for entry in entries {
            let content = entry.get("content").cloned().unwrap_or(Value::Null);
            if content.get("cursorType").and_then(Value::as_str) == Some("Bottom") {
                if let Some(value) = content.get("value").and_then(Value::as_str) {
                    next_cursor = Some(value.to_owned());
                }
                continue;
            }
            let item_content = content.get("itemContent").cloned().unwrap_or(Value::Null);
            if item_content.get("itemType").and_then(Value::as_str) != Some("TimelineUser") {
                continue;
            }
            let result = item_content
                .pointer("/user_results/result")
                .cloned()
                .unwrap_or(Value::Null);
            if let Some(profile) = parse_user_result(&result) {
                items.push(profile);
            }
        }
    }

    Page { items, next_cursor }
}

fn parse_user_result(result: &Value) -> Option<FollowerProfile> {
    let legacy = result.get("legacy")?;
    let handle = legacy.get("screen_name").and_then(Value::as_str)?;

    let has_pinned_post = legacy
        .get("pinned_tweet_ids_str")
        .and_then(Value::as_array)
        .is_some_and(|ids| !ids.is_empty());

    Some(FollowerProfile {
        handle: handle.to_owned(),
        display_name: str_field(legacy, "name"),
        follower_count: count_field(legacy.get("followers_count")),
        following_count: count_field(legacy.get("friends_count")),
        post_count: count_field(legacy.get("statuses_count")),
        like_count: count_field(legacy.get("favourites_count")),
        media_count: count_field(legacy.get("media_count")),
        account_created_at: legacy
            .get("created_at")
            .and_then(Value::as_str)
            .and_then(parse_twitter_timestamp),
        has_pinned_post,
        is_enhanced_verified: bool_field(result, "is_blue_verified"),
        is_legacy_verified: bool_field(legacy, "verified"),
        uses_default_avatar: bool_field(legacy, "default_profile_image"),
        banner_url: legacy
            .get("profile_banner_url")
            .and_then(Value::as_str)
            .map(str::to_owned),
        bio: str_field(legacy, "description"),
        avatar_url: str_field(legacy, "profile_image_url_https"),
    })
}
