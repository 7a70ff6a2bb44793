use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// The analyzed identity, supplied by an external authentication flow.
///
/// The core treats this as opaque input: it never performs authentication
/// itself and never persists credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    /// Stable upstream account id (numeric string on X).
    pub id: String,
    /// Screen name without the leading `@`.
    pub handle: String,
    pub avatar_url: Option<String>,
}

impl Subject {
    #[must_use]
    pub fn new(id: impl Into<String>, handle: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            handle: handle.into(),
            avatar_url: None,
        }
    }
}

/// Basic profile card for the analyzed account itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub display_name: String,
    pub follower_count: u64,
    pub bio: String,
    pub avatar_url: String,
}

/// One account found in a followers listing.
///
/// Unique by `handle` within a single collection run; the collector
/// deduplicates because the upstream API repeats entries at page boundaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowerProfile {
    pub handle: String,
    pub display_name: String,
    pub follower_count: u64,
    pub following_count: u64,
    pub post_count: u64,
    pub like_count: u64,
    pub media_count: u64,
    pub account_created_at: Option<DateTime<Utc>>,
    pub has_pinned_post: bool,
    pub is_enhanced_verified: bool,
    pub is_legacy_verified: bool,
    pub uses_default_avatar: bool,
    pub banner_url: Option<String>,
    pub bio: String,
    pub avatar_url: String,
}

/// One authored post (tweet), normalized from the upstream timeline shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub text: String,
    /// Derived from `text` at construction.
    pub character_count: usize,
    pub created_at: DateTime<Utc>,
    /// UTC hour 0–23, derived from `created_at`.
    pub hour_of_day: u32,
    pub view_count: u64,
    pub like_count: u64,
    pub repost_count: u64,
    pub reply_count: u64,
    /// `(likes + reposts + replies) / views`; `0.0` when `views == 0`.
    pub engagement_rate: f64,
}

impl Post {
    /// Builds a post, filling in the derived fields.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        text: impl Into<String>,
        created_at: DateTime<Utc>,
        view_count: u64,
        like_count: u64,
        repost_count: u64,
        reply_count: u64,
    ) -> Self {
        let text = text.into();
        #[allow(clippy::cast_precision_loss)]
        let engagement_rate = if view_count == 0 {
            0.0
        } else {
            (like_count + repost_count + reply_count) as f64 / view_count as f64
        };
        Self {
            id: id.into(),
            character_count: text.chars().count(),
            hour_of_day: created_at.hour(),
            created_at,
            view_count,
            like_count,
            repost_count,
            reply_count,
            engagement_rate,
            text,
        }
    }
}
