//! Cached payload shapes and the assembled read-side snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kolscope_analytics::{ClassificationSummary, HotPost, Rolling24hStats, TweetAnalytics};
use kolscope_core::{FollowerProfile, Post, ProfileSummary};

/// Follower-side aggregates derived from one collection run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowerAnalytics {
    /// Top followers ranked by follower count, descending.
    pub top_followers: Vec<FollowerProfile>,
    pub enhanced_verified_count: usize,
    pub classification: ClassificationSummary,
}

/// Cache payload for the follower namespace.
///
/// Either half may be missing after a partial run; merging folds the fresher
/// half over whatever was stored before. Only entries with analytics present
/// count as usable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowerSnapshot {
    pub profile_summary: Option<ProfileSummary>,
    pub analytics: Option<FollowerAnalytics>,
}

impl FollowerSnapshot {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.analytics.is_some()
    }

    /// Field-wise merge; fresh values win, prior values fill the gaps.
    #[must_use]
    pub fn merged(prior: Self, fresh: Self) -> Self {
        Self {
            profile_summary: fresh.profile_summary.or(prior.profile_summary),
            analytics: fresh.analytics.or(prior.analytics),
        }
    }
}

/// Cache payload for the tweet namespace.
///
/// Keeps the raw post list alongside the aggregates so time-relative stats
/// can be recomputed on every read instead of going stale in the cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TweetSnapshot {
    pub raw_posts: Vec<Post>,
    pub analytics: TweetAnalytics,
    pub hot_posts: Vec<HotPost>,
}

/// Everything the presentation layer needs for one subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsSnapshot {
    pub subject_id: String,
    /// Collection time of the oldest contributing cache entry.
    pub captured_at: DateTime<Utc>,
    pub profile_summary: Option<ProfileSummary>,
    pub follower_analytics: FollowerAnalytics,
    pub tweet_analytics: TweetAnalytics,
    pub hot_posts: Vec<HotPost>,
    /// Recomputed from the raw post list at read time.
    pub rolling_24h: Rolling24hStats,
}
