use serde::{Deserialize, Serialize};

/// Activity category assigned to one follower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityCategory {
    HighlyActive,
    Active,
    LowActivity,
    SuspectedBot,
}

/// Point values for the follower activity score.
///
/// These are product heuristics, not verified truths; they are plain fields
/// so they can be tuned without code changes elsewhere.
#[derive(Debug, Clone)]
pub struct ScoreWeights {
    pub enhanced_verified: i64,
    pub custom_avatar: i64,
    pub banner_set: i64,
    pub posts_high: i64,
    pub posts_mid: i64,
    pub posts_low: i64,
    pub media_output: i64,
    pub likes_high: i64,
    pub likes_mid: i64,
    pub pinned_post: i64,
    pub follower_ratio: i64,
    pub new_account_penalty: i64,
    pub aged_account_bonus: i64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            enhanced_verified: 25,
            custom_avatar: 10,
            banner_set: 5,
            posts_high: 15,
            posts_mid: 10,
            posts_low: 5,
            media_output: 10,
            likes_high: 10,
            likes_mid: 5,
            pinned_post: 10,
            follower_ratio: 10,
            new_account_penalty: 20,
            aged_account_bonus: 5,
        }
    }
}

/// Score cutoffs for the four activity categories.
#[derive(Debug, Clone)]
pub struct ClassifyThresholds {
    pub highly_active: u32,
    pub active: u32,
    pub low_activity: u32,
}

impl Default for ClassifyThresholds {
    fn default() -> Self {
        Self {
            highly_active: 80,
            active: 45,
            low_activity: 20,
        }
    }
}

/// Count and share of one category within an analyzed population.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryStat {
    pub count: usize,
    pub percent: f64,
}

/// Aggregate activity breakdown for a follower population.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClassificationSummary {
    pub highly_active: CategoryStat,
    pub active: CategoryStat,
    pub low_activity: CategoryStat,
    pub suspected_bot: CategoryStat,
    /// `round(100 × (highly_active + active) / total)`; 0 for an empty set.
    pub health_score: u32,
    pub total_analyzed: usize,
}

/// Count and share of one bucket of a distribution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BucketStat {
    pub count: usize,
    pub percent: f64,
}

/// Post-length buckets (in characters).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CharacterDistribution {
    /// > 2000 characters.
    pub super_long: BucketStat,
    /// 200–2000 characters.
    pub long: BucketStat,
    /// 100–199 characters.
    pub medium: BucketStat,
    /// < 100 characters.
    pub short: BucketStat,
}

/// View-count buckets.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewsDistribution {
    pub under_1k: BucketStat,
    pub from_1k_to_5k: BucketStat,
    pub from_5k_to_20k: BucketStat,
    pub from_20k_to_100k: BucketStat,
    pub over_100k: BucketStat,
}

/// Posts per Sunday-aligned week, labelled `MM-DD` by the week's start date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyCount {
    pub week: String,
    pub count: usize,
}

/// Descriptive statistics over one collected tweet history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TweetAnalytics {
    pub total_count: usize,
    /// Posts per day over the observed date span, rounded to 2 decimals.
    pub avg_daily_rate: f64,
    /// At most the 20 most recent weeks, chronologically ascending.
    pub weekly_series: Vec<WeeklyCount>,
    pub avg_character_count: u64,
    pub character_distribution: CharacterDistribution,
    pub views_distribution: ViewsDistribution,
    /// Post count per UTC hour of day.
    pub hourly_activity: [u32; 24],
}

impl Default for TweetAnalytics {
    fn default() -> Self {
        Self {
            total_count: 0,
            avg_daily_rate: 0.0,
            weekly_series: Vec::new(),
            avg_character_count: 0,
            character_distribution: CharacterDistribution::default(),
            views_distribution: ViewsDistribution::default(),
            hourly_activity: [0; 24],
        }
    }
}

/// One top-viewed post, shaped for direct rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotPost {
    pub id: String,
    /// `YYYY/MM/DD` of the post date.
    pub date: String,
    pub text: String,
    pub view_count: u64,
    pub like_count: u64,
    pub repost_count: u64,
    pub reply_count: u64,
    pub url: String,
}

/// Time-relative statistics over the trailing 24 hours.
///
/// Recomputed from the raw post list on every read; never cached as a fixed
/// number.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rolling24hStats {
    pub total_views: u64,
    pub avg_engagement_rate: f64,
}
