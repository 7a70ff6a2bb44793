//! Follower classification and tweet statistics.
//!
//! Everything in this crate is pure computation over already-collected data:
//! no I/O, no clocks read implicitly. Time-relative functions take `now` as an
//! argument so callers (and tests) control it.

mod classifier;
mod engine;
mod types;

pub use classifier::{activity_score, classification_summary, classify};
pub use engine::{rolling_24h_stats, top_by_views, tweet_analytics};
pub use types::{
    ActivityCategory, BucketStat, CategoryStat, CharacterDistribution, ClassificationSummary,
    ClassifyThresholds, HotPost, Rolling24hStats, ScoreWeights, TweetAnalytics, ViewsDistribution,
    WeeklyCount,
};
