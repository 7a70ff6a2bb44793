//! Heuristic activity/authenticity classifier for follower profiles.
//!
//! Best-effort by design: the score combines profile completeness, content
//! output, engagement, and account age into a rough activity signal. False
//! positives and negatives are expected and acceptable.

use chrono::{DateTime, Utc};

use kolscope_core::FollowerProfile;

use crate::types::{
    ActivityCategory, CategoryStat, ClassificationSummary, ClassifyThresholds, ScoreWeights,
};

const POSTS_HIGH_MIN: u64 = 1_000;
const POSTS_MID_MIN: u64 = 100;
const POSTS_LOW_MIN: u64 = 10;
const MEDIA_MIN: u64 = 10;
const LIKES_HIGH_MIN: u64 = 500;
const LIKES_MID_MIN: u64 = 50;
const FOLLOWER_RATIO_MIN: f64 = 0.8;
const NEW_ACCOUNT_DAYS: i64 = 30;
const AGED_ACCOUNT_DAYS: i64 = 365;

/// Computes the 0-capped activity score for one follower.
///
/// Additive over identity credibility, content output, engagement, the
/// follower/following ratio, and account age relative to `now`. Unknown
/// account age contributes nothing.
#[must_use]
pub fn activity_score(profile: &FollowerProfile, now: DateTime<Utc>, weights: &ScoreWeights) -> u32 {
    let mut score: i64 = 0;

    // Identity credibility
    if profile.is_enhanced_verified {
        score += weights.enhanced_verified;
    }
    if !profile.uses_default_avatar {
        score += weights.custom_avatar;
    }
    if profile.banner_url.is_some() {
        score += weights.banner_set;
    }

    // Content output
    if profile.post_count > POSTS_HIGH_MIN {
        score += weights.posts_high;
    } else if profile.post_count > POSTS_MID_MIN {
        score += weights.posts_mid;
    } else if profile.post_count > POSTS_LOW_MIN {
        score += weights.posts_low;
    }
    if profile.media_count > MEDIA_MIN {
        score += weights.media_output;
    }

    // Engagement and influence
    if profile.like_count > LIKES_HIGH_MIN {
        score += weights.likes_high;
    } else if profile.like_count > LIKES_MID_MIN {
        score += weights.likes_mid;
    }
    if profile.has_pinned_post {
        score += weights.pinned_post;
    }

    // Account quality ratio
    #[allow(clippy::cast_precision_loss)]
    let ratio = profile.follower_count as f64 / profile.following_count.max(1) as f64;
    if ratio > FOLLOWER_RATIO_MIN {
        score += weights.follower_ratio;
    }

    // Account age adjustment; unknown age is left alone.
    if let Some(created_at) = profile.account_created_at {
        let age_days = now.signed_duration_since(created_at).num_days();
        if age_days < NEW_ACCOUNT_DAYS {
            score -= weights.new_account_penalty;
        } else if age_days > AGED_ACCOUNT_DAYS {
            score += weights.aged_account_bonus;
        }
    }

    u32::try_from(score.max(0)).unwrap_or(0)
}

/// Maps a score to its activity category.
#[must_use]
pub fn classify(score: u32, thresholds: &ClassifyThresholds) -> ActivityCategory {
    if score >= thresholds.highly_active {
        ActivityCategory::HighlyActive
    } else if score >= thresholds.active {
        ActivityCategory::Active
    } else if score >= thresholds.low_activity {
        ActivityCategory::LowActivity
    } else {
        ActivityCategory::SuspectedBot
    }
}

/// Scores and classifies a whole follower population.
///
/// The health score is the share of meaningfully active followers
/// (`HighlyActive` + `Active`) as a rounded percentage; 0 for an empty set.
#[must_use]
pub fn classification_summary(
    profiles: &[FollowerProfile],
    now: DateTime<Utc>,
    weights: &ScoreWeights,
    thresholds: &ClassifyThresholds,
) -> ClassificationSummary {
    let total = profiles.len();
    if total == 0 {
        return ClassificationSummary::default();
    }

    let mut counts = [0usize; 4];
    for profile in profiles {
        let category = classify(activity_score(profile, now, weights), thresholds);
        let slot = match category {
            ActivityCategory::HighlyActive => 0,
            ActivityCategory::Active => 1,
            ActivityCategory::LowActivity => 2,
            ActivityCategory::SuspectedBot => 3,
        };
        counts[slot] += 1;
    }

    #[allow(clippy::cast_precision_loss)]
    let percent_of = |count: usize| (count as f64 / total as f64) * 100.0;
    let stat = |count: usize| CategoryStat {
        count,
        percent: percent_of(count),
    };

    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    let health_score = (percent_of(counts[0] + counts[1])).round() as u32;

    ClassificationSummary {
        highly_active: stat(counts[0]),
        active: stat(counts[1]),
        low_activity: stat(counts[2]),
        suspected_bot: stat(counts[3]),
        health_score,
        total_analyzed: total,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn follower() -> FollowerProfile {
        FollowerProfile {
            handle: "user".to_owned(),
            display_name: "User".to_owned(),
            follower_count: 0,
            following_count: 100,
            post_count: 0,
            like_count: 0,
            media_count: 0,
            account_created_at: None,
            has_pinned_post: false,
            is_enhanced_verified: false,
            is_legacy_verified: false,
            uses_default_avatar: true,
            banner_url: None,
            bio: String::new(),
            avatar_url: String::new(),
        }
    }

    fn score(profile: &FollowerProfile) -> u32 {
        activity_score(profile, Utc::now(), &ScoreWeights::default())
    }

    #[test]
    fn empty_profile_scores_zero() {
        assert_eq!(score(&follower()), 0);
    }

    #[test]
    fn strong_profile_classifies_highly_active() {
        let mut f = follower();
        f.is_enhanced_verified = true;
        f.uses_default_avatar = false;
        f.banner_url = Some("https://img.test/banner".to_owned());
        f.post_count = 2_000;
        f.media_count = 20;
        f.like_count = 600;
        f.has_pinned_post = true;
        f.follower_count = 100;
        f.following_count = 100;
        f.account_created_at = Some(Utc::now() - Duration::days(400));

        let s = score(&f);
        assert!(s >= 80, "expected score >= 80, got {s}");
        assert_eq!(
            classify(s, &ClassifyThresholds::default()),
            ActivityCategory::HighlyActive
        );
    }

    #[test]
    fn young_accounts_are_penalized() {
        let mut aged = follower();
        aged.post_count = 500;
        aged.like_count = 100;
        let mut young = aged.clone();
        aged.account_created_at = Some(Utc::now() - Duration::days(400));
        young.account_created_at = Some(Utc::now() - Duration::days(5));
        assert!(score(&young) < score(&aged));
    }

    #[test]
    fn score_never_goes_negative() {
        let mut f = follower();
        f.account_created_at = Some(Utc::now() - Duration::days(1));
        assert_eq!(score(&f), 0);
    }

    #[test]
    fn score_is_monotonic_in_post_count() {
        let mut prev = 0;
        for posts in [0, 11, 101, 1_001, 50_000] {
            let mut f = follower();
            f.post_count = posts;
            let s = score(&f);
            assert!(s >= prev, "score decreased at post_count={posts}");
            prev = s;
        }
    }

    #[test]
    fn score_is_monotonic_in_like_count() {
        let mut prev = 0;
        for likes in [0, 51, 501, 10_000] {
            let mut f = follower();
            f.like_count = likes;
            let s = score(&f);
            assert!(s >= prev, "score decreased at like_count={likes}");
            prev = s;
        }
    }

    #[test]
    fn score_is_monotonic_in_media_count() {
        let mut prev = 0;
        for media in [0, 11, 100] {
            let mut f = follower();
            f.media_count = media;
            let s = score(&f);
            assert!(s >= prev, "score decreased at media_count={media}");
            prev = s;
        }
    }

    #[test]
    fn score_is_monotonic_in_follower_ratio() {
        let mut prev = 0;
        for followers in [0, 50, 81, 500] {
            let mut f = follower();
            f.follower_count = followers;
            f.following_count = 100;
            let s = score(&f);
            assert!(s >= prev, "score decreased at follower_count={followers}");
            prev = s;
        }
    }

    #[test]
    fn ratio_guards_against_zero_following() {
        let mut f = follower();
        f.follower_count = 10;
        f.following_count = 0;
        // 10 / max(0, 1) = 10.0 > 0.8; must not divide by zero.
        assert_eq!(score(&f), ScoreWeights::default().follower_ratio as u32);
    }

    #[test]
    fn classify_thresholds_are_inclusive() {
        let t = ClassifyThresholds::default();
        assert_eq!(classify(80, &t), ActivityCategory::HighlyActive);
        assert_eq!(classify(79, &t), ActivityCategory::Active);
        assert_eq!(classify(45, &t), ActivityCategory::Active);
        assert_eq!(classify(44, &t), ActivityCategory::LowActivity);
        assert_eq!(classify(20, &t), ActivityCategory::LowActivity);
        assert_eq!(classify(19, &t), ActivityCategory::SuspectedBot);
    }

    #[test]
    fn empty_population_has_zero_health_score() {
        let summary = classification_summary(
            &[],
            Utc::now(),
            &ScoreWeights::default(),
            &ClassifyThresholds::default(),
        );
        assert_eq!(summary.health_score, 0);
        assert_eq!(summary.total_analyzed, 0);
    }

    #[test]
    fn health_score_is_share_of_active_followers() {
        let mut strong = follower();
        strong.is_enhanced_verified = true;
        strong.uses_default_avatar = false;
        strong.post_count = 2_000;
        strong.media_count = 20;
        strong.like_count = 600;
        strong.has_pinned_post = true;

        let bots = vec![follower(); 3];
        let mut population = vec![strong];
        population.extend(bots);

        let summary = classification_summary(
            &population,
            Utc::now(),
            &ScoreWeights::default(),
            &ClassifyThresholds::default(),
        );
        assert_eq!(summary.total_analyzed, 4);
        assert_eq!(summary.health_score, 25);
        assert_eq!(summary.suspected_bot.count, 3);
        let percent_sum = summary.highly_active.percent
            + summary.active.percent
            + summary.low_activity.percent
            + summary.suspected_bot.percent;
        assert!((percent_sum - 100.0).abs() < 0.1);
    }
}
