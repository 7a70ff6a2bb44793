//! Pure aggregation over a collected tweet history.
//!
//! Every function here is total: empty input produces a documented
//! zero-valued result, never an error.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, Utc};

use kolscope_core::Post;

use crate::types::{
    BucketStat, CharacterDistribution, HotPost, Rolling24hStats, TweetAnalytics,
    ViewsDistribution, WeeklyCount,
};

const WEEKLY_SERIES_MAX_WEEKS: usize = 20;
const SUPER_LONG_MIN_CHARS: usize = 2_000;
const LONG_MIN_CHARS: usize = 200;
const MEDIUM_MIN_CHARS: usize = 100;

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Computes the full descriptive statistics for a post list.
#[must_use]
pub fn tweet_analytics(posts: &[Post]) -> TweetAnalytics {
    let total = posts.len();
    if total == 0 {
        return TweetAnalytics::default();
    }

    #[allow(clippy::cast_precision_loss)]
    let total_f = total as f64;
    let percent = |count: usize| {
        #[allow(clippy::cast_precision_loss)]
        round1(count as f64 / total_f * 100.0)
    };
    let bucket = |count: usize| BucketStat {
        count,
        percent: percent(count),
    };

    // Average daily rate over the observed span, never dividing by zero days.
    let min_at = posts.iter().map(|p| p.created_at).min().unwrap_or_default();
    let max_at = posts.iter().map(|p| p.created_at).max().unwrap_or_default();
    #[allow(clippy::cast_precision_loss)]
    let span_days = ((max_at - min_at).num_seconds() as f64 / 86_400.0)
        .ceil()
        .max(1.0);
    #[allow(clippy::cast_precision_loss)]
    let avg_daily_rate = round2(total_f / span_days);

    // Character statistics.
    let total_chars: usize = posts.iter().map(|p| p.character_count).sum();
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    let avg_character_count = (total_chars as f64 / total_f).round() as u64;

    let mut char_counts = [0usize; 4];
    for post in posts {
        let slot = if post.character_count > SUPER_LONG_MIN_CHARS {
            0
        } else if post.character_count >= LONG_MIN_CHARS {
            1
        } else if post.character_count >= MEDIUM_MIN_CHARS {
            2
        } else {
            3
        };
        char_counts[slot] += 1;
    }

    let mut view_counts = [0usize; 5];
    for post in posts {
        let slot = if post.view_count >= 100_000 {
            4
        } else if post.view_count >= 20_000 {
            3
        } else if post.view_count >= 5_000 {
            2
        } else if post.view_count >= 1_000 {
            1
        } else {
            0
        };
        view_counts[slot] += 1;
    }

    let mut hourly_activity = [0u32; 24];
    for post in posts {
        hourly_activity[post.hour_of_day as usize] += 1;
    }

    TweetAnalytics {
        total_count: total,
        avg_daily_rate,
        weekly_series: weekly_series(posts),
        avg_character_count,
        character_distribution: CharacterDistribution {
            super_long: bucket(char_counts[0]),
            long: bucket(char_counts[1]),
            medium: bucket(char_counts[2]),
            short: bucket(char_counts[3]),
        },
        views_distribution: ViewsDistribution {
            under_1k: bucket(view_counts[0]),
            from_1k_to_5k: bucket(view_counts[1]),
            from_5k_to_20k: bucket(view_counts[2]),
            from_20k_to_100k: bucket(view_counts[3]),
            over_100k: bucket(view_counts[4]),
        },
        hourly_activity,
    }
}

/// Sunday-aligned start of the week containing `at`.
fn week_start(at: DateTime<Utc>) -> NaiveDate {
    let date = at.date_naive();
    date - Days::new(u64::from(date.weekday().num_days_from_sunday()))
}

/// Posts per week keyed by week start, most recent 20 weeks ascending.
fn weekly_series(posts: &[Post]) -> Vec<WeeklyCount> {
    let mut weeks: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for post in posts {
        *weeks.entry(week_start(post.created_at)).or_default() += 1;
    }
    let skip = weeks.len().saturating_sub(WEEKLY_SERIES_MAX_WEEKS);
    weeks
        .into_iter()
        .skip(skip)
        .map(|(start, count)| WeeklyCount {
            week: start.format("%m-%d").to_string(),
            count,
        })
        .collect()
}

/// Top `k` posts by view count.
///
/// The sort is stable and descending, so ties keep their original collection
/// order. Each entry carries a permalink constructed from the handle.
#[must_use]
pub fn top_by_views(posts: &[Post], k: usize, handle: &str) -> Vec<HotPost> {
    let mut ranked: Vec<&Post> = posts.iter().collect();
    ranked.sort_by(|a, b| b.view_count.cmp(&a.view_count));
    ranked
        .into_iter()
        .take(k)
        .map(|post| HotPost {
            id: post.id.clone(),
            date: post.created_at.format("%Y/%m/%d").to_string(),
            text: post.text.clone(),
            view_count: post.view_count,
            like_count: post.like_count,
            repost_count: post.repost_count,
            reply_count: post.reply_count,
            url: format!("https://x.com/{handle}/status/{}", post.id),
        })
        .collect()
}

/// Views and engagement over posts published in the trailing 24 hours.
///
/// Time-relative: must be recomputed from the raw post list on every read.
#[must_use]
pub fn rolling_24h_stats(posts: &[Post], now: DateTime<Utc>) -> Rolling24hStats {
    let recent: Vec<&Post> = posts
        .iter()
        .filter(|p| now.signed_duration_since(p.created_at) <= Duration::hours(24))
        .collect();
    if recent.is_empty() {
        return Rolling24hStats::default();
    }

    let total_views = recent.iter().map(|p| p.view_count).sum();
    #[allow(clippy::cast_precision_loss)]
    let avg_engagement_rate =
        recent.iter().map(|p| p.engagement_rate).sum::<f64>() / recent.len() as f64;

    Rolling24hStats {
        total_views,
        avg_engagement_rate,
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn post_at(id: &str, at: DateTime<Utc>, chars: usize, views: u64) -> Post {
        Post::new(id, "x".repeat(chars), at, views, 10, 5, 5)
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn empty_input_yields_zero_analytics() {
        let analytics = tweet_analytics(&[]);
        assert_eq!(analytics.total_count, 0);
        assert_eq!(analytics.avg_daily_rate, 0.0);
        assert!(analytics.weekly_series.is_empty());
        assert_eq!(analytics.hourly_activity, [0; 24]);
        assert_eq!(analytics.character_distribution.short.count, 0);
    }

    #[test]
    fn character_buckets_match_documented_boundaries() {
        let posts = vec![
            post_at("1", at(2024, 10, 1, 0), 50, 0),
            post_at("2", at(2024, 10, 2, 0), 150, 0),
            post_at("3", at(2024, 10, 3, 0), 2_500, 0),
        ];
        let d = tweet_analytics(&posts).character_distribution;
        assert_eq!(d.short.count, 1);
        assert_eq!(d.medium.count, 1);
        assert_eq!(d.super_long.count, 1);
        assert_eq!(d.long.count, 0);
        for stat in [d.short, d.medium, d.super_long] {
            assert!((stat.percent - 33.3).abs() < 0.05, "got {}", stat.percent);
        }
    }

    #[test]
    fn character_bucket_counts_sum_to_total() {
        let posts: Vec<Post> = (0..37)
            .map(|i| post_at(&i.to_string(), at(2024, 10, 1, 0), i * 97, 0))
            .collect();
        let a = tweet_analytics(&posts);
        let d = &a.character_distribution;
        let sum = d.super_long.count + d.long.count + d.medium.count + d.short.count;
        assert_eq!(sum, a.total_count);
        let percent_sum =
            d.super_long.percent + d.long.percent + d.medium.percent + d.short.percent;
        assert!((percent_sum - 100.0).abs() <= 0.2, "got {percent_sum}");
    }

    #[test]
    fn view_bucket_counts_sum_to_total() {
        let views = [0, 999, 1_000, 4_999, 5_000, 19_999, 20_000, 99_999, 100_000, 250_000];
        let posts: Vec<Post> = views
            .iter()
            .enumerate()
            .map(|(i, v)| post_at(&i.to_string(), at(2024, 10, 1, 0), 10, *v))
            .collect();
        let a = tweet_analytics(&posts);
        let d = &a.views_distribution;
        let sum = d.under_1k.count
            + d.from_1k_to_5k.count
            + d.from_5k_to_20k.count
            + d.from_20k_to_100k.count
            + d.over_100k.count;
        assert_eq!(sum, a.total_count);
        assert_eq!(d.under_1k.count, 2);
        assert_eq!(d.from_1k_to_5k.count, 2);
        assert_eq!(d.from_5k_to_20k.count, 2);
        assert_eq!(d.from_20k_to_100k.count, 2);
        assert_eq!(d.over_100k.count, 2);
    }

    #[test]
    fn hourly_activity_has_24_slots_summing_to_total() {
        let posts: Vec<Post> = (0u32..50)
            .map(|i| post_at(&i.to_string(), at(2024, 10, 1, i % 24), 10, 0))
            .collect();
        let a = tweet_analytics(&posts);
        assert_eq!(a.hourly_activity.len(), 24);
        let sum: u32 = a.hourly_activity.iter().sum();
        assert_eq!(sum as usize, a.total_count);
        assert_eq!(a.hourly_activity[0], 3);
    }

    #[test]
    fn avg_daily_rate_spans_the_observed_dates() {
        let posts = vec![
            post_at("1", at(2024, 10, 1, 0), 10, 0),
            post_at("2", at(2024, 10, 5, 0), 10, 0),
            post_at("3", at(2024, 10, 9, 0), 10, 0),
        ];
        // 3 posts over an 8-day span.
        assert!((tweet_analytics(&posts).avg_daily_rate - 0.38).abs() < 1e-9);
    }

    #[test]
    fn single_post_has_daily_rate_of_one() {
        let posts = vec![post_at("1", at(2024, 10, 1, 12), 10, 0)];
        assert!((tweet_analytics(&posts).avg_daily_rate - 1.0).abs() < 1e-9);
    }

    #[test]
    fn week_start_is_sunday_aligned() {
        // 2024-10-09 is a Wednesday; its week starts Sunday 2024-10-06.
        let start = week_start(at(2024, 10, 9, 14));
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 10, 6).unwrap());
        // A Sunday is its own week start.
        let sunday = week_start(at(2024, 10, 6, 0));
        assert_eq!(sunday, NaiveDate::from_ymd_opt(2024, 10, 6).unwrap());
    }

    #[test]
    fn weekly_series_is_ascending_and_capped_at_twenty() {
        let posts: Vec<Post> = (0..30)
            .map(|week| {
                let day = at(2024, 1, 7, 0) + Duration::weeks(week);
                post_at(&week.to_string(), day, 10, 0)
            })
            .collect();
        let series = tweet_analytics(&posts).weekly_series;
        assert_eq!(series.len(), 20);
        // Most recent 20 weeks only: the first 10 weeks are dropped.
        let expected_first = (at(2024, 1, 7, 0) + Duration::weeks(10))
            .format("%m-%d")
            .to_string();
        assert_eq!(series[0].week, expected_first);
        assert!(series.iter().all(|w| w.count == 1));
    }

    #[test]
    fn weekly_series_groups_posts_in_the_same_week() {
        let posts = vec![
            post_at("1", at(2024, 10, 6, 1), 10, 0),  // Sunday
            post_at("2", at(2024, 10, 9, 1), 10, 0),  // Wednesday, same week
            post_at("3", at(2024, 10, 13, 1), 10, 0), // next Sunday
        ];
        let series = tweet_analytics(&posts).weekly_series;
        assert_eq!(
            series,
            vec![
                WeeklyCount {
                    week: "10-06".to_owned(),
                    count: 2
                },
                WeeklyCount {
                    week: "10-13".to_owned(),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn top_by_views_is_stable_on_ties() {
        let posts = vec![
            post_at("a", at(2024, 10, 1, 0), 10, 500),
            post_at("b", at(2024, 10, 2, 0), 10, 900),
            post_at("c", at(2024, 10, 3, 0), 10, 500),
        ];
        let hot = top_by_views(&posts, 3, "analyst");
        let ids: Vec<&str> = hot.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
        assert_eq!(hot[0].url, "https://x.com/analyst/status/b");
        assert_eq!(hot[0].date, "2024/10/02");
    }

    #[test]
    fn top_by_views_truncates_to_k() {
        let posts: Vec<Post> = (0..10)
            .map(|i| post_at(&i.to_string(), at(2024, 10, 1, 0), 10, i))
            .collect();
        assert_eq!(top_by_views(&posts, 3, "h").len(), 3);
    }

    #[test]
    fn rolling_stats_are_zero_for_empty_or_stale_input() {
        let now = at(2024, 10, 10, 0);
        assert_eq!(rolling_24h_stats(&[], now), Rolling24hStats::default());
        let stale = vec![post_at("1", at(2024, 10, 1, 0), 10, 9_000)];
        assert_eq!(rolling_24h_stats(&stale, now), Rolling24hStats::default());
    }

    #[test]
    fn rolling_stats_cover_only_the_trailing_day() {
        let now = at(2024, 10, 10, 12);
        let posts = vec![
            Post::new("old", "x", at(2024, 10, 8, 12), 1_000, 10, 0, 0),
            Post::new("in1", "x", at(2024, 10, 10, 6), 1_000, 100, 0, 0),
            Post::new("in2", "x", at(2024, 10, 9, 13), 3_000, 0, 300, 0),
        ];
        let stats = rolling_24h_stats(&posts, now);
        assert_eq!(stats.total_views, 4_000);
        assert!((stats.avg_engagement_rate - 0.1).abs() < 1e-9);
    }
}
