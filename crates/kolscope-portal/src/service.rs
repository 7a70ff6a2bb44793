//! Cache-first orchestration of the follower and tweet pipelines.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use kolscope_analytics::{
    classification_summary, rolling_24h_stats, top_by_views, tweet_analytics, ClassifyThresholds,
    ScoreWeights,
};
use kolscope_cache::{KvBackend, MemoryBackend, SnapshotCache};
use kolscope_collector::{ApiClient, CollectLimits};
use kolscope_core::{AppConfig, Subject};

use crate::error::PortalError;
use crate::snapshot::{AnalyticsSnapshot, FollowerAnalytics, FollowerSnapshot, TweetSnapshot};

const FOLLOWER_NAMESPACE: &str = "kol_data_";
const TWEET_NAMESPACE: &str = "tweet_data_";

/// Lifecycle of one subject's data, as seen by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectStatus {
    Idle,
    CheckingCache,
    Collecting,
    Aggregating,
    Ready,
    Unavailable,
}

/// Read-side result of [`PortalService::snapshot`].
#[derive(Debug, Clone)]
pub enum SnapshotView {
    Ready(Box<AnalyticsSnapshot>),
    Pending,
    Unavailable,
}

type ProgressFn = dyn Fn(&str, u32, usize) + Send + Sync;

/// Orchestrates collection, analysis and caching per subject.
///
/// Collection failures are soft: the subject flips to `Unavailable` while any
/// previously cached snapshot stays readable. Concurrent refreshes of the
/// same subject are last-writer-wins.
pub struct PortalService {
    config: AppConfig,
    backend: Arc<dyn KvBackend>,
    follower_cache: SnapshotCache<FollowerSnapshot>,
    tweet_cache: SnapshotCache<TweetSnapshot>,
    weights: ScoreWeights,
    thresholds: ClassifyThresholds,
    statuses: Mutex<HashMap<String, SubjectStatus>>,
    progress: Option<Box<ProgressFn>>,
}

fn ttl_from_secs(secs: i64) -> Duration {
    Duration::from_secs(u64::try_from(secs.max(0)).unwrap_or(0))
}

impl PortalService {
    #[must_use]
    pub fn new(config: AppConfig) -> Self {
        Self::with_backend(config, Arc::new(MemoryBackend::new()))
    }

    #[must_use]
    pub fn with_backend(config: AppConfig, backend: Arc<dyn KvBackend>) -> Self {
        let follower_cache = SnapshotCache::new(
            FOLLOWER_NAMESPACE,
            ttl_from_secs(config.follower_cache_ttl_secs),
        );
        let tweet_cache =
            SnapshotCache::new(TWEET_NAMESPACE, ttl_from_secs(config.tweet_cache_ttl_secs));
        Self {
            config,
            backend,
            follower_cache,
            tweet_cache,
            weights: ScoreWeights::default(),
            thresholds: ClassifyThresholds::default(),
            statuses: Mutex::new(HashMap::new()),
            progress: None,
        }
    }

    #[must_use]
    pub fn with_scoring(mut self, weights: ScoreWeights, thresholds: ClassifyThresholds) -> Self {
        self.weights = weights;
        self.thresholds = thresholds;
        self
    }

    /// Registers a callback invoked as `(subject_id, page, unique_items)`
    /// after every collected page.
    #[must_use]
    pub fn on_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str, u32, usize) + Send + Sync + 'static,
    {
        self.progress = Some(Box::new(callback));
        self
    }

    #[must_use]
    pub fn status(&self, subject_id: &str) -> SubjectStatus {
        self.lock_statuses()
            .get(subject_id)
            .copied()
            .unwrap_or(SubjectStatus::Idle)
    }

    /// Assembles the current snapshot from cache.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::Cache`] when the backend itself fails; absent
    /// or expired data is `Pending`/`Unavailable`, not an error.
    pub fn snapshot(&self, subject_id: &str) -> Result<SnapshotView, PortalError> {
        self.snapshot_at(subject_id, Utc::now())
    }

    /// [`Self::snapshot`] with an explicit clock, for deterministic reads.
    ///
    /// # Errors
    ///
    /// Same as [`Self::snapshot`].
    pub fn snapshot_at(
        &self,
        subject_id: &str,
        now: DateTime<Utc>,
    ) -> Result<SnapshotView, PortalError> {
        let backend = self.backend.as_ref();
        let follower = self
            .follower_cache
            .get_at(backend, subject_id, now)?
            .filter(|cached| cached.payload.is_complete());
        let tweets = self.tweet_cache.get_at(backend, subject_id, now)?;

        let (Some(follower), Some(tweets)) = (follower, tweets) else {
            return Ok(match self.status(subject_id) {
                SubjectStatus::Unavailable => SnapshotView::Unavailable,
                _ => SnapshotView::Pending,
            });
        };
        let Some(follower_analytics) = follower.payload.analytics else {
            return Ok(SnapshotView::Pending);
        };

        // Time-relative stats come from the raw posts, never from the cache.
        let rolling_24h = rolling_24h_stats(&tweets.payload.raw_posts, now);
        Ok(SnapshotView::Ready(Box::new(AnalyticsSnapshot {
            subject_id: subject_id.to_owned(),
            captured_at: follower.cached_at.min(tweets.cached_at),
            profile_summary: follower.payload.profile_summary,
            follower_analytics,
            tweet_analytics: tweets.payload.analytics,
            hot_posts: tweets.payload.hot_posts,
            rolling_24h,
        })))
    }

    /// Collects, analyzes and caches whatever this subject is missing.
    ///
    /// `force` drops both cache entries first, so even fresh data is
    /// recollected. Without it, resources still live in cache are reused and
    /// only the missing ones hit the network.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::Cache`] on backend failure. Collection and
    /// upstream failures never error; they resolve to
    /// [`SubjectStatus::Unavailable`].
    pub async fn refresh(
        &self,
        subject: &Subject,
        force: bool,
    ) -> Result<SubjectStatus, PortalError> {
        let now = Utc::now();
        let backend = self.backend.as_ref();
        self.set_status(&subject.id, SubjectStatus::CheckingCache);

        if force {
            self.follower_cache.invalidate(backend, &subject.id)?;
            self.tweet_cache.invalidate(backend, &subject.id)?;
        }

        let have_followers = self
            .follower_cache
            .get_at(backend, &subject.id, now)?
            .is_some_and(|cached| cached.payload.is_complete());
        let have_tweets = self.tweet_cache.get_at(backend, &subject.id, now)?.is_some();
        if have_followers && have_tweets {
            debug!(subject = %subject.id, "serving from cache, nothing to collect");
            self.set_status(&subject.id, SubjectStatus::Ready);
            return Ok(SubjectStatus::Ready);
        }

        let client = match ApiClient::from_config(&self.config) {
            Ok(client) => client,
            Err(error) => {
                warn!(subject = %subject.id, %error, "collection unavailable");
                self.set_status(&subject.id, SubjectStatus::Unavailable);
                return Ok(SubjectStatus::Unavailable);
            }
        };
        self.set_status(&subject.id, SubjectStatus::Collecting);

        let follower_task = self.collect_follower_side(&client, subject, have_followers);
        let tweet_task = self.collect_tweet_side(&client, subject, have_tweets);
        let (follower_run, tweet_run) = tokio::join!(follower_task, tweet_task);

        self.set_status(&subject.id, SubjectStatus::Aggregating);

        if let Some(fresh) = follower_run {
            self.follower_cache.merge_put_at(
                backend,
                &subject.id,
                fresh,
                now,
                FollowerSnapshot::merged,
            )?;
        }
        if let Some(snapshot) = tweet_run {
            self.tweet_cache
                .put_at(backend, &subject.id, &snapshot, now)?;
        }

        let complete = self
            .follower_cache
            .get_at(backend, &subject.id, now)?
            .is_some_and(|cached| cached.payload.is_complete())
            && self.tweet_cache.get_at(backend, &subject.id, now)?.is_some();
        let status = if complete {
            SubjectStatus::Ready
        } else {
            SubjectStatus::Unavailable
        };
        self.set_status(&subject.id, status);
        Ok(status)
    }

    /// Runs the follower pipeline; `None` means nothing usable came back and
    /// the cache must be left alone.
    async fn collect_follower_side(
        &self,
        client: &ApiClient,
        subject: &Subject,
        have_followers: bool,
    ) -> Option<FollowerSnapshot> {
        if have_followers {
            return None;
        }

        let profile_summary = match client.user_profile(&subject.handle).await {
            Ok(profile) => Some(profile),
            Err(error) => {
                warn!(subject = %subject.id, %error, "profile lookup failed");
                None
            }
        };

        let limits = CollectLimits {
            max_pages: self.config.followers_max_pages,
            max_items: self.config.followers_max_items,
            inter_request_delay: Duration::from_millis(self.config.inter_request_delay_ms),
            max_consecutive_empty_pages: self.config.max_consecutive_empty_pages,
        };
        let analytics = match client
            .collect_followers(&subject.id, &limits, |page, items| {
                self.report_progress(&subject.id, page, items);
            })
            .await
        {
            Ok(collection) if !collection.items.is_empty() => {
                info!(
                    subject = %subject.id,
                    followers = collection.items.len(),
                    pages = collection.pages_fetched,
                    stop = ?collection.stop_reason,
                    "follower collection complete"
                );
                let mut top = collection.items.clone();
                top.sort_by(|a, b| b.follower_count.cmp(&a.follower_count));
                top.truncate(self.config.top_follower_count);
                Some(FollowerAnalytics {
                    enhanced_verified_count: collection
                        .items
                        .iter()
                        .filter(|f| f.is_enhanced_verified)
                        .count(),
                    classification: classification_summary(
                        &collection.items,
                        Utc::now(),
                        &self.weights,
                        &self.thresholds,
                    ),
                    top_followers: top,
                })
            }
            Ok(collection) => {
                warn!(
                    subject = %subject.id,
                    pages = collection.pages_fetched,
                    stop = ?collection.stop_reason,
                    "follower collection produced no items"
                );
                None
            }
            Err(error) => {
                warn!(subject = %subject.id, %error, "follower collection failed");
                None
            }
        };

        if profile_summary.is_none() && analytics.is_none() {
            return None;
        }
        Some(FollowerSnapshot {
            profile_summary,
            analytics,
        })
    }

    /// Runs the tweet pipeline; `None` leaves any prior cache entry in place.
    async fn collect_tweet_side(
        &self,
        client: &ApiClient,
        subject: &Subject,
        have_tweets: bool,
    ) -> Option<TweetSnapshot> {
        if have_tweets {
            return None;
        }

        let limits = CollectLimits {
            max_pages: self.config.tweets_max_pages,
            max_items: self.config.tweets_max_items,
            inter_request_delay: Duration::from_millis(self.config.inter_request_delay_ms),
            max_consecutive_empty_pages: self.config.max_consecutive_empty_pages,
        };
        match client
            .collect_tweets(&subject.id, &limits, |page, items| {
                self.report_progress(&subject.id, page, items);
            })
            .await
        {
            Ok(collection) if !collection.items.is_empty() => {
                info!(
                    subject = %subject.id,
                    posts = collection.items.len(),
                    pages = collection.pages_fetched,
                    stop = ?collection.stop_reason,
                    "tweet collection complete"
                );
                let analytics = tweet_analytics(&collection.items);
                let hot_posts = top_by_views(
                    &collection.items,
                    self.config.hot_post_count,
                    &subject.handle,
                );
                Some(TweetSnapshot {
                    raw_posts: collection.items,
                    analytics,
                    hot_posts,
                })
            }
            Ok(collection) => {
                warn!(
                    subject = %subject.id,
                    pages = collection.pages_fetched,
                    stop = ?collection.stop_reason,
                    "tweet collection produced no items"
                );
                None
            }
            Err(error) => {
                warn!(subject = %subject.id, %error, "tweet collection failed");
                None
            }
        }
    }

    fn report_progress(&self, subject_id: &str, page: u32, items: usize) {
        debug!(subject = subject_id, page, items, "collection progress");
        if let Some(callback) = &self.progress {
            callback(subject_id, page, items);
        }
    }

    fn set_status(&self, subject_id: &str, status: SubjectStatus) {
        self.lock_statuses().insert(subject_id.to_owned(), status);
    }

    fn lock_statuses(&self) -> std::sync::MutexGuard<'_, HashMap<String, SubjectStatus>> {
        // A poisoned status map only loses display state; recover and go on.
        self.statuses
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
