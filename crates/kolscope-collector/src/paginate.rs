//! Generic cursor-pagination loop with deduplication and stop heuristics.
//!
//! The upstream timelines are cursor-paginated and only loosely reliable:
//! entries repeat across page boundaries, cursors sometimes stop advancing,
//! and individual pages fail. [`collect_pages`] walks a page source to
//! completion or a stopping condition, deduplicating by a caller-supplied
//! identity key, and folds page-level failures into the stop model instead
//! of propagating them.

use std::collections::HashSet;
use std::future::Future;
use std::time::Duration;

use crate::error::CollectorError;

/// One parsed page of a cursor-paginated endpoint.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Cursor for the next page; `None` or a sentinel value ends collection.
    pub next_cursor: Option<String>,
}

/// Limits governing one collection run.
#[derive(Debug, Clone)]
pub struct CollectLimits {
    pub max_pages: u32,
    pub max_items: usize,
    pub inter_request_delay: Duration,
    /// Consecutive pages contributing zero new unique items before giving up.
    pub max_consecutive_empty_pages: u32,
}

/// Why a collection run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The upstream signalled the end: no cursor, an end sentinel, or a
    /// cursor equal to the previous one.
    Exhausted,
    ReachedMaxItems,
    ReachedMaxPages,
    /// Too many consecutive pages yielded nothing new.
    NoProgress,
}

/// The deduplicated, order-preserving result of one collection run.
#[derive(Debug, Clone)]
pub struct Collection<T> {
    pub items: Vec<T>,
    pub stop_reason: StopReason,
    pub pages_fetched: u32,
}

fn is_end_cursor(next: Option<&str>, previous: Option<&str>) -> bool {
    match next {
        None => true,
        Some(c) => c.is_empty() || c == "0" || c == "-1" || Some(c) == previous,
    }
}

/// Walks `fetch_page` to completion or a stopping condition.
///
/// `fetch_page` receives the cursor for the page to fetch (`None` for the
/// first page) and is expected to have already applied per-request retries.
/// A failed page is skipped: it counts toward the page budget and the
/// no-progress streak, but the cursor is not advanced, so a subsequent
/// success resumes where collection left off.
///
/// `on_progress` is invoked after every page attempt with
/// `(page_number, cumulative_unique_items)`.
///
/// Stopping conditions are evaluated in order after each successful page:
/// end cursor, item budget, page budget, no-progress streak.
///
/// # Errors
///
/// Only fatal errors ([`CollectorError::is_fatal`]) abort the run; everything
/// else is logged and folded into the skip/stop model.
pub async fn collect_pages<T, F, Fut, K, P>(
    limits: &CollectLimits,
    mut fetch_page: F,
    mut identity_key: K,
    mut on_progress: P,
) -> Result<Collection<T>, CollectorError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>, CollectorError>>,
    K: FnMut(&T) -> String,
    P: FnMut(u32, usize),
{
    let mut items: Vec<T> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut cursor: Option<String> = None;
    let mut pages: u32 = 0;
    let mut empty_streak: u32 = 0;

    let stop_reason = loop {
        if pages > 0 && !limits.inter_request_delay.is_zero() {
            // Courtesy pause for upstream rate limits; not a correctness
            // mechanism.
            tokio::time::sleep(limits.inter_request_delay).await;
        }
        pages += 1;

        match fetch_page(cursor.clone()).await {
            Ok(page) => {
                let mut new_count = 0usize;
                for item in page.items {
                    if seen.insert(identity_key(&item)) {
                        items.push(item);
                        new_count += 1;
                    }
                }
                if new_count == 0 {
                    empty_streak += 1;
                } else {
                    empty_streak = 0;
                }
                on_progress(pages, items.len());
                tracing::debug!(
                    page = pages,
                    new = new_count,
                    total = items.len(),
                    "collected page"
                );

                if is_end_cursor(page.next_cursor.as_deref(), cursor.as_deref()) {
                    break StopReason::Exhausted;
                }
                if items.len() >= limits.max_items {
                    break StopReason::ReachedMaxItems;
                }
                if pages >= limits.max_pages {
                    break StopReason::ReachedMaxPages;
                }
                if empty_streak >= limits.max_consecutive_empty_pages {
                    break StopReason::NoProgress;
                }
                cursor = page.next_cursor;
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                // Skip the page: advance the failure counter, not the cursor.
                empty_streak += 1;
                on_progress(pages, items.len());
                tracing::warn!(page = pages, error = %e, "skipping failed page");

                if pages >= limits.max_pages {
                    break StopReason::ReachedMaxPages;
                }
                if empty_streak >= limits.max_consecutive_empty_pages {
                    break StopReason::NoProgress;
                }
            }
        }
    };

    tracing::info!(
        pages,
        total = items.len(),
        stop = ?stop_reason,
        "collection finished"
    );
    Ok(Collection {
        items,
        stop_reason,
        pages_fetched: pages,
    })
}
