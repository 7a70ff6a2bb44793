//! End-to-end orchestration tests against a wiremock upstream.

use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use kolscope_core::{AppConfig, Subject};
use kolscope_portal::{PortalService, SnapshotView, SubjectStatus};

fn test_config(base_url: &str) -> AppConfig {
    AppConfig {
        api_key: Some("test-key".to_owned()),
        api_base_url: base_url.to_owned(),
        max_retries: 0,
        retry_backoff_base_ms: 0,
        inter_request_delay_ms: 0,
        ..AppConfig::default()
    }
}

fn subject() -> Subject {
    Subject::new("42", "analyst")
}

fn follower_entry(handle: &str, follower_count: u64) -> Value {
    json!({
        "entryId": format!("user-{handle}"),
        "content": {
            "itemContent": {
                "itemType": "TimelineUser",
                "user_results": {
                    "result": {
                        "is_blue_verified": true,
                        "legacy": {
                            "screen_name": handle,
                            "name": handle,
                            "followers_count": follower_count,
                            "friends_count": 100,
                            "statuses_count": 2_000,
                            "favourites_count": 600,
                            "media_count": 20,
                            "created_at": "Wed Dec 19 13:03:09 +0000 2018",
                            "pinned_tweet_ids_str": ["1"],
                            "default_profile_image": false,
                            "description": "",
                            "profile_image_url_https": ""
                        }
                    }
                }
            }
        }
    })
}

fn followers_envelope(handles: &[(&str, u64)]) -> Value {
    let mut entries: Vec<Value> = handles
        .iter()
        .map(|(h, c)| follower_entry(h, *c))
        .collect();
    entries.push(json!({
        "entryId": "cursor-bottom-0",
        "content": { "cursorType": "Bottom", "value": "0" }
    }));
    let inner = json!({
        "data": { "user": { "result": { "timeline": { "timeline": {
            "instructions": [{ "type": "TimelineAddEntries", "entries": entries }]
        }}}}}
    });
    json!({ "data": inner.to_string() })
}

fn tweets_envelope(ids: &[&str]) -> Value {
    let mut entries: Vec<Value> = ids
        .iter()
        .map(|id| {
            json!({
                "entryId": format!("tweet-{id}"),
                "content": {
                    "itemContent": { "tweet_results": { "result": {
                        "rest_id": id,
                        "views": { "count": "1200" },
                        "legacy": {
                            "full_text": format!("post {id}"),
                            "created_at": "Wed Oct 09 14:22:30 +0000 2024",
                            "favorite_count": 3,
                            "retweet_count": 1,
                            "reply_count": 1
                        }
                    }}}
                }
            })
        })
        .collect();
    entries.push(json!({
        "entryId": "cursor-bottom-0",
        "content": { "cursorType": "Bottom", "value": "0" }
    }));
    let inner = json!({
        "data": { "user": { "result": { "timeline_v2": { "timeline": {
            "instructions": [{ "type": "TimelineAddEntries", "entries": entries }]
        }}}}}
    });
    json!({ "data": inner.to_string() })
}

fn profile_envelope(name: &str) -> Value {
    let inner = json!({
        "data": { "user": { "result": { "legacy": {
            "name": name,
            "followers_count": 12_000,
            "description": "on-chain takes",
            "profile_image_url_https": "https://img.test/a.jpg"
        }}}}
    });
    json!({ "data": inner.to_string() })
}

async fn mount_happy_upstream(server: &MockServer, handles: &[(&str, u64)], tweet_ids: &[&str]) {
    Mock::given(method("GET"))
        .and(path("/followersListV2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(followers_envelope(handles)))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/userTweetsV2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(tweets_envelope(tweet_ids)))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/userByScreenNameV2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile_envelope("Analyst")))
        .mount(server)
        .await;
}

fn ready_snapshot(portal: &PortalService, subject_id: &str) -> kolscope_portal::AnalyticsSnapshot {
    match portal.snapshot(subject_id).expect("cache read should succeed") {
        SnapshotView::Ready(snapshot) => *snapshot,
        other => panic!("expected a ready snapshot, got {other:?}"),
    }
}

#[tokio::test]
async fn refresh_collects_both_pipelines_and_serves_a_ready_snapshot() {
    let server = MockServer::start().await;
    mount_happy_upstream(&server, &[("whale", 9_000), ("fren", 50)], &["t1", "t2"]).await;

    let portal = PortalService::new(test_config(&server.uri()));
    let status = portal
        .refresh(&subject(), false)
        .await
        .expect("refresh should not error");
    assert_eq!(status, SubjectStatus::Ready);

    let snapshot = ready_snapshot(&portal, "42");
    assert_eq!(snapshot.subject_id, "42");
    assert_eq!(
        snapshot.profile_summary.map(|p| p.display_name),
        Some("Analyst".to_owned())
    );
    assert_eq!(snapshot.follower_analytics.classification.total_analyzed, 2);
    assert_eq!(snapshot.follower_analytics.enhanced_verified_count, 2);
    // Ranked by follower count.
    assert_eq!(snapshot.follower_analytics.top_followers[0].handle, "whale");
    assert_eq!(snapshot.tweet_analytics.total_count, 2);
    assert_eq!(snapshot.hot_posts[0].url, "https://x.com/analyst/status/t1");
    // All mock posts are old, so the trailing-24h window is empty.
    assert_eq!(snapshot.rolling_24h.total_views, 0);
}

#[tokio::test]
async fn natural_refresh_serves_live_cache_without_touching_the_network() {
    let server = MockServer::start().await;
    mount_happy_upstream(&server, &[("whale", 9_000)], &["t1"]).await;

    let portal = PortalService::new(test_config(&server.uri()));
    portal
        .refresh(&subject(), false)
        .await
        .expect("initial refresh should not error");

    // Upstream dies; the cached snapshot must keep serving.
    server.reset().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let status = portal
        .refresh(&subject(), false)
        .await
        .expect("refresh should not error");
    assert_eq!(status, SubjectStatus::Ready);

    let snapshot = ready_snapshot(&portal, "42");
    assert_eq!(snapshot.follower_analytics.top_followers[0].handle, "whale");
}

#[tokio::test]
async fn forced_refresh_recollects_even_over_a_valid_cache() {
    let server = MockServer::start().await;
    mount_happy_upstream(&server, &[("old_whale", 9_000)], &["t1"]).await;

    let portal = PortalService::new(test_config(&server.uri()));
    portal
        .refresh(&subject(), false)
        .await
        .expect("initial refresh should not error");
    assert_eq!(
        ready_snapshot(&portal, "42").follower_analytics.top_followers[0].handle,
        "old_whale"
    );

    // The upstream now has different data; only a forced refresh sees it.
    server.reset().await;
    mount_happy_upstream(&server, &[("new_whale", 10_000)], &["t2"]).await;

    let status = portal
        .refresh(&subject(), true)
        .await
        .expect("forced refresh should not error");
    assert_eq!(status, SubjectStatus::Ready);

    let snapshot = ready_snapshot(&portal, "42");
    assert_eq!(snapshot.follower_analytics.top_followers[0].handle, "new_whale");
    assert_eq!(snapshot.hot_posts[0].id, "t2");
}

#[tokio::test]
async fn upstream_failure_resolves_to_unavailable_not_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let portal = PortalService::new(test_config(&server.uri()));
    let status = portal
        .refresh(&subject(), false)
        .await
        .expect("refresh must swallow upstream failures");
    assert_eq!(status, SubjectStatus::Unavailable);
    assert!(matches!(
        portal.snapshot("42").expect("cache read should succeed"),
        SnapshotView::Unavailable
    ));
}

#[tokio::test]
async fn progress_callback_reports_subject_pages_and_items() {
    let server = MockServer::start().await;
    mount_happy_upstream(&server, &[("whale", 9_000)], &["t1", "t2"]).await;

    let seen: Arc<Mutex<Vec<(String, u32, usize)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let portal = PortalService::new(test_config(&server.uri())).on_progress(
        move |subject_id, page, items| {
            sink.lock()
                .expect("progress sink lock")
                .push((subject_id.to_owned(), page, items));
        },
    );

    portal
        .refresh(&subject(), false)
        .await
        .expect("refresh should not error");

    let seen = seen.lock().expect("progress sink lock");
    assert!(seen.iter().all(|(id, _, _)| id == "42"));
    // One page per pipeline.
    assert!(seen.contains(&("42".to_owned(), 1, 1)));
    assert!(seen.contains(&("42".to_owned(), 1, 2)));
}
