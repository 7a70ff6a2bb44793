//! Subject-facing orchestration: decides between cache and collection, runs
//! the follower and tweet pipelines concurrently, and exposes a soft-failure
//! status surface so a dashboard never sees a hard error from upstream.

mod error;
mod service;
mod snapshot;

pub use error::PortalError;
pub use service::{PortalService, SnapshotView, SubjectStatus};
pub use snapshot::{AnalyticsSnapshot, FollowerAnalytics, FollowerSnapshot, TweetSnapshot};
