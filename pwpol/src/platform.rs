use pwpolcore::{
    platform::PolicyPlatform,
    policy::{
        NoticeAudience,
        PolicySettings,
    },
    tracking::CaptureCache,
};
use std::sync::Arc;

#[derive(Default)]
pub struct Builder {
    // platform
    policy_platform: Option<Box<dyn PolicyPlatform>>,
    // overrides the capture TTL for pre-update password hashes
    capture_ttl: Option<i64>,
    ts_source: Option<Box<dyn Fn() -> i64 + Send + Sync + 'static>>,
}

pub(crate) struct PlatformInner {
    policy_platform: Box<dyn PolicyPlatform>,
    captures: CaptureCache,
    ts_source: Option<Box<dyn Fn() -> i64 + Send + Sync + 'static>>,
}

#[derive(Clone)]
pub struct Platform(Arc<PlatformInner>);

/// Incoming arguments for the direct policy update path; the audience is
/// carried as the raw incoming string because unrecognized values coerce
/// to the default rather than fail.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PolicyUpdate {
    pub max_age_days: i64,
    pub due_soon_days: i64,
    pub due_soon_message: String,
    pub overdue_message: String,
    pub notice_audience: String,
}

/// The effective settings after an update or read, along with the
/// enrollment timestamp they are anchored on.
#[derive(Clone, Debug, PartialEq)]
pub struct PolicyOutcome {
    pub settings: PolicySettings,
    pub policy_enabled_at: Option<i64>,
}

impl From<PolicyUpdate> for PolicySettings {
    fn from(update: PolicyUpdate) -> Self {
        Self {
            max_age_days: update.max_age_days,
            due_soon_days: update.due_soon_days,
            due_soon_message: update.due_soon_message,
            overdue_message: update.overdue_message,
            notice_audience: update.notice_audience
                .parse::<NoticeAudience>()
                .unwrap_or_default(),
        }
    }
}

mod impls;
