use parking_lot::Mutex;
use std::collections::HashMap;

/// How long a pre-update hash capture stays usable, in seconds.
pub const DEFAULT_CAPTURE_TTL: i64 = 60;

/// A password hash captured immediately before a profile update, held
/// only long enough to bridge the capture and post-update events of the
/// same request.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingCapture {
    pub old_hash: String,
    pub captured_ts: i64,
}

/// Ephemeral per-user capture storage with per-entry expiry checked on
/// read.
///
/// Entries are keyed by user id alone, so two concurrent updates for the
/// same user can overwrite each other's capture before the comparison
/// runs; the TTL bounds the window but does not serialize it.
pub struct CaptureCache {
    ttl: i64,
    entries: Mutex<HashMap<i64, PendingCapture>>,
}

mod impls;
