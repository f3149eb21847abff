use std::collections::HashMap;
use parking_lot::Mutex;
use super::{
    CaptureCache,
    DEFAULT_CAPTURE_TTL,
    PendingCapture,
};

impl PendingCapture {
    fn live_at(&self, ttl: i64, now: i64) -> bool {
        now < self.captured_ts + ttl
    }
}

impl Default for CaptureCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPTURE_TTL)
    }
}

impl CaptureCache {
    pub fn new(ttl: i64) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> i64 {
        self.ttl
    }

    /// Store the pre-update hash for a user, replacing any capture
    /// already pending for that user.  Abandoned captures are swept out
    /// here rather than by a background task.
    pub fn insert(&self, user_id: i64, old_hash: impl Into<String>, now: i64) {
        let mut entries = self.entries.lock();
        entries.retain(|_, capture| capture.live_at(self.ttl, now));
        entries.insert(user_id, PendingCapture {
            old_hash: old_hash.into(),
            captured_ts: now,
        });
    }

    /// Remove and return the pending capture for a user; an expired
    /// capture is dropped and reported as absent.
    pub fn take(&self, user_id: i64, now: i64) -> Option<String> {
        let capture = self.entries.lock().remove(&user_id)?;
        capture
            .live_at(self.ttl, now)
            .then_some(capture.old_hash)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_removes() {
        let cache = CaptureCache::default();
        cache.insert(1, "$P$old", 1000);
        assert_eq!(cache.take(1, 1001), Some("$P$old".to_string()));
        assert_eq!(cache.take(1, 1001), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn expiry_checked_on_read() {
        let cache = CaptureCache::default();
        cache.insert(1, "$P$old", 1000);
        assert_eq!(cache.take(1, 1000 + DEFAULT_CAPTURE_TTL), None);
        // the expired entry is gone, not merely hidden
        assert!(cache.is_empty());
    }

    #[test]
    fn last_boundary_second_still_live() {
        let cache = CaptureCache::new(60);
        cache.insert(1, "$P$old", 1000);
        assert_eq!(cache.take(1, 1059), Some("$P$old".to_string()));
    }

    #[test]
    fn concurrent_updates_overwrite() {
        // the documented race: a second capture for the same user
        // replaces the first before its comparison ran
        let cache = CaptureCache::default();
        cache.insert(1, "$P$first", 1000);
        cache.insert(1, "$P$second", 1001);
        assert_eq!(cache.take(1, 1002), Some("$P$second".to_string()));
        assert_eq!(cache.take(1, 1002), None);
    }

    #[test]
    fn users_do_not_collide() {
        let cache = CaptureCache::default();
        cache.insert(1, "$P$one", 1000);
        cache.insert(2, "$P$two", 1000);
        assert_eq!(cache.take(2, 1001), Some("$P$two".to_string()));
        assert_eq!(cache.take(1, 1001), Some("$P$one".to_string()));
    }

    #[test]
    fn abandoned_captures_swept_on_insert() {
        let cache = CaptureCache::new(60);
        cache.insert(1, "$P$stale", 1000);
        cache.insert(2, "$P$fresh", 2000);
        let entries = cache.entries.lock();
        assert_eq!(entries.len(), 1);
        assert!(entries.contains_key(&2));
    }
}
