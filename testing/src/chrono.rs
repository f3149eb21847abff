//! A stand-in for `chrono::Utc` with a process-wide settable timestamp,
//! for backends that stamp rows with the current time.

use std::sync::atomic::{
    AtomicI64,
    Ordering,
};

static TIMESTAMP: AtomicI64 = AtomicI64::new(1234567890);

pub fn set_timestamp(ts: i64) {
    TIMESTAMP.store(ts, Ordering::SeqCst);
}

pub struct Utc;

pub struct Timestamp(i64);

impl Utc {
    pub fn now() -> Timestamp {
        Timestamp(TIMESTAMP.load(Ordering::SeqCst))
    }
}

impl Timestamp {
    pub fn timestamp(&self) -> i64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoke() {
        assert_eq!(Utc::now().timestamp(), 1234567890);
        set_timestamp(1234567899);
        assert_eq!(Utc::now().timestamp(), 1234567899);
        set_timestamp(1234567890);
    }
}
