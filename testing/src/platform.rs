use pwpol::{
    Platform,
    platform::Builder,
};
use pwpoldb_sqlite::SqliteBackend;
use std::sync::{
    Arc,
    atomic::{
        AtomicI64,
        Ordering,
    },
};

/// A shared, advanceable clock for wiring into a platform's `ts_source`.
#[derive(Clone)]
pub struct TestClock(Arc<AtomicI64>);

impl Default for TestClock {
    fn default() -> Self {
        Self::new(1234567890)
    }
}

impl TestClock {
    pub fn new(ts: i64) -> Self {
        Self(Arc::new(AtomicI64::new(ts)))
    }

    pub fn now(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }

    pub fn set(&self, ts: i64) {
        self.0.store(ts, Ordering::SeqCst);
    }

    pub fn advance(&self, secs: i64) -> i64 {
        self.0.fetch_add(secs, Ordering::SeqCst) + secs
    }

    pub fn source(&self) -> impl Fn() -> i64 + Send + Sync + 'static {
        let clock = self.0.clone();
        move || clock.load(Ordering::SeqCst)
    }
}

pub async fn create_sqlite_backend() -> anyhow::Result<SqliteBackend> {
    Ok(SqliteBackend::connect("sqlite::memory:".into())
        .await?
        .migrate_policy()
        .await?)
}

pub async fn create_sqlite_platform() -> anyhow::Result<Platform> {
    let platform = Builder::new()
        .policy_platform(create_sqlite_backend().await?)
        .build();
    Ok(platform)
}

/// A platform whose clock is fully under the test's control.
pub async fn create_timed_sqlite_platform() -> anyhow::Result<(Platform, TestClock)> {
    let clock = TestClock::default();
    let platform = Builder::new()
        .policy_platform(create_sqlite_backend().await?)
        .ts_source(clock.source())
        .build();
    Ok((platform, clock))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[async_std::test]
    async fn smoke_test_create_platform() -> anyhow::Result<()> {
        create_sqlite_platform().await?;
        let (_, clock) = create_timed_sqlite_platform().await?;
        assert_eq!(clock.now(), 1234567890);
        clock.advance(60);
        assert_eq!(clock.now(), 1234567950);
        Ok(())
    }
}
