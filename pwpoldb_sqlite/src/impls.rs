use pwpolcore::platform::{
    ConnectorOption,
    PlatformConnector,
    PlatformUrl,
    PolicyPlatform,
};
use sqlx::{
    migrate::MigrateDatabase,
    Sqlite,
    SqlitePool,
};
use std::sync::Arc;

use crate::SqliteBackend;

impl PlatformUrl for SqliteBackend {
    fn url(&self) -> &str {
        self.url.as_ref()
    }
}

impl SqliteBackend {
    pub async fn connect(opts: ConnectorOption) -> Result<SqliteBackend, sqlx::Error> {
        if opts.auto_create_db && !Sqlite::database_exists(&opts.url).await.unwrap_or(false) {
            log::warn!("sqlite database {} does not exist; creating...", &opts.url);
            Sqlite::create_database(&opts.url).await?
        }

        let pool = SqlitePool::connect(&opts.url).await?;
        Ok(SqliteBackend {
            pool: Arc::new(pool),
            url: opts.url,
        })
    }

    pub async fn migrate_policy(self) -> Result<Self, sqlx::Error> {
        sqlx::migrate!("migrations/policy").run(&*self.pool).await?;
        Ok(self)
    }
}

impl PlatformConnector for SqliteBackend {
    async fn policy(
        opts: ConnectorOption,
    ) -> Result<impl PolicyPlatform + 'static, Box<dyn std::error::Error + Send + Sync + 'static>> {
        let backend = SqliteBackend::connect(opts).await
            .map_err(Box::new)?
            .migrate_policy()
            .await
            .map_err(Box::new)?;
        Ok(backend)
    }
}

mod setting;
mod user;

mod default_impl {
    use pwpolcore::platform::DefaultPolicyPlatform;
    use crate::SqliteBackend;

    impl DefaultPolicyPlatform for SqliteBackend {}
}
