use async_trait::async_trait;
use pwpolcore::{
    error::BackendError,
    policy::traits::SettingsBackend,
};
use sqlx::Row;

use crate::SqliteBackend;

async fn get_setting_sqlite(
    backend: &SqliteBackend,
    name: &str,
) -> Result<Option<String>, BackendError> {
    let result = sqlx::query(
        r#"
SELECT
    value
FROM
    setting
WHERE
    name = ?1
        "#,
    )
    .bind(name)
    .map(|row: sqlx::sqlite::SqliteRow| row.get("value"))
    .fetch_optional(&*backend.pool)
    .await?;
    Ok(result)
}

async fn set_setting_sqlite(
    backend: &SqliteBackend,
    name: &str,
    value: &str,
) -> Result<(), BackendError> {
    sqlx::query(
        r#"
INSERT INTO setting (
    name,
    value
)
VALUES ( ?1, ?2 )
ON CONFLICT ( name ) DO UPDATE SET
    value = excluded.value
        "#,
    )
    .bind(name)
    .bind(value)
    .execute(&*backend.pool)
    .await?;
    Ok(())
}

#[async_trait]
impl SettingsBackend for SqliteBackend {
    async fn get_setting(
        &self,
        name: &str,
    ) -> Result<Option<String>, BackendError> {
        get_setting_sqlite(
            self,
            name,
        ).await
    }

    async fn set_setting(
        &self,
        name: &str,
        value: &str,
    ) -> Result<(), BackendError> {
        set_setting_sqlite(
            self,
            name,
            value,
        ).await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use pwpolcore::{
        platform::PlatformConnector as _,
        policy::traits::SettingsBackend,
    };
    use crate::SqliteBackend;

    #[async_std::test]
    async fn test_basic() -> anyhow::Result<()> {
        let backend = SqliteBackend::policy("sqlite::memory:".into())
            .await
            .map_err(anyhow::Error::from_boxed)?;

        assert_eq!(backend.get_setting("pwpol_max_age_days").await?, None);

        backend.set_setting("pwpol_max_age_days", "90").await?;
        assert_eq!(
            backend.get_setting("pwpol_max_age_days").await?,
            Some("90".to_string()),
        );

        // last write wins per key
        backend.set_setting("pwpol_max_age_days", "0").await?;
        assert_eq!(
            backend.get_setting("pwpol_max_age_days").await?,
            Some("0".to_string()),
        );

        backend.set_setting("pwpol_due_soon_message", "").await?;
        assert_eq!(
            backend.get_setting("pwpol_due_soon_message").await?,
            Some("".to_string()),
        );

        Ok(())
    }
}
