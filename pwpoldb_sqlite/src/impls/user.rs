use async_trait::async_trait;
use pwpolcore::{
    error::BackendError,
    user::{
        traits::{
            UserBackend,
            UserMetaBackend,
        },
        User,
    },
};
use sqlx::Row;

use crate::{
    SqliteBackend,
    chrono::Utc,
};

async fn add_user_sqlite(
    backend: &SqliteBackend,
    name: &str,
) -> Result<i64, BackendError> {
    let ts = Utc::now().timestamp();
    let id = sqlx::query(
        r#"
INSERT INTO 'user' (
    name,
    created_ts
)
VALUES ( ?1, ?2 )
        "#,
    )
    .bind(name)
    .bind(ts)
    .execute(&*backend.pool)
    .await?
    .last_insert_rowid();
    Ok(id)
}

async fn get_user_by_id_sqlite(
    backend: &SqliteBackend,
    id: i64,
) -> Result<Option<User>, BackendError> {
    let recs = sqlx::query(
        r#"
SELECT
    id,
    name,
    created_ts
FROM
    'user'
WHERE
    id = ?1
        "#,
    )
    .bind(id)
    .map(|row: sqlx::sqlite::SqliteRow| User {
        id: row.get("id"),
        name: row.get("name"),
        created_ts: row.get("created_ts"),
    })
    .fetch_optional(&*backend.pool)
    .await?;
    Ok(recs)
}

async fn store_user_password_sqlite(
    backend: &SqliteBackend,
    user_id: i64,
    password: &str,
) -> Result<i64, BackendError> {
    let ts = Utc::now().timestamp();
    let id = sqlx::query(
        r#"
INSERT INTO user_password (
    user_id,
    password,
    created_ts
)
VALUES ( ?1, ?2, ?3 )
        "#,
    )
    .bind(user_id)
    .bind(password)
    .bind(ts)
    .execute(&*backend.pool)
    .await?
    .last_insert_rowid();
    Ok(id)
}

async fn get_user_password_sqlite(
    backend: &SqliteBackend,
    user_id: i64,
) -> Result<Option<String>, BackendError> {
    let result = sqlx::query(
        r#"
SELECT
    password
FROM
    user_password
WHERE
    user_id = ?1
ORDER BY id DESC
        "#,
    )
    .bind(user_id)
    .map(|row: sqlx::sqlite::SqliteRow| row.get("password"))
    .fetch_optional(&*backend.pool)
    .await?;
    Ok(result)
}

async fn get_user_meta_sqlite(
    backend: &SqliteBackend,
    user_id: i64,
    name: &str,
) -> Result<Option<String>, BackendError> {
    let result = sqlx::query(
        r#"
SELECT
    value
FROM
    user_meta
WHERE
    user_id = ?1 AND
    name = ?2
        "#,
    )
    .bind(user_id)
    .bind(name)
    .map(|row: sqlx::sqlite::SqliteRow| row.get("value"))
    .fetch_optional(&*backend.pool)
    .await?;
    Ok(result)
}

async fn set_user_meta_sqlite(
    backend: &SqliteBackend,
    user_id: i64,
    name: &str,
    value: &str,
) -> Result<(), BackendError> {
    sqlx::query(
        r#"
INSERT INTO user_meta (
    user_id,
    name,
    value
)
VALUES ( ?1, ?2, ?3 )
ON CONFLICT ( user_id, name ) DO UPDATE SET
    value = excluded.value
        "#,
    )
    .bind(user_id)
    .bind(name)
    .bind(value)
    .execute(&*backend.pool)
    .await?;
    Ok(())
}

#[async_trait]
impl UserBackend for SqliteBackend {
    async fn add_user(
        &self,
        name: &str,
    ) -> Result<i64, BackendError> {
        add_user_sqlite(
            self,
            name,
        ).await
    }

    async fn get_user_by_id(
        &self,
        id: i64,
    ) -> Result<Option<User>, BackendError> {
        get_user_by_id_sqlite(
            self,
            id,
        ).await
    }

    async fn store_user_password(
        &self,
        user_id: i64,
        password: &str,
    ) -> Result<i64, BackendError> {
        store_user_password_sqlite(
            self,
            user_id,
            password,
        ).await
    }

    async fn get_user_password(
        &self,
        user_id: i64,
    ) -> Result<Option<String>, BackendError> {
        get_user_password_sqlite(
            self,
            user_id,
        ).await
    }
}

#[async_trait]
impl UserMetaBackend for SqliteBackend {
    async fn get_user_meta(
        &self,
        user_id: i64,
        name: &str,
    ) -> Result<Option<String>, BackendError> {
        get_user_meta_sqlite(
            self,
            user_id,
            name,
        ).await
    }

    async fn set_user_meta(
        &self,
        user_id: i64,
        name: &str,
        value: &str,
    ) -> Result<(), BackendError> {
        set_user_meta_sqlite(
            self,
            user_id,
            name,
            value,
        ).await
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use pwpolcore::{
        platform::PlatformConnector as _,
        user::{
            traits::{
                UserBackend,
                UserMetaBackend,
            },
            User,
        },
    };
    use crate::SqliteBackend;
    use test_pwp::chrono::set_timestamp;

    #[async_std::test]
    async fn test_basic() -> anyhow::Result<()> {
        let backend = SqliteBackend::policy("sqlite::memory:".into())
            .await
            .map_err(anyhow::Error::from_boxed)?;
        let user_id = UserBackend::add_user(&backend, "test_user").await?;
        let user = UserBackend::get_user_by_id(&backend, user_id).await?
            .expect("user is missing?");
        assert_eq!(
            user,
            User {
                id: 1,
                name: "test_user".to_string(),
                created_ts: 1234567890,
            },
        );
        assert!(UserBackend::get_user_by_id(&backend, 42).await?.is_none());

        // only the storage and retrieval of opaque hashes; nothing here
        // inspects or verifies the values
        assert_eq!(UserBackend::get_user_password(&backend, user_id).await?, None);
        set_timestamp(0);
        UserBackend::store_user_password(&backend, user_id, "$P$hash1").await?;
        set_timestamp(1234567899);
        UserBackend::store_user_password(&backend, user_id, "$P$hash2").await?;
        assert_eq!(
            UserBackend::get_user_password(&backend, user_id).await?,
            Some("$P$hash2".to_string()),
        );

        Ok(())
    }

    #[async_std::test]
    async fn test_user_meta() -> anyhow::Result<()> {
        let backend = SqliteBackend::policy("sqlite::memory:".into())
            .await
            .map_err(anyhow::Error::from_boxed)?;
        let user_id = UserBackend::add_user(&backend, "test_user").await?;

        assert_eq!(
            backend.get_user_meta(user_id, "pwpol_last_password_change").await?,
            None,
        );
        backend.set_user_meta(user_id, "pwpol_last_password_change", "1234567890").await?;
        assert_eq!(
            backend.get_user_meta(user_id, "pwpol_last_password_change").await?,
            Some("1234567890".to_string()),
        );

        // upsert per (user, key)
        backend.set_user_meta(user_id, "pwpol_last_password_change", "1234567899").await?;
        assert_eq!(
            backend.get_user_meta(user_id, "pwpol_last_password_change").await?,
            Some("1234567899".to_string()),
        );

        // other users unaffected
        assert_eq!(
            backend.get_user_meta(42, "pwpol_last_password_change").await?,
            None,
        );

        Ok(())
    }
}
