use async_trait::async_trait;
use crate::error::BackendError;
use super::User;

#[async_trait]
pub trait UserBackend {
    async fn add_user(
        &self,
        name: &str,
    ) -> Result<i64, BackendError>;
    async fn get_user_by_id(
        &self,
        id: i64,
    ) -> Result<Option<User>, BackendError>;
    /// Store the user's password hash; hashes are opaque to this platform.
    async fn store_user_password(
        &self,
        user_id: i64,
        password: &str,
    ) -> Result<i64, BackendError>;
    /// The most recently stored password hash, if any.
    async fn get_user_password(
        &self,
        user_id: i64,
    ) -> Result<Option<String>, BackendError>;
}

#[async_trait]
pub trait UserMetaBackend {
    async fn get_user_meta(
        &self,
        user_id: i64,
        name: &str,
    ) -> Result<Option<String>, BackendError>;
    async fn set_user_meta(
        &self,
        user_id: i64,
        name: &str,
        value: &str,
    ) -> Result<(), BackendError>;
}
