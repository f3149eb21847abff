use async_trait::async_trait;
use crate::error::BackendError;

/// Generic name/value settings storage.
///
/// Absent keys are `None`; the defaults that apply to each policy key are
/// the caller's concern.
#[async_trait]
pub trait SettingsBackend {
    async fn get_setting(
        &self,
        name: &str,
    ) -> Result<Option<String>, BackendError>;
    async fn set_setting(
        &self,
        name: &str,
        value: &str,
    ) -> Result<(), BackendError>;
}
