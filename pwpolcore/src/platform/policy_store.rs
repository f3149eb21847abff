use async_trait::async_trait;
use crate::{
    platform::PlatformUrl,
    policy::traits::SettingsBackend,
    user::traits::{
        UserBackend,
        UserMetaBackend,
    },
};

/// PolicyPlatform - Password Age Policy Platform
///
/// This platform is used to persist password policy settings and the
/// per-user password change records the policy is evaluated against.
///
/// This trait is applicable to everything that correctly implements the
/// relevant backends that compose this trait.
#[async_trait]
pub trait PolicyPlatform: SettingsBackend
    + UserBackend
    + UserMetaBackend

    + PlatformUrl

    + Send
    + Sync
{
    fn as_dyn(&self) -> &dyn PolicyPlatform;
}

pub trait DefaultPolicyPlatform: PolicyPlatform {}

impl<P: SettingsBackend
    + UserBackend
    + UserMetaBackend

    + PlatformUrl

    + DefaultPolicyPlatform

    + Send
    + Sync
> PolicyPlatform for P {
    fn as_dyn(&self) -> &(dyn PolicyPlatform) {
        self
    }
}
