use pwpolcore::{
    policy::UserPasswordStatus,
    user,
};

use crate::{
    Platform,
    error::Error,
    notice::notice_message,
};
use super::User;

impl User {
    pub(crate) fn new(
        platform: Platform,
        user: user::User,
    ) -> Self {
        Self {
            platform,
            user,
        }
    }

    pub fn id(&self) -> i64 {
        self.user.id
    }

    pub fn name(&self) -> &str {
        self.user.name.as_ref()
    }

    pub fn created_ts(&self) -> i64 {
        self.user.created_ts
    }

    pub async fn password_status(&self) -> Result<UserPasswordStatus, Error> {
        self.platform.get_user_status(self.user.id).await
    }

    /// The notice text that applies to this user right now, if any.
    pub async fn notice(&self) -> Result<Option<String>, Error> {
        let status = self.password_status().await?;
        let settings = self.platform.get_policy_settings().await?;
        Ok(notice_message(&status, &settings))
    }
}

impl From<User> for user::User {
    fn from(user: User) -> Self {
        user.user
    }
}

impl From<&User> for user::User {
    fn from(user: &User) -> Self {
        user.user.clone()
    }
}
