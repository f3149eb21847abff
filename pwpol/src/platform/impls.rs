use pwpolcore::{
    platform::PolicyPlatform,
    policy::{
        ALLOWED_MAX_AGE_DAYS,
        MAX_DUE_SOON_DAYS,
        NoticeAudience,
        PolicySettings,
        UserPasswordStatus,
        traits::SettingsBackend as _,
    },
    tracking::{
        CaptureCache,
        DEFAULT_CAPTURE_TTL,
    },
    user::traits::{
        UserBackend as _,
        UserMetaBackend as _,
    },
};
use std::sync::Arc;

use crate::{
    error::{
        Error,
        PolicyError,
    },
    user::User,
};

use super::*;

const SETTING_MAX_AGE_DAYS: &str = "pwpol_max_age_days";
const SETTING_DUE_SOON_DAYS: &str = "pwpol_due_soon_days";
const SETTING_DUE_SOON_MESSAGE: &str = "pwpol_due_soon_message";
const SETTING_OVERDUE_MESSAGE: &str = "pwpol_overdue_message";
const SETTING_NOTICE_AUDIENCE: &str = "pwpol_notice_audience";
const SETTING_POLICY_ENABLED_AT: &str = "pwpol_policy_enabled_at";

const META_LAST_PASSWORD_CHANGE: &str = "pwpol_last_password_change";

const DEFAULT_DUE_SOON_DAYS: i64 = 7;

// Lenient integer coercion for loosely typed sync payload fields;
// anything unusable counts as zero.
fn coerce_days(value: &serde_json::Value) -> i64 {
    match value {
        serde_json::Value::Number(n) => n.as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        serde_json::Value::String(s) => s.trim().parse::<i64>().unwrap_or(0),
        _ => 0,
    }
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn policy_platform(mut self, val: impl PolicyPlatform + 'static) -> Self {
        self.policy_platform = Some(Box::new(val));
        self
    }

    pub fn boxed_policy_platform(mut self, val: Box<dyn PolicyPlatform>) -> Self {
        self.policy_platform = Some(val);
        self
    }

    pub fn capture_ttl(mut self, val: i64) -> Self {
        self.capture_ttl = Some(val);
        self
    }

    pub fn ts_source(mut self, val: impl Fn() -> i64 + Send + Sync + 'static) -> Self {
        self.ts_source = Some(Box::new(val));
        self
    }

    pub fn build(self) -> Platform {
        Platform(Arc::new(PlatformInner {
            policy_platform: self.policy_platform
                .expect("missing required argument policy_platform"),
            captures: CaptureCache::new(
                self.capture_ttl.unwrap_or(DEFAULT_CAPTURE_TTL)
            ),
            ts_source: self.ts_source,
        }))
    }
}

impl Platform {
    pub(crate) fn now(&self) -> i64 {
        self.0.ts_source
            .as_ref()
            .map(|f| f())
            .unwrap_or_else(|| chrono::Utc::now().timestamp())
    }
}

// Settings access.

impl Platform {
    async fn setting(&self, name: &str) -> Result<Option<String>, Error> {
        Ok(self.0.policy_platform.get_setting(name).await?)
    }

    async fn setting_or(&self, name: &str, default: &str) -> Result<String, Error> {
        Ok(self.setting(name).await?
            .unwrap_or_else(|| default.to_string()))
    }

    async fn setting_i64(&self, name: &str, default: i64) -> Result<i64, Error> {
        Ok(self.setting(name).await?
            .and_then(|s| s.parse::<i64>().ok())
            .unwrap_or(default))
    }

    async fn set_setting(&self, name: &str, value: &str) -> Result<(), Error> {
        Ok(self.0.policy_platform.set_setting(name, value).await?)
    }

    /// The enrollment timestamp; a stored zero counts as unset.
    pub async fn policy_enabled_at(&self) -> Result<Option<i64>, Error> {
        Ok(self.setting(SETTING_POLICY_ENABLED_AT).await?
            .and_then(|s| s.parse::<i64>().ok())
            .filter(|ts| *ts != 0))
    }
}

// Policy management.

impl Platform {
    /// Write the default for each policy setting that has never been
    /// stored, leaving stored values alone.
    pub async fn init_defaults(&self) -> Result<(), Error> {
        let defaults = PolicySettings::default();
        for (name, value) in [
            (SETTING_MAX_AGE_DAYS, defaults.max_age_days.to_string()),
            (SETTING_DUE_SOON_DAYS, defaults.due_soon_days.to_string()),
            (SETTING_DUE_SOON_MESSAGE, defaults.due_soon_message),
            (SETTING_OVERDUE_MESSAGE, defaults.overdue_message),
            (SETTING_NOTICE_AUDIENCE, defaults.notice_audience.to_string()),
        ] {
            if self.setting(name).await?.is_none() {
                self.set_setting(name, &value).await?;
            }
        }
        Ok(())
    }

    pub async fn get_policy_settings(&self) -> Result<PolicySettings, Error> {
        Ok(PolicySettings {
            max_age_days: self.setting_i64(SETTING_MAX_AGE_DAYS, 0).await?,
            due_soon_days: self.setting_i64(
                SETTING_DUE_SOON_DAYS,
                DEFAULT_DUE_SOON_DAYS,
            ).await?,
            due_soon_message: self.setting_or(SETTING_DUE_SOON_MESSAGE, "").await?,
            overdue_message: self.setting_or(SETTING_OVERDUE_MESSAGE, "").await?,
            notice_audience: self.setting(SETTING_NOTICE_AUDIENCE).await?
                .map(|s| s.parse::<NoticeAudience>().unwrap_or_default())
                .unwrap_or_default(),
        })
    }

    pub async fn get_policy(&self) -> Result<PolicyOutcome, Error> {
        Ok(PolicyOutcome {
            settings: self.get_policy_settings().await?,
            policy_enabled_at: self.policy_enabled_at().await?,
        })
    }

    /// The enrollment invariant shared by both update paths: the first
    /// transition of the policy window from disabled to enabled stamps
    /// the enrollment timestamp, exactly once.  Returns the enrollment
    /// timestamp in effect after the transition.
    async fn mark_policy_enabled(
        &self,
        new_max_age_days: i64,
    ) -> Result<Option<i64>, Error> {
        let current_max_age = self.setting_i64(SETTING_MAX_AGE_DAYS, 0).await?;
        let current = self.policy_enabled_at().await?;
        if current_max_age == 0 && new_max_age_days > 0 && current.is_none() {
            let now = self.now();
            self.set_setting(SETTING_POLICY_ENABLED_AT, &now.to_string()).await?;
            return Ok(Some(now));
        }
        Ok(current)
    }

    /// Validate and persist a full set of policy settings.  Validation
    /// failures abort before anything is written; an unrecognized
    /// audience never fails and falls back to the default.
    pub async fn apply_policy(
        &self,
        update: PolicyUpdate,
    ) -> Result<PolicyOutcome, Error> {
        if !ALLOWED_MAX_AGE_DAYS.contains(&update.max_age_days) {
            return Err(PolicyError::InvalidMaxAge(update.max_age_days))?;
        }
        if update.due_soon_days < 0 || update.due_soon_days > MAX_DUE_SOON_DAYS {
            return Err(PolicyError::InvalidDueSoon(update.due_soon_days))?;
        }

        let policy_enabled_at = self.mark_policy_enabled(update.max_age_days).await?;
        let settings: PolicySettings = update.into();

        self.set_setting(
            SETTING_MAX_AGE_DAYS,
            &settings.max_age_days.to_string(),
        ).await?;
        self.set_setting(
            SETTING_DUE_SOON_DAYS,
            &settings.due_soon_days.to_string(),
        ).await?;
        self.set_setting(SETTING_DUE_SOON_MESSAGE, &settings.due_soon_message).await?;
        self.set_setting(SETTING_OVERDUE_MESSAGE, &settings.overdue_message).await?;
        self.set_setting(
            SETTING_NOTICE_AUDIENCE,
            &settings.notice_audience.to_string(),
        ).await?;

        Ok(PolicyOutcome {
            settings,
            policy_enabled_at,
        })
    }

    /// Best-effort bulk update from a loosely typed payload, e.g. one
    /// received during a site sync.  A payload that is not an object is
    /// ignored; recognized fields are written only when they differ from
    /// the stored values.  The payload does not carry `due_soon_days`.
    pub async fn sync_policy(
        &self,
        payload: &serde_json::Value,
    ) -> Result<(), Error> {
        let Some(settings) = payload.as_object() else {
            log::debug!("ignoring policy sync payload that is not an object");
            return Ok(());
        };

        let max_age_days = settings.get("max_age_days")
            .map(coerce_days)
            .unwrap_or(0);
        let due_soon_message = settings.get("due_soon_message")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("");
        let overdue_message = settings.get("overdue_message")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("");
        let notice_audience = settings.get("notice_audience")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("")
            .parse::<NoticeAudience>()
            .unwrap_or_default();

        let current_max_age = self.setting_i64(SETTING_MAX_AGE_DAYS, 0).await?;
        if current_max_age != max_age_days {
            self.mark_policy_enabled(max_age_days).await?;
            self.set_setting(
                SETTING_MAX_AGE_DAYS,
                &max_age_days.to_string(),
            ).await?;
        }

        if self.setting_or(SETTING_DUE_SOON_MESSAGE, "").await? != due_soon_message {
            self.set_setting(SETTING_DUE_SOON_MESSAGE, due_soon_message).await?;
        }
        if self.setting_or(SETTING_OVERDUE_MESSAGE, "").await? != overdue_message {
            self.set_setting(SETTING_OVERDUE_MESSAGE, overdue_message).await?;
        }

        let audience = notice_audience.to_string();
        let current_audience = self.setting_or(
            SETTING_NOTICE_AUDIENCE,
            &NoticeAudience::default().to_string(),
        ).await?;
        if current_audience != audience {
            self.set_setting(SETTING_NOTICE_AUDIENCE, &audience).await?;
        }

        Ok(())
    }
}

// Status evaluation.

impl Platform {
    pub async fn get_user_status(
        &self,
        user_id: i64,
    ) -> Result<UserPasswordStatus, Error> {
        let settings = self.get_policy_settings().await?;
        let policy_enabled_at = self.policy_enabled_at().await?;
        let last_change = self.last_password_change(user_id).await?;
        Ok(settings.evaluate(policy_enabled_at, last_change, self.now()))
    }

    pub async fn should_notify(&self, user_id: i64) -> Result<bool, Error> {
        Ok(self.get_user_status(user_id).await?.status.notifiable())
    }

    /// The user's recorded change timestamp; a stored zero counts as no
    /// record at all.
    pub async fn last_password_change(
        &self,
        user_id: i64,
    ) -> Result<Option<i64>, Error> {
        Ok(self.0.policy_platform
            .get_user_meta(user_id, META_LAST_PASSWORD_CHANGE).await?
            .and_then(|s| s.parse::<i64>().ok())
            .filter(|ts| *ts != 0))
    }
}

// Change tracking.
//
// Three entry points converge on one writer; the host wires these to its
// own profile update and password reset flows.

impl Platform {
    /// Capture event: fired before a profile update persists, when the
    /// request carries a password field.  Stores the current hash so the
    /// post-update event can tell a real change from a no-op save.
    pub async fn on_password_field_submitted(
        &self,
        user_id: i64,
        incoming: &str,
    ) -> Result<(), Error> {
        if incoming.is_empty() {
            return Ok(());
        }
        if self.0.policy_platform.get_user_by_id(user_id).await?.is_none() {
            return Ok(());
        }
        if let Some(old_hash) = self.0.policy_platform
            .get_user_password(user_id).await?
        {
            self.0.captures.insert(user_id, old_hash, self.now());
        }
        Ok(())
    }

    /// Post-update event: compare the captured hash (or, failing that,
    /// the caller's own pre-update snapshot) against the stored hash and
    /// record the change timestamp when they differ.  An update that
    /// left no comparable before-state is recorded unconditionally.
    pub async fn on_update_completed(
        &self,
        user_id: i64,
        old_password_hash: Option<&str>,
    ) -> Result<(), Error> {
        if self.0.policy_platform.get_user_by_id(user_id).await?.is_none() {
            log::debug!("update completed for missing user {user_id}; nothing to record");
            return Ok(());
        }
        let Some(current_hash) = self.0.policy_platform
            .get_user_password(user_id).await?
        else {
            log::debug!("no stored password hash for user {user_id}; nothing to compare");
            return Ok(());
        };

        let now = self.now();
        match self.0.captures.take(user_id, now) {
            Some(captured) => if captured != current_hash {
                self.record_password_change(user_id, now).await?;
            },
            None => match old_password_hash {
                Some(old) if old == current_hash => (),
                _ => self.record_password_change(user_id, now).await?,
            },
        }
        Ok(())
    }

    /// Reset-completion event: completion of a reset flow is itself
    /// proof of a change, so no hash comparison happens here.
    pub async fn on_reset_completed(&self, user_id: i64) -> Result<(), Error> {
        if self.0.policy_platform.get_user_by_id(user_id).await?.is_none() {
            log::debug!("ignoring password reset completion for unknown user {user_id}");
            return Ok(());
        }
        self.record_password_change(user_id, self.now()).await
    }

    async fn record_password_change(
        &self,
        user_id: i64,
        now: i64,
    ) -> Result<(), Error> {
        Ok(self.0.policy_platform.set_user_meta(
            user_id,
            META_LAST_PASSWORD_CHANGE,
            &now.to_string(),
        ).await?)
    }
}

// User management.

impl Platform {
    pub async fn create_user(&self, name: &str) -> Result<User, Error> {
        let id = self.0.policy_platform.add_user(name).await?;
        Ok(self.get_user(id).await?
            .expect("the user should have been created"))
    }

    pub async fn get_user(&self, id: i64) -> Result<Option<User>, Error> {
        let user = self.0.policy_platform.get_user_by_id(id).await?
            .map(|user| User::new(self.clone(), user));
        Ok(user)
    }

    /// Persist a password hash on behalf of the host's update flow; the
    /// hash is opaque here.
    pub async fn store_user_password(
        &self,
        user_id: i64,
        password: &str,
    ) -> Result<(), Error> {
        self.0.policy_platform.store_user_password(user_id, password).await?;
        Ok(())
    }

    /// The user's currently stored hash, for hosts that need to take
    /// their own pre-update snapshot.
    pub async fn get_user_password(
        &self,
        user_id: i64,
    ) -> Result<Option<String>, Error> {
        Ok(self.0.policy_platform.get_user_password(user_id).await?)
    }
}
