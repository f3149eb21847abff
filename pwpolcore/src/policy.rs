use serde::{Deserialize, Serialize};

/// Number of seconds in a day; all policy windows are expressed in days.
pub const DAY_IN_SECONDS: i64 = 86400;

/// The only accepted values for the policy window; 0 disables the policy.
pub const ALLOWED_MAX_AGE_DAYS: [i64; 7] = [0, 30, 60, 90, 120, 180, 360];

/// Upper bound for the due-soon window, in days.
pub const MAX_DUE_SOON_DAYS: i64 = 30;

#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize, Serialize)]
pub enum NoticeAudience {
    #[default]
    #[serde(rename = "edit_posts")]
    EditorsOnly,
    #[serde(rename = "all_users")]
    AllUsers,
}

#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AgeStatus {
    #[default]
    Disabled,
    Ok,
    Due,
    Overdue,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct PolicySettings {
    pub max_age_days: i64,
    pub due_soon_days: i64,
    pub due_soon_message: String,
    pub overdue_message: String,
    pub notice_audience: NoticeAudience,
}

/// Full evaluator output for a single user at a single point in time.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct UserPasswordStatus {
    pub status: AgeStatus,
    pub last_change: Option<i64>,
    pub basis_time: Option<i64>,
    pub due_time: Option<i64>,
    pub has_recorded_change: bool,
    pub policy_enabled_at: Option<i64>,
}

mod impls;
pub mod traits;
