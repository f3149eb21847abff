use std::{
    fmt,
    str::FromStr,
};
use crate::error::ValueError;
use super::{
    AgeStatus,
    DAY_IN_SECONDS,
    NoticeAudience,
    PolicySettings,
    UserPasswordStatus,
};

impl fmt::Display for NoticeAudience {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            NoticeAudience::EditorsOnly => "edit_posts",
            NoticeAudience::AllUsers => "all_users",
        })
    }
}

impl FromStr for NoticeAudience {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "edit_posts" => Ok(NoticeAudience::EditorsOnly),
            "all_users" => Ok(NoticeAudience::AllUsers),
            s => Err(ValueError::Unsupported(s.to_string())),
        }
    }
}

impl fmt::Display for AgeStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            AgeStatus::Disabled => "DISABLED",
            AgeStatus::Ok => "OK",
            AgeStatus::Due => "DUE",
            AgeStatus::Overdue => "OVERDUE",
        })
    }
}

impl FromStr for AgeStatus {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DISABLED" => Ok(AgeStatus::Disabled),
            "OK" => Ok(AgeStatus::Ok),
            "DUE" => Ok(AgeStatus::Due),
            "OVERDUE" => Ok(AgeStatus::Overdue),
            s => Err(ValueError::Unsupported(s.to_string())),
        }
    }
}

impl AgeStatus {
    /// A notice applies only while the password is due or overdue.
    pub fn notifiable(&self) -> bool {
        matches!(self, AgeStatus::Due | AgeStatus::Overdue)
    }
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            max_age_days: 0,
            due_soon_days: 7,
            due_soon_message: String::new(),
            overdue_message: String::new(),
            notice_audience: NoticeAudience::default(),
        }
    }
}

impl PolicySettings {
    /// Classify a user's password age under this policy.
    ///
    /// The basis time is the user's last recorded password change when one
    /// exists, otherwise the policy enrollment timestamp, otherwise `now`.
    /// The last fallback restarts the window on every evaluation and is only
    /// reachable when the policy was enabled without an enrollment timestamp
    /// ever being persisted.
    pub fn evaluate(
        &self,
        policy_enabled_at: Option<i64>,
        last_change: Option<i64>,
        now: i64,
    ) -> UserPasswordStatus {
        if self.max_age_days == 0 {
            return UserPasswordStatus {
                status: AgeStatus::Disabled,
                last_change: None,
                basis_time: None,
                due_time: None,
                has_recorded_change: false,
                policy_enabled_at: None,
            };
        }

        let (basis_time, has_recorded_change) = match (last_change, policy_enabled_at) {
            (Some(ts), _) => (ts, true),
            (None, Some(ts)) => (ts, false),
            (None, None) => {
                log::debug!("no last change or enrollment recorded; aging from now");
                (now, false)
            }
        };

        let due_time = basis_time + self.max_age_days * DAY_IN_SECONDS;
        let due_soon_time = due_time - self.due_soon_days * DAY_IN_SECONDS;

        let status = if now >= due_time {
            AgeStatus::Overdue
        } else if now >= due_soon_time {
            AgeStatus::Due
        } else {
            AgeStatus::Ok
        };

        UserPasswordStatus {
            status,
            last_change,
            basis_time: Some(basis_time),
            due_time: Some(due_time),
            has_recorded_change,
            policy_enabled_at,
        }
    }
}
