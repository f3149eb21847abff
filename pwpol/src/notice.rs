use pwpolcore::policy::{
    AgeStatus,
    PolicySettings,
    UserPasswordStatus,
};

pub const DEFAULT_DUE_SOON_MESSAGE: &str =
    "Your password is due to be changed soon. Please update it as soon as \
    possible. This helps keep your account secure.";

pub const DEFAULT_OVERDUE_MESSAGE: &str =
    "Your password change is overdue. Please update your password now. This \
    is required by your site's password policy.";

/// The message that should accompany a due or overdue status: the
/// configured text when one is set, the built-in default otherwise.
/// Rendering and audience routing belong to the caller.
pub fn notice_message(
    status: &UserPasswordStatus,
    settings: &PolicySettings,
) -> Option<String> {
    match status.status {
        AgeStatus::Due => Some(
            pick(&settings.due_soon_message, DEFAULT_DUE_SOON_MESSAGE)
        ),
        AgeStatus::Overdue => Some(
            pick(&settings.overdue_message, DEFAULT_OVERDUE_MESSAGE)
        ),
        _ => None,
    }
}

fn pick(custom: &str, default: &str) -> String {
    if custom.is_empty() {
        default.to_string()
    } else {
        custom.to_string()
    }
}

#[cfg(test)]
mod tests {
    use pwpolcore::policy::DAY_IN_SECONDS;
    use super::*;

    const NOW: i64 = 1_700_000_000;

    fn status_at(days_since_change: i64, settings: &PolicySettings) -> UserPasswordStatus {
        settings.evaluate(
            None,
            Some(NOW - days_since_change * DAY_IN_SECONDS),
            NOW,
        )
    }

    #[test]
    fn nothing_when_ok_or_disabled() {
        let settings = PolicySettings {
            max_age_days: 90,
            .. Default::default()
        };
        assert_eq!(notice_message(&status_at(10, &settings), &settings), None);

        let disabled = PolicySettings::default();
        assert_eq!(notice_message(&status_at(500, &disabled), &disabled), None);
    }

    #[test]
    fn default_texts() {
        let settings = PolicySettings {
            max_age_days: 90,
            .. Default::default()
        };
        assert_eq!(
            notice_message(&status_at(85, &settings), &settings).as_deref(),
            Some(DEFAULT_DUE_SOON_MESSAGE),
        );
        assert_eq!(
            notice_message(&status_at(95, &settings), &settings).as_deref(),
            Some(DEFAULT_OVERDUE_MESSAGE),
        );
    }

    #[test]
    fn custom_texts_win() {
        let settings = PolicySettings {
            max_age_days: 90,
            due_soon_message: "rotate soon".to_string(),
            overdue_message: "rotate now".to_string(),
            .. Default::default()
        };
        assert_eq!(
            notice_message(&status_at(85, &settings), &settings).as_deref(),
            Some("rotate soon"),
        );
        assert_eq!(
            notice_message(&status_at(95, &settings), &settings).as_deref(),
            Some("rotate now"),
        );
    }
}
