use std::time::Duration;

use chrono::{DateTime, Utc};

/// Who besides the owner may use a widget's controls.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum AccessRule {
    #[default]
    OwnerOnly,
    Everyone,
    /// Owner only until this much time has passed, then everyone.
    OpensAfter(Duration),
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Opening {
    Never,
    At(DateTime<Utc>),
}

/// The time-based rule deciding whether a user may press a widget's controls.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PermissionWindow {
    owner_id: u64,
    opening: Opening,
}

impl PermissionWindow {
    pub fn new(owner_id: u64, rule: AccessRule, created_at: DateTime<Utc>) -> Self {
        let opening = match rule {
            AccessRule::OwnerOnly => Opening::Never,
            AccessRule::Everyone => Opening::At(created_at),
            AccessRule::OpensAfter(delay) => match chrono::Duration::from_std(delay) {
                Ok(delay) => created_at
                    .checked_add_signed(delay)
                    .map_or(Opening::Never, Opening::At),
                Err(_) => Opening::Never,
            },
        };

        Self { owner_id, opening }
    }

    pub fn owner_id(&self) -> u64 {
        self.owner_id
    }

    pub fn allowed(&self, user_id: u64, now: DateTime<Utc>) -> bool {
        if user_id == self.owner_id {
            return true;
        }

        match self.opening {
            Opening::Never => false,
            Opening::At(deadline) => now >= deadline,
        }
    }

    /// Time until everyone may interact: `None` if that never happens,
    /// zero once it already has.
    pub fn remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        match self.opening {
            Opening::Never => None,
            Opening::At(deadline) => Some((deadline - now).to_std().unwrap_or(Duration::ZERO)),
        }
    }

    /// What a user who was turned away gets told.
    pub fn denial_notice(&self, now: DateTime<Utc>) -> String {
        match self.remaining(now) {
            None => format!("Only <@{}> can use these buttons.", self.owner_id),
            Some(remaining) => format!(
                "These buttons belong to <@{}> for another {}.",
                self.owner_id,
                format_remaining(remaining)
            ),
        }
    }
}

/// `65s` → `1m 5s`. Rounds up so we never say "0s" while still locked.
pub fn format_remaining(remaining: Duration) -> String {
    let mut secs = remaining.as_secs();
    if remaining.subsec_nanos() > 0 {
        secs += 1;
    }

    let (hours, minutes, seconds) = (secs / 3600, secs % 3600 / 60, secs % 60);

    match (hours, minutes) {
        (0, 0) => format!("{seconds}s"),
        (0, _) => format!("{minutes}m {seconds}s"),
        _ => format!("{hours}h {minutes}m {seconds}s"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const OWNER: u64 = 1;
    const OTHER: u64 = 2;

    fn created() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_owner_is_always_allowed() {
        let window = PermissionWindow::new(OWNER, AccessRule::OwnerOnly, created());
        assert!(window.allowed(OWNER, created()));
        assert!(!window.allowed(OTHER, created() + chrono::Duration::days(365)));
        assert_eq!(window.remaining(created()), None);
    }

    #[test]
    fn test_everyone_opens_immediately() {
        let window = PermissionWindow::new(OWNER, AccessRule::Everyone, created());
        assert!(window.allowed(OTHER, created()));
        assert_eq!(window.remaining(created()), Some(Duration::ZERO));
    }

    #[test]
    fn test_window_boundary_is_inclusive() {
        let window = PermissionWindow::new(
            OWNER,
            AccessRule::OpensAfter(Duration::from_secs(30)),
            created(),
        );
        let deadline = created() + chrono::Duration::seconds(30);

        assert!(!window.allowed(OTHER, deadline - chrono::Duration::milliseconds(1)));
        assert!(window.allowed(OTHER, deadline));
        assert!(window.allowed(OTHER, deadline + chrono::Duration::milliseconds(1)));
    }

    #[test]
    fn test_denial_notice_mentions_time_left() {
        let window = PermissionWindow::new(
            OWNER,
            AccessRule::OpensAfter(Duration::from_secs(90)),
            created(),
        );
        let notice = window.denial_notice(created() + chrono::Duration::seconds(25));
        assert_eq!(notice, "These buttons belong to <@1> for another 1m 5s.");

        let owner_only = PermissionWindow::new(OWNER, AccessRule::OwnerOnly, created());
        assert_eq!(
            owner_only.denial_notice(created()),
            "Only <@1> can use these buttons."
        );
    }

    #[test]
    fn test_format_remaining() {
        assert_eq!(format_remaining(Duration::from_millis(1)), "1s");
        assert_eq!(format_remaining(Duration::from_secs(59)), "59s");
        assert_eq!(format_remaining(Duration::from_secs(60)), "1m 0s");
        assert_eq!(format_remaining(Duration::from_secs(3725)), "1h 2m 5s");
    }
}
