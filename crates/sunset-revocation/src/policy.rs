//! Revocation eligibility rules.

use chrono::{DateTime, Duration, Utc};
use sunset_core::{ChangeRecord, Grant};

/// Decides whether a grant should be revoked.
///
/// Implementations must be pure: the same grant, record and `as_of` always
/// give the same answer, and no I/O happens here.
pub trait RevocationPolicy: Send + Sync {
    fn should_revoke(&self, grant: &Grant, record: &ChangeRecord, as_of: DateTime<Utc>) -> bool;
}

/// Default policy driven by the change record's status and expiry.
///
/// A grant is revoked when its change reached a terminal status (after an
/// optional grace period), or when the record's `expires_at` has passed.
/// Non-terminal and unrecognized statuses keep access.
#[derive(Debug, Clone, Default)]
pub struct ChangeStatusPolicy {
    closure_grace: Duration,
    max_grant_age: Option<Duration>,
}

impl ChangeStatusPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep access for `grace` after the change closes.
    #[must_use]
    pub fn with_closure_grace(mut self, grace: Duration) -> Self {
        self.closure_grace = grace;
        self
    }

    /// Revoke any grant older than `max_age`, whatever the change says.
    #[must_use]
    pub fn with_max_grant_age(mut self, max_age: Duration) -> Self {
        self.max_grant_age = Some(max_age);
        self
    }
}

impl RevocationPolicy for ChangeStatusPolicy {
    fn should_revoke(&self, grant: &Grant, record: &ChangeRecord, as_of: DateTime<Utc>) -> bool {
        if record.expires_at.is_some_and(|expires_at| expires_at <= as_of) {
            return true;
        }

        if let Some(max_age) = self.max_grant_age {
            if reached(grant.created_at, max_age, as_of) {
                return true;
            }
        }

        if !record.status.is_terminal() {
            return false;
        }

        match record.closed_at {
            Some(closed_at) => reached(closed_at, self.closure_grace, as_of),
            None => true,
        }
    }
}

/// `start + offset <= as_of`. An offset past the end of the calendar is
/// never reached.
fn reached(start: DateTime<Utc>, offset: Duration, as_of: DateTime<Utc>) -> bool {
    start
        .checked_add_signed(offset)
        .is_some_and(|end| end <= as_of)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sunset_core::{ChangeStatus, ProviderTag};

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
    }

    fn grant() -> Grant {
        Grant::new("alice", "g-finance", ProviderTag::ENTRA, "CHG-1")
            .with_created_at(as_of() - Duration::days(2))
    }

    #[test]
    fn test_terminal_statuses_revoke() {
        let policy = ChangeStatusPolicy::new();
        for status in [
            ChangeStatus::Resolved,
            ChangeStatus::Closed,
            ChangeStatus::Cancelled,
            ChangeStatus::Rejected,
        ] {
            let record = ChangeRecord::new("CHG-1", status);
            assert!(policy.should_revoke(&grant(), &record, as_of()), "{status}");
        }
    }

    #[test]
    fn test_active_and_unknown_statuses_keep() {
        let policy = ChangeStatusPolicy::new();
        for status in [
            ChangeStatus::Open,
            ChangeStatus::InProgress,
            ChangeStatus::Unknown,
        ] {
            let record = ChangeRecord::new("CHG-1", status);
            assert!(!policy.should_revoke(&grant(), &record, as_of()), "{status}");
        }
    }

    #[test]
    fn test_expiry_overrides_status() {
        let policy = ChangeStatusPolicy::new();
        let record = ChangeRecord::new("CHG-1", ChangeStatus::InProgress).expires_at(as_of());
        assert!(policy.should_revoke(&grant(), &record, as_of()));

        let record = ChangeRecord::new("CHG-1", ChangeStatus::Unknown)
            .expires_at(as_of() + Duration::seconds(1));
        assert!(!policy.should_revoke(&grant(), &record, as_of()));
    }

    #[test]
    fn test_closure_grace() {
        let policy = ChangeStatusPolicy::new().with_closure_grace(Duration::hours(1));
        let recent = ChangeRecord::new("CHG-1", ChangeStatus::Closed)
            .closed_at(as_of() - Duration::minutes(30));
        let old = ChangeRecord::new("CHG-1", ChangeStatus::Closed)
            .closed_at(as_of() - Duration::hours(1));

        assert!(!policy.should_revoke(&grant(), &recent, as_of()));
        assert!(policy.should_revoke(&grant(), &old, as_of()));
    }

    #[test]
    fn test_max_grant_age() {
        let record = ChangeRecord::new("CHG-1", ChangeStatus::Open);
        assert!(!ChangeStatusPolicy::new().should_revoke(&grant(), &record, as_of()));

        let policy = ChangeStatusPolicy::new().with_max_grant_age(Duration::days(1));
        assert!(policy.should_revoke(&grant(), &record, as_of()));
    }

    #[test]
    fn test_out_of_range_durations_keep_access() {
        let huge = Duration::try_seconds(9_000_000_000_000_000).unwrap();
        let policy = ChangeStatusPolicy::new()
            .with_closure_grace(huge)
            .with_max_grant_age(huge);

        let closed = ChangeRecord::new("CHG-1", ChangeStatus::Closed)
            .closed_at(as_of() - Duration::days(1));
        let open = ChangeRecord::new("CHG-1", ChangeStatus::Open);

        assert!(!policy.should_revoke(&grant(), &closed, as_of()));
        assert!(!policy.should_revoke(&grant(), &open, as_of()));

        // Expiry still applies.
        let expired = open.expires_at(as_of());
        assert!(policy.should_revoke(&grant(), &expired, as_of()));
    }

    #[test]
    fn test_decision_is_deterministic() {
        let policy = ChangeStatusPolicy::new().with_closure_grace(Duration::minutes(5));
        let record = ChangeRecord::new("CHG-1", ChangeStatus::Resolved)
            .closed_at(as_of() - Duration::minutes(10));
        let g = grant();

        let first = policy.should_revoke(&g, &record, as_of());
        for _ in 0..10 {
            assert_eq!(policy.should_revoke(&g, &record, as_of()), first);
        }
    }
}
