//! Change and incident records that justify a grant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::ChangeRef;

/// Lifecycle state of a change or incident in the tracking system.
///
/// Ticketing systems disagree on vocabulary, so several common spellings are
/// accepted. Anything unrecognized becomes [`ChangeStatus::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeStatus {
    #[serde(alias = "new", alias = "scheduled", alias = "approved")]
    Open,
    #[serde(alias = "implement", alias = "in-progress", alias = "ongoing")]
    InProgress,
    #[serde(alias = "done", alias = "completed", alias = "mitigated")]
    Resolved,
    Closed,
    #[serde(alias = "canceled", alias = "withdrawn")]
    Cancelled,
    #[serde(alias = "declined")]
    Rejected,
    #[serde(other)]
    Unknown,
}

impl ChangeStatus {
    /// Returns true when the change no longer justifies elevated access.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Resolved | Self::Closed | Self::Cancelled | Self::Rejected
        )
    }
}

impl std::fmt::Display for ChangeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
            Self::Closed => "closed",
            Self::Cancelled => "cancelled",
            Self::Rejected => "rejected",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Snapshot of a change record, fetched once per pass and discarded after
/// the revocation decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub change_ref: ChangeRef,
    pub status: ChangeStatus,
    /// When the change reached a terminal state, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
    /// Hard end of the access window, independent of status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl ChangeRecord {
    pub fn new(change_ref: impl Into<ChangeRef>, status: ChangeStatus) -> Self {
        Self {
            change_ref: change_ref.into(),
            status,
            closed_at: None,
            expires_at: None,
        }
    }

    #[must_use]
    pub fn closed_at(mut self, at: DateTime<Utc>) -> Self {
        self.closed_at = Some(at);
        self
    }

    #[must_use]
    pub fn expires_at(mut self, at: DateTime<Utc>) -> Self {
        self.expires_at = Some(at);
        self
    }
}
