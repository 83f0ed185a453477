#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stored status of a hackathon in the approval workflow.
///
/// The `ongoing` and `completed` statuses visible in API responses are never
/// stored: they are projected from a published hackathon's timeline via
/// [`LifecyclePhase`]. When the `sea-orm` feature is enabled, this enum can be
/// used directly in SeaORM queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "snake_case")]
pub enum HackathonStatus {
    /// Being drafted by its organizer; not visible to anyone else.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "draft"))]
    Draft,
    /// Submitted for review; waiting on an admin decision.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "pending_approval"))]
    PendingApproval,
    /// Approved and visible to participants.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "published"))]
    Published,
    /// Rejected by an admin. Terminal; carries a rejection reason.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "rejected"))]
    Rejected,
}

impl HackathonStatus {
    /// All stored status values.
    pub const ALL: &'static [HackathonStatus] = &[
        Self::Draft,
        Self::PendingApproval,
        Self::Published,
        Self::Rejected,
    ];

    /// Returns the string representation (snake_case, as persisted).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::PendingApproval => "pending_approval",
            Self::Published => "published",
            Self::Rejected => "rejected",
        }
    }

    /// Whether the approval workflow permits a stored transition from `self`
    /// to `to`. Time-driven projections (ongoing/completed) are not stored
    /// transitions and never appear here.
    pub fn can_transition_to(&self, to: HackathonStatus) -> bool {
        matches!(
            (self, to),
            (Self::Draft, Self::PendingApproval)
                | (Self::PendingApproval, Self::Published)
                | (Self::PendingApproval, Self::Rejected)
        )
    }

    /// True once no further stored transition exists.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Published | Self::Rejected)
    }

    /// Status string shown to clients: published hackathons project their
    /// timeline phase as `ongoing`/`completed`.
    pub fn display(&self, phase: LifecyclePhase) -> &'static str {
        match (self, phase) {
            (Self::Published, LifecyclePhase::Ongoing) => "ongoing",
            (Self::Published, LifecyclePhase::Completed) => "completed",
            _ => self.as_str(),
        }
    }
}

impl fmt::Display for HackathonStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing an invalid status string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid status '{invalid}'. Valid values: draft, pending_approval, published, rejected")]
pub struct ParseStatusError {
    invalid: String,
}

impl FromStr for HackathonStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "pending_approval" => Ok(Self::PendingApproval),
            "published" => Ok(Self::Published),
            "rejected" => Ok(Self::Rejected),
            _ => Err(ParseStatusError {
                invalid: s.to_string(),
            }),
        }
    }
}

/// Computed position of a hackathon on its own timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LifecyclePhase {
    /// Registration has not opened yet.
    Upcoming,
    /// Registration window is open; teams can form.
    RegistrationOpen,
    /// Registration has closed; the event has not started.
    RegistrationClosed,
    /// The event is running; projects can be submitted and scored.
    Ongoing,
    /// The event has ended.
    Completed,
}

impl LifecyclePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::RegistrationOpen => "registration_open",
            Self::RegistrationClosed => "registration_closed",
            Self::Ongoing => "ongoing",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The five instants that drive a hackathon's computed phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timeline {
    pub registration_start: DateTime<Utc>,
    pub registration_end: DateTime<Utc>,
    pub hackathon_start: DateTime<Utc>,
    pub hackathon_end: DateTime<Utc>,
    pub results_date: DateTime<Utc>,
}

/// Violation of the timeline ordering invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimelineError {
    #[error("registration_end must be after registration_start")]
    RegistrationWindow,
    #[error("hackathon_start must not be before registration_end")]
    StartBeforeRegistrationCloses,
    #[error("hackathon_end must be after hackathon_start")]
    EventWindow,
    #[error("results_date must not be before hackathon_end")]
    ResultsBeforeEnd,
}

impl Timeline {
    /// Enforce `registration_start < registration_end <= hackathon_start <
    /// hackathon_end <= results_date`.
    pub fn validate(&self) -> Result<(), TimelineError> {
        if self.registration_end <= self.registration_start {
            return Err(TimelineError::RegistrationWindow);
        }
        if self.hackathon_start < self.registration_end {
            return Err(TimelineError::StartBeforeRegistrationCloses);
        }
        if self.hackathon_end <= self.hackathon_start {
            return Err(TimelineError::EventWindow);
        }
        if self.results_date < self.hackathon_end {
            return Err(TimelineError::ResultsBeforeEnd);
        }
        Ok(())
    }

    /// Project the phase at `now`.
    pub fn phase_at(&self, now: DateTime<Utc>) -> LifecyclePhase {
        if now < self.registration_start {
            LifecyclePhase::Upcoming
        } else if now < self.registration_end {
            LifecyclePhase::RegistrationOpen
        } else if now < self.hackathon_start {
            LifecyclePhase::RegistrationClosed
        } else if now < self.hackathon_end {
            LifecyclePhase::Ongoing
        } else {
            LifecyclePhase::Completed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn timeline() -> Timeline {
        Timeline {
            registration_start: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            registration_end: Utc.with_ymd_and_hms(2026, 1, 10, 0, 0, 0).unwrap(),
            hackathon_start: Utc.with_ymd_and_hms(2026, 1, 15, 0, 0, 0).unwrap(),
            hackathon_end: Utc.with_ymd_and_hms(2026, 1, 17, 0, 0, 0).unwrap(),
            results_date: Utc.with_ymd_and_hms(2026, 1, 20, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_valid_transitions() {
        use HackathonStatus::*;
        assert!(Draft.can_transition_to(PendingApproval));
        assert!(PendingApproval.can_transition_to(Published));
        assert!(PendingApproval.can_transition_to(Rejected));
    }

    #[test]
    fn test_invalid_transitions() {
        use HackathonStatus::*;
        assert!(!Draft.can_transition_to(Published));
        assert!(!Draft.can_transition_to(Rejected));
        assert!(!Published.can_transition_to(PendingApproval));
        assert!(!Published.can_transition_to(Rejected));
        assert!(!Rejected.can_transition_to(PendingApproval));
        assert!(!Rejected.can_transition_to(Published));
        for &s in HackathonStatus::ALL {
            assert!(!s.can_transition_to(s), "{s} must not self-transition");
        }
    }

    #[test]
    fn test_terminal_states() {
        assert!(HackathonStatus::Published.is_terminal());
        assert!(HackathonStatus::Rejected.is_terminal());
        assert!(!HackathonStatus::Draft.is_terminal());
        assert!(!HackathonStatus::PendingApproval.is_terminal());
    }

    #[test]
    fn test_serde_roundtrip() {
        for status in HackathonStatus::ALL {
            let json = serde_json::to_string(status).unwrap();
            let parsed: HackathonStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(*status, parsed);
        }
        assert_eq!(
            serde_json::to_string(&HackathonStatus::PendingApproval).unwrap(),
            "\"pending_approval\""
        );
    }

    #[test]
    fn test_from_str() {
        assert_eq!(
            "pending_approval".parse::<HackathonStatus>().unwrap(),
            HackathonStatus::PendingApproval
        );
        assert!("approved".parse::<HackathonStatus>().is_err());
    }

    #[test]
    fn test_phase_boundaries() {
        let t = timeline();
        assert_eq!(
            t.phase_at(t.registration_start - chrono::Duration::seconds(1)),
            LifecyclePhase::Upcoming
        );
        assert_eq!(t.phase_at(t.registration_start), LifecyclePhase::RegistrationOpen);
        assert_eq!(t.phase_at(t.registration_end), LifecyclePhase::RegistrationClosed);
        assert_eq!(t.phase_at(t.hackathon_start), LifecyclePhase::Ongoing);
        assert_eq!(t.phase_at(t.hackathon_end), LifecyclePhase::Completed);
        assert_eq!(
            t.phase_at(t.results_date + chrono::Duration::days(365)),
            LifecyclePhase::Completed
        );
    }

    #[test]
    fn test_display_projection() {
        let s = HackathonStatus::Published;
        assert_eq!(s.display(LifecyclePhase::Upcoming), "published");
        assert_eq!(s.display(LifecyclePhase::RegistrationOpen), "published");
        assert_eq!(s.display(LifecyclePhase::Ongoing), "ongoing");
        assert_eq!(s.display(LifecyclePhase::Completed), "completed");
        // Only published hackathons project their phase.
        assert_eq!(
            HackathonStatus::Draft.display(LifecyclePhase::Ongoing),
            "draft"
        );
        assert_eq!(
            HackathonStatus::Rejected.display(LifecyclePhase::Completed),
            "rejected"
        );
    }

    #[test]
    fn test_timeline_validation() {
        assert!(timeline().validate().is_ok());

        let mut t = timeline();
        t.registration_end = t.registration_start;
        assert_eq!(t.validate(), Err(TimelineError::RegistrationWindow));

        let mut t = timeline();
        t.hackathon_start = t.registration_end - chrono::Duration::hours(1);
        assert_eq!(t.validate(), Err(TimelineError::StartBeforeRegistrationCloses));

        let mut t = timeline();
        t.hackathon_end = t.hackathon_start;
        assert_eq!(t.validate(), Err(TimelineError::EventWindow));

        let mut t = timeline();
        t.results_date = t.hackathon_end - chrono::Duration::hours(1);
        assert_eq!(t.validate(), Err(TimelineError::ResultsBeforeEnd));

        // Registration may close exactly when the event starts.
        let mut t = timeline();
        t.hackathon_start = t.registration_end;
        assert!(t.validate().is_ok());
    }
}
