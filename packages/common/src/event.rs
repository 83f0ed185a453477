use serde::{Deserialize, Serialize};

use crate::lifecycle::HackathonStatus;

/// In-process notification that a hackathon's lifecycle state was mutated.
///
/// Published on the server's broadcast bus after the mutating transaction
/// commits; consumed by the dashboard refresh listener. Not persisted and
/// not visible outside the process.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LifecycleEvent {
    /// An admin approved or rejected a hackathon, or an organizer submitted
    /// one for review.
    StatusChanged {
        hackathon_id: i32,
        from: HackathonStatus,
        to: HackathonStatus,
    },
    /// Final results were computed and made visible.
    ResultsPublished { hackathon_id: i32 },
}

impl LifecycleEvent {
    /// The hackathon this event concerns.
    pub fn hackathon_id(&self) -> i32 {
        match self {
            Self::StatusChanged { hackathon_id, .. } => *hackathon_id,
            Self::ResultsPublished { hackathon_id } => *hackathon_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hackathon_id_accessor() {
        let e = LifecycleEvent::StatusChanged {
            hackathon_id: 7,
            from: HackathonStatus::PendingApproval,
            to: HackathonStatus::Published,
        };
        assert_eq!(e.hackathon_id(), 7);
        assert_eq!(
            LifecycleEvent::ResultsPublished { hackathon_id: 3 }.hackathon_id(),
            3
        );
    }

    #[test]
    fn test_serde_tagged_shape() {
        let e = LifecycleEvent::ResultsPublished { hackathon_id: 1 };
        let v = serde_json::to_value(&e).unwrap();
        assert_eq!(v["kind"], "results_published");
        let back: LifecycleEvent = serde_json::from_value(v).unwrap();
        assert_eq!(back, e);
    }
}
