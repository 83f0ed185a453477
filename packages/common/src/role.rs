use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of platform roles.
///
/// A user holds exactly one role, resolved once at login and carried in the
/// JWT. Fine-grained capabilities come from the seeded role-permission
/// mappings; this enum exists so code that must dispatch on the role itself
/// does so over a closed variant instead of ad-hoc string matching.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Joins hackathons, forms teams, submits projects.
    Participant,
    /// Scores submitted projects against the judging criteria.
    Judge,
    /// Creates and edits hackathons prior to admin approval.
    Organizer,
    /// Approves/rejects pending hackathons, publishes results, views the
    /// aggregate dashboard.
    Admin,
}

impl Role {
    /// All roles, in ascending order of privilege.
    pub const ALL: &'static [Role] = &[Self::Participant, Self::Judge, Self::Organizer, Self::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Participant => "participant",
            Self::Judge => "judge",
            Self::Organizer => "organizer",
            Self::Admin => "admin",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::Participant
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing an unknown role string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown role '{invalid}'. Valid values: participant, judge, organizer, admin")]
pub struct ParseRoleError {
    invalid: String,
}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "participant" => Ok(Self::Participant),
            "judge" => Ok(Self::Judge),
            "organizer" => Ok(Self::Organizer),
            "admin" => Ok(Self::Admin),
            _ => Err(ParseRoleError {
                invalid: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_all() {
        for role in Role::ALL {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), *role);
            let json = serde_json::to_string(role).unwrap();
            let parsed: Role = serde_json::from_str(&json).unwrap();
            assert_eq!(*role, parsed);
        }
    }

    #[test]
    fn test_unknown_role() {
        assert!("superuser".parse::<Role>().is_err());
        assert!("Admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_default_is_participant() {
        assert_eq!(Role::default(), Role::Participant);
    }
}
