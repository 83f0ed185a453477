use serde::Serialize;

/// Progress counter an achievement is measured against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AchievementMetric {
    HackathonsJoined,
    ProjectsSubmitted,
    Wins,
}

/// Static definition of an achievement.
pub struct AchievementDef {
    pub key: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub metric: AchievementMetric,
    pub target: u64,
}

/// Achievements are derived read-only from platform counts; nothing is
/// persisted per user.
pub const ACHIEVEMENTS: &[AchievementDef] = &[
    AchievementDef {
        key: "first_steps",
        title: "First Steps",
        description: "Join your first hackathon",
        metric: AchievementMetric::HackathonsJoined,
        target: 1,
    },
    AchievementDef {
        key: "regular",
        title: "Regular",
        description: "Join three hackathons",
        metric: AchievementMetric::HackathonsJoined,
        target: 3,
    },
    AchievementDef {
        key: "veteran",
        title: "Veteran",
        description: "Join ten hackathons",
        metric: AchievementMetric::HackathonsJoined,
        target: 10,
    },
    AchievementDef {
        key: "builder",
        title: "Builder",
        description: "Submit your first project",
        metric: AchievementMetric::ProjectsSubmitted,
        target: 1,
    },
    AchievementDef {
        key: "shipping_machine",
        title: "Shipping Machine",
        description: "Submit five projects",
        metric: AchievementMetric::ProjectsSubmitted,
        target: 5,
    },
    AchievementDef {
        key: "champion",
        title: "Champion",
        description: "Win a hackathon",
        metric: AchievementMetric::Wins,
        target: 1,
    },
    AchievementDef {
        key: "serial_winner",
        title: "Serial Winner",
        description: "Win three hackathons",
        metric: AchievementMetric::Wins,
        target: 3,
    },
];

#[derive(Serialize, utoipa::ToSchema)]
pub struct AchievementResponse {
    #[schema(example = "first_steps")]
    pub key: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub target: u64,
    pub progress: u64,
    pub unlocked: bool,
}

impl AchievementDef {
    /// Evaluate this definition against a progress count.
    pub fn evaluate(&self, progress: u64) -> AchievementResponse {
        AchievementResponse {
            key: self.key,
            title: self.title,
            description: self.description,
            target: self.target,
            // Clamp so a long-unlocked achievement doesn't report 47/3.
            progress: progress.min(self.target),
            unlocked: progress >= self.target,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate_clamps_progress() {
        let def = &ACHIEVEMENTS[1]; // regular: 3 joins
        let r = def.evaluate(47);
        assert!(r.unlocked);
        assert_eq!(r.progress, 3);
    }

    #[test]
    fn test_evaluate_below_target() {
        let def = &ACHIEVEMENTS[1];
        let r = def.evaluate(2);
        assert!(!r.unlocked);
        assert_eq!(r.progress, 2);
    }

    #[test]
    fn test_keys_are_unique() {
        let mut keys: Vec<_> = ACHIEVEMENTS.iter().map(|a| a.key).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), ACHIEVEMENTS.len());
    }
}
