use common::Role;
use sea_orm::*;
use tracing::info;

use crate::entity::{role, role_permission};

/// Default role-permission mappings seeded on startup.
const DEFAULT_MAPPINGS: &[(&str, &str)] = &[
    // Admin: all permissions
    ("admin", "hackathon:create"),
    ("admin", "hackathon:manage"),
    ("admin", "hackathon:approve"),
    ("admin", "hackathon:delete"),
    ("admin", "dashboard:view"),
    ("admin", "results:publish"),
    ("admin", "project:score"),
    ("admin", "user:manage"),
    // Organizer
    ("organizer", "hackathon:create"),
    // Judge
    ("judge", "project:score"),
    // Participant: team and project actions need no extra permissions
];

/// Seed the `role` and `role_permission` tables with defaults.
pub async fn seed_role_permissions(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Seed roles
    let mut roles_inserted = 0u32;
    for &r in Role::ALL {
        let model = role::ActiveModel {
            name: Set(r.as_str().to_string()),
        };

        let result = role::Entity::insert(model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(role::Column::Name)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await;

        match result {
            Ok(_) => roles_inserted += 1,
            Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    if roles_inserted > 0 {
        info!("Seeded {} new roles", roles_inserted);
    }

    // Seed role-permission mappings
    let mut perms_inserted = 0u32;
    for &(role, permission) in DEFAULT_MAPPINGS {
        let model = role_permission::ActiveModel {
            role: Set(role.to_string()),
            permission: Set(permission.to_string()),
        };

        let result = role_permission::Entity::insert(model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::columns([
                    role_permission::Column::Role,
                    role_permission::Column::Permission,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(db)
            .await;

        match result {
            Ok(_) => perms_inserted += 1,
            Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    if perms_inserted > 0 {
        info!("Seeded {} new role-permission mappings", perms_inserted);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_mappings_reference_known_roles() {
        for &(role, _) in DEFAULT_MAPPINGS {
            assert!(
                Role::from_str(role).is_ok(),
                "mapping references unknown role '{role}'"
            );
        }
    }

    #[test]
    fn test_mappings_have_no_duplicates() {
        let mut seen = std::collections::HashSet::new();
        for &pair in DEFAULT_MAPPINGS {
            assert!(seen.insert(pair), "duplicate mapping {pair:?}");
        }
    }
}
