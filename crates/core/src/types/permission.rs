//! The (module, action) permission model.
//!
//! A permission is a capability to perform one action on one module. Grants
//! exist at two levels: attached to a role, or attached directly to a user.
//! The effective permission set for a user is the union of both, with the
//! user-level grant taking precedence when the same key appears twice.

use core::fmt;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Application modules that can be permission-gated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "permission_module", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum Module {
    Members,
    JuniorMembers,
    Users,
    Events,
    Meetings,
    Vehicles,
    Gdpr,
    Newsletters,
    Scheduler,
    Operations,
    PrintTemplates,
    ActivityLogs,
}

impl Module {
    /// Stable string form used in the database and in URLs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Members => "members",
            Self::JuniorMembers => "junior_members",
            Self::Users => "users",
            Self::Events => "events",
            Self::Meetings => "meetings",
            Self::Vehicles => "vehicles",
            Self::Gdpr => "gdpr",
            Self::Newsletters => "newsletters",
            Self::Scheduler => "scheduler",
            Self::Operations => "operations",
            Self::PrintTemplates => "print_templates",
            Self::ActivityLogs => "activity_logs",
        }
    }

    /// All modules, in sidebar order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Members,
            Self::JuniorMembers,
            Self::Users,
            Self::Events,
            Self::Meetings,
            Self::Vehicles,
            Self::Gdpr,
            Self::Newsletters,
            Self::Scheduler,
            Self::Operations,
            Self::PrintTemplates,
            Self::ActivityLogs,
        ]
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Actions that can be performed on a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "permission_action", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    View,
    Create,
    Edit,
    Delete,
    /// Send a newsletter or notification (newsletters module only).
    Send,
}

impl Action {
    /// Stable string form used in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Create => "create",
            Self::Edit => "edit",
            Self::Delete => "delete",
            Self::Send => "send",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A (module, action) capability key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionKey {
    pub module: Module,
    pub action: Action,
}

impl PermissionKey {
    /// Create a new key.
    #[must_use]
    pub const fn new(module: Module, action: Action) -> Self {
        Self { module, action }
    }
}

impl fmt::Display for PermissionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.module, self.action)
    }
}

/// Where a grant came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Granted through the user's role.
    Role,
    /// Granted directly to the user.
    User,
}

/// A single permission grant with its provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGrant {
    pub key: PermissionKey,
    pub source: Source,
}

/// The effective permission set for a user.
///
/// Built by merging role-level and user-level grants; a user-level grant
/// replaces a role-level grant for the same key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PermissionSet {
    grants: HashMap<PermissionKey, Source>,
}

impl PermissionSet {
    /// Build the effective set from raw grants in any order.
    ///
    /// User-sourced grants win over role-sourced grants for the same key.
    #[must_use]
    pub fn merge(grants: impl IntoIterator<Item = PermissionGrant>) -> Self {
        let mut map: HashMap<PermissionKey, Source> = HashMap::new();
        for grant in grants {
            match map.get(&grant.key) {
                Some(Source::User) => {}
                _ => {
                    map.insert(grant.key, grant.source);
                }
            }
        }
        Self { grants: map }
    }

    /// True if the set contains the (module, action) capability.
    #[must_use]
    pub fn allows(&self, module: Module, action: Action) -> bool {
        self.grants.contains_key(&PermissionKey::new(module, action))
    }

    /// Provenance of a grant, if present.
    #[must_use]
    pub fn source_of(&self, module: Module, action: Action) -> Option<Source> {
        self.grants.get(&PermissionKey::new(module, action)).copied()
    }

    /// Number of distinct grants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.grants.len()
    }

    /// True if no grants are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grant(module: Module, action: Action, source: Source) -> PermissionGrant {
        PermissionGrant {
            key: PermissionKey::new(module, action),
            source,
        }
    }

    #[test]
    fn allows_iff_grant_exists() {
        let set = PermissionSet::merge([
            grant(Module::Members, Action::View, Source::Role),
            grant(Module::Members, Action::Edit, Source::Role),
        ]);

        assert!(set.allows(Module::Members, Action::View));
        assert!(set.allows(Module::Members, Action::Edit));
        assert!(!set.allows(Module::Members, Action::Delete));
        assert!(!set.allows(Module::Events, Action::View));
    }

    #[test]
    fn user_grant_overrides_role_grant_for_same_key() {
        let set = PermissionSet::merge([
            grant(Module::Gdpr, Action::View, Source::Role),
            grant(Module::Gdpr, Action::View, Source::User),
        ]);

        assert_eq!(set.len(), 1);
        assert_eq!(set.source_of(Module::Gdpr, Action::View), Some(Source::User));
    }

    #[test]
    fn user_grant_wins_regardless_of_order() {
        let set = PermissionSet::merge([
            grant(Module::Gdpr, Action::View, Source::User),
            grant(Module::Gdpr, Action::View, Source::Role),
        ]);

        assert_eq!(set.source_of(Module::Gdpr, Action::View), Some(Source::User));
    }

    #[test]
    fn union_of_role_and_user_grants() {
        let set = PermissionSet::merge([
            grant(Module::Members, Action::View, Source::Role),
            grant(Module::Events, Action::Create, Source::User),
        ]);

        assert!(set.allows(Module::Members, Action::View));
        assert!(set.allows(Module::Events, Action::Create));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn empty_set_allows_nothing() {
        let set = PermissionSet::default();
        assert!(set.is_empty());
        assert!(!set.allows(Module::Members, Action::View));
    }

    #[test]
    fn key_display_matches_database_form() {
        let key = PermissionKey::new(Module::JuniorMembers, Action::Delete);
        assert_eq!(key.to_string(), "junior_members::delete");
    }
}
