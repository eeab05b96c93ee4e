//! Roles and the configuration-declared protected role set.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Stable role identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(Uuid);

impl RoleId {
    /// Wrap an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a fresh identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for RoleId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Named role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    /// Role identifier.
    #[schema(value_type = String, format = Uuid)]
    pub id: RoleId,
    /// Unique role name.
    #[schema(example = "Members")]
    pub name: String,
}

impl Role {
    /// Build a role.
    pub fn new(id: RoleId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Roles that can never be deleted.
///
/// The first entry doubles as the administrator role used to flag admins in
/// user listings.
///
/// # Examples
/// ```
/// use farm_backend::domain::ProtectedRoles;
///
/// let roles = ProtectedRoles::parse("Administrator, Auditor");
/// assert!(roles.contains("Auditor"));
/// assert_eq!(roles.admin_role(), Some("Administrator"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedRoles(Vec<String>);

/// Protected role used when none are configured.
pub const DEFAULT_PROTECTED_ROLE: &str = "Administrator";

impl ProtectedRoles {
    /// Build the set from names, dropping blanks and duplicates.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut roles: Vec<String> = Vec::new();
        for name in names {
            let name = name.as_ref().trim();
            if !name.is_empty() && !roles.iter().any(|existing| existing == name) {
                roles.push(name.to_owned());
            }
        }
        Self(roles)
    }

    /// Parse a comma-separated list.
    pub fn parse(raw: &str) -> Self {
        Self::new(raw.split(','))
    }

    /// Whether `name` is protected. Comparison is exact.
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|role| role == name)
    }

    /// Role whose holders are administrators.
    pub fn admin_role(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// Iterate protected role names.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl Default for ProtectedRoles {
    fn default() -> Self {
        Self::new([DEFAULT_PROTECTED_ROLE])
    }
}
