//! User domain model (authorization projection).
//!
//! Users carry exactly one role. The built-in roles have fixed slugs;
//! anything else is a tenant-defined custom role.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UserRole {
    SuperAdmin,
    Admin,
    Teacher,
    Student,
    Parent,
    Accountant,
    Custom(String),
}

impl UserRole {
    /// Built-in roles in display order.
    pub const BUILT_IN: [UserRole; 6] = [
        UserRole::SuperAdmin,
        UserRole::Admin,
        UserRole::Teacher,
        UserRole::Student,
        UserRole::Parent,
        UserRole::Accountant,
    ];

    pub fn from_slug(slug: &str) -> Self {
        match slug {
            "SuperAdmin" => UserRole::SuperAdmin,
            "Admin" => UserRole::Admin,
            "Teacher" => UserRole::Teacher,
            "Student" => UserRole::Student,
            "Parent" => UserRole::Parent,
            "Accountant" => UserRole::Accountant,
            other => UserRole::Custom(other.to_string()),
        }
    }

    pub fn slug(&self) -> &str {
        match self {
            UserRole::SuperAdmin => "SuperAdmin",
            UserRole::Admin => "Admin",
            UserRole::Teacher => "Teacher",
            UserRole::Student => "Student",
            UserRole::Parent => "Parent",
            UserRole::Accountant => "Accountant",
            UserRole::Custom(slug) => slug,
        }
    }

    pub fn is_super_admin(&self) -> bool {
        matches!(self, UserRole::SuperAdmin)
    }
}

impl From<String> for UserRole {
    fn from(slug: String) -> Self {
        UserRole::from_slug(&slug)
    }
}

impl From<UserRole> for String {
    fn from(role: UserRole) -> Self {
        role.slug().to_string()
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// School the user belongs to; `None` for platform operators.
    pub tenant_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_super_admin(&self) -> bool {
        self.role.is_super_admin()
    }

    pub fn has_role(&self, slug: &str) -> bool {
        self.role.slug() == slug
    }

    pub fn has_any_role(&self, slugs: &[&str]) -> bool {
        slugs.iter().any(|slug| self.has_role(slug))
    }

    /// A user holds a single role, so this only holds when every listed
    /// slug is that role. An empty list is never satisfied.
    pub fn has_all_roles(&self, slugs: &[&str]) -> bool {
        !slugs.is_empty() && slugs.iter().all(|slug| self.has_role(slug))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub tenant_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<UserRole>,
    pub is_active: Option<bool>,
}
