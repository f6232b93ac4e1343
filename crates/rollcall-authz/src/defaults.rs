//! Built-in role bundles.
//!
//! The default table seeds the global system roles and is copied into
//! every new tenant. It can be replaced through configuration, but the
//! `SuperAdmin` bundle is always the wildcard for both sets.

use rollcall_core::models::permission::PermissionSet;
use rollcall_core::models::role::CreateRole;
use rollcall_core::models::user::UserRole;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleTemplate {
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub permissions: PermissionSet,
    #[serde(default)]
    pub module_access: PermissionSet,
}

impl RoleTemplate {
    /// Build the row to write for this template. Global rows are system
    /// roles; tenant copies are ordinary, editable roles.
    pub fn to_create_role(&self, tenant_id: Option<Uuid>) -> CreateRole {
        CreateRole {
            tenant_id,
            name: self.name.clone(),
            slug: self.slug.clone(),
            description: self.description.clone(),
            is_system: tenant_id.is_none(),
            is_default: true,
            permissions: self.permissions.clone(),
            module_access: self.module_access.clone(),
        }
    }

    fn super_admin() -> Self {
        Self {
            slug: UserRole::SuperAdmin.slug().to_string(),
            name: "Super Admin".into(),
            description: "Platform operator with unrestricted access".into(),
            permissions: PermissionSet::All,
            module_access: PermissionSet::All,
        }
    }
}

/// Ordered list of role templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultRoleTable {
    roles: Vec<RoleTemplate>,
}

type TemplateRow = (
    &'static str,
    &'static str,
    &'static str,
    &'static [&'static str],
    &'static [&'static str],
);

const BUILT_IN_TEMPLATES: &[TemplateRow] = &[
    (
        "Admin",
        "School Admin",
        "Runs a single school",
        &[
            "dashboard.view",
            "students.view",
            "students.manage",
            "students.promote",
            "teachers.view",
            "teachers.manage",
            "classes.view",
            "classes.manage",
            "subjects.view",
            "subjects.manage",
            "attendance.view",
            "attendance.manage",
            "exams.view",
            "exams.manage",
            "fees.view",
            "fees.manage",
            "fees.collect",
            "transport.view",
            "transport.manage",
            "hr.view",
            "hr.manage",
            "library.view",
            "library.manage",
            "reports.view",
            "reports.export",
            "users.view",
            "users.manage",
            "roles.view",
            "roles.manage",
            "settings.view",
            "settings.manage",
        ],
        &[
            "dashboard",
            "students",
            "teachers",
            "classes",
            "subjects",
            "attendance",
            "exams",
            "fees",
            "transport",
            "hr",
            "library",
            "reports",
            "users",
            "roles",
            "settings",
        ],
    ),
    (
        "Teacher",
        "Teacher",
        "Teaching staff",
        &[
            "dashboard.view",
            "students.view",
            "classes.view",
            "subjects.view",
            "attendance.view",
            "attendance.manage",
            "exams.view",
            "exams.manage",
        ],
        &[
            "dashboard",
            "students",
            "classes",
            "subjects",
            "attendance",
            "exams",
        ],
    ),
    (
        "Student",
        "Student",
        "Enrolled student",
        &[
            "dashboard.view",
            "attendance.view",
            "exams.view",
            "library.view",
        ],
        &["dashboard", "attendance", "exams", "library"],
    ),
    (
        "Parent",
        "Parent",
        "Parent or guardian of a student",
        &[
            "dashboard.view",
            "students.view",
            "attendance.view",
            "exams.view",
            "fees.view",
        ],
        &["dashboard", "students", "attendance", "exams", "fees"],
    ),
    (
        "Accountant",
        "Accountant",
        "Handles fee collection and finance reports",
        &[
            "dashboard.view",
            "students.view",
            "fees.view",
            "fees.manage",
            "fees.collect",
            "reports.view",
            "reports.export",
        ],
        &["dashboard", "students", "fees", "reports"],
    ),
];

impl Default for DefaultRoleTable {
    fn default() -> Self {
        let roles = BUILT_IN_TEMPLATES
            .iter()
            .map(
                |(slug, name, description, permissions, modules)| RoleTemplate {
                    slug: (*slug).to_string(),
                    name: (*name).to_string(),
                    description: (*description).to_string(),
                    permissions: permissions.iter().copied().collect(),
                    module_access: modules.iter().copied().collect(),
                },
            )
            .collect();
        Self::new(roles)
    }
}

impl DefaultRoleTable {
    pub fn new(roles: Vec<RoleTemplate>) -> Self {
        Self { roles }
    }

    /// Templates in seeding order, `SuperAdmin` first.
    ///
    /// A `SuperAdmin` entry in the table is ignored in favour of the
    /// fixed wildcard bundle.
    pub fn list_defaults(&self) -> Vec<RoleTemplate> {
        let super_admin = UserRole::SuperAdmin.slug();
        std::iter::once(RoleTemplate::super_admin())
            .chain(
                self.roles
                    .iter()
                    .filter(|t| t.slug != super_admin)
                    .cloned(),
            )
            .collect()
    }

    pub fn get(&self, slug: &str) -> Option<RoleTemplate> {
        self.list_defaults().into_iter().find(|t| t.slug == slug)
    }
}
