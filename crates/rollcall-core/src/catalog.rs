//! Static permission catalog.
//!
//! The catalog lists every permission the application knows about,
//! grouped by module, along with a human-readable label. It is read-only
//! at runtime: build it once (from [`PermissionCatalog::default`] or a
//! deserialized table) and share it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Category assigned to ids whose module prefix has no mapping.
pub const OTHER_CATEGORY: &str = "Other";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogPermission {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogModule {
    pub module: String,
    pub permissions: Vec<CatalogPermission>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionCatalog {
    modules: Vec<CatalogModule>,
    /// Module prefix -> display category.
    categories: BTreeMap<String, String>,
}

const BUILT_IN_MODULES: &[(&str, &[(&str, &str)])] = &[
    ("dashboard", &[("dashboard.view", "View dashboard")]),
    (
        "students",
        &[
            ("students.view", "View students"),
            ("students.manage", "Manage students"),
            ("students.promote", "Promote students"),
        ],
    ),
    (
        "teachers",
        &[
            ("teachers.view", "View teachers"),
            ("teachers.manage", "Manage teachers"),
        ],
    ),
    (
        "classes",
        &[
            ("classes.view", "View classes and sections"),
            ("classes.manage", "Manage classes and sections"),
        ],
    ),
    (
        "subjects",
        &[
            ("subjects.view", "View subjects"),
            ("subjects.manage", "Manage subjects"),
        ],
    ),
    (
        "attendance",
        &[
            ("attendance.view", "View attendance"),
            ("attendance.manage", "Record attendance"),
        ],
    ),
    (
        "exams",
        &[
            ("exams.view", "View exams and results"),
            ("exams.manage", "Manage exams and marks"),
        ],
    ),
    (
        "fees",
        &[
            ("fees.view", "View fee records"),
            ("fees.manage", "Manage fee structures"),
            ("fees.collect", "Collect fee payments"),
        ],
    ),
    (
        "transport",
        &[
            ("transport.view", "View transport routes"),
            ("transport.manage", "Manage transport"),
        ],
    ),
    (
        "hr",
        &[
            ("hr.view", "View staff records"),
            ("hr.manage", "Manage staff records"),
        ],
    ),
    (
        "library",
        &[
            ("library.view", "View library catalogue"),
            ("library.manage", "Manage library"),
        ],
    ),
    (
        "reports",
        &[
            ("reports.view", "View reports"),
            ("reports.export", "Export reports"),
        ],
    ),
    (
        "users",
        &[
            ("users.view", "View users"),
            ("users.manage", "Manage users"),
        ],
    ),
    (
        "roles",
        &[
            ("roles.view", "View roles"),
            ("roles.manage", "Manage roles and permissions"),
        ],
    ),
    (
        "settings",
        &[
            ("settings.view", "View school settings"),
            ("settings.manage", "Manage school settings"),
        ],
    ),
];

const BUILT_IN_CATEGORIES: &[(&str, &str)] = &[
    ("dashboard", "General"),
    ("students", "Academic"),
    ("teachers", "Academic"),
    ("classes", "Academic"),
    ("subjects", "Academic"),
    ("attendance", "Academic"),
    ("exams", "Academic"),
    ("fees", "Finance"),
    ("transport", "Operations"),
    ("hr", "Operations"),
    ("library", "Operations"),
    ("reports", "Reporting"),
    ("users", "Administration"),
    ("roles", "Administration"),
    ("settings", "Administration"),
];

impl Default for PermissionCatalog {
    fn default() -> Self {
        let modules = BUILT_IN_MODULES
            .iter()
            .map(|(module, permissions)| CatalogModule {
                module: (*module).to_string(),
                permissions: permissions
                    .iter()
                    .map(|(id, label)| CatalogPermission {
                        id: (*id).to_string(),
                        label: (*label).to_string(),
                    })
                    .collect(),
            })
            .collect();
        let categories = BUILT_IN_CATEGORIES
            .iter()
            .map(|(prefix, category)| ((*prefix).to_string(), (*category).to_string()))
            .collect();
        Self {
            modules,
            categories,
        }
    }
}

impl PermissionCatalog {
    pub fn new(modules: Vec<CatalogModule>, categories: BTreeMap<String, String>) -> Self {
        Self {
            modules,
            categories,
        }
    }

    /// Return a copy of the catalog with one more permission registered.
    ///
    /// The module is appended if it does not exist yet.
    pub fn with_permission(mut self, module: &str, id: &str, label: &str) -> Self {
        let entry = CatalogPermission {
            id: id.to_string(),
            label: label.to_string(),
        };
        match self.modules.iter_mut().find(|m| m.module == module) {
            Some(existing) => existing.permissions.push(entry),
            None => self.modules.push(CatalogModule {
                module: module.to_string(),
                permissions: vec![entry],
            }),
        }
        self
    }

    /// Module identifiers in catalog order.
    pub fn list_modules(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.module.as_str()).collect()
    }

    /// Permission id -> label, for one module or for all of them.
    ///
    /// An unknown module yields an empty map.
    pub fn list_permissions(&self, module: Option<&str>) -> BTreeMap<&str, &str> {
        self.modules
            .iter()
            .filter(|m| module.is_none_or(|wanted| m.module == wanted))
            .flat_map(|m| m.permissions.iter())
            .map(|p| (p.id.as_str(), p.label.as_str()))
            .collect()
    }

    /// Display category for a permission id, from the text before the
    /// first `.`.
    pub fn category_of(&self, permission: &str) -> &str {
        let prefix = permission
            .split_once('.')
            .map_or(permission, |(prefix, _)| prefix);
        self.categories
            .get(prefix)
            .map_or(OTHER_CATEGORY, String::as_str)
    }

    pub fn contains(&self, permission: &str) -> bool {
        self.modules
            .iter()
            .flat_map(|m| m.permissions.iter())
            .any(|p| p.id == permission)
    }

    /// Category -> permissions in catalog order, for permission pickers.
    pub fn grouped_by_category(&self) -> BTreeMap<&str, Vec<&CatalogPermission>> {
        let mut grouped: BTreeMap<&str, Vec<&CatalogPermission>> = BTreeMap::new();
        for permission in self.modules.iter().flat_map(|m| m.permissions.iter()) {
            grouped
                .entry(self.category_of(&permission.id))
                .or_default()
                .push(permission);
        }
        grouped
    }

    /// Every permission id in catalog order.
    pub fn all_permission_ids(&self) -> impl Iterator<Item = &str> {
        self.modules
            .iter()
            .flat_map(|m| m.permissions.iter())
            .map(|p| p.id.as_str())
    }
}
