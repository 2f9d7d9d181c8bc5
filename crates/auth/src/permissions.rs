use serde::{Deserialize, Serialize};

/// Something a screen shows or manipulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Dashboard,
    Products,
    Warehouses,
    Categories,
    Suppliers,
    Stock,
    Movements,
    Users,
    Reports,
}

impl Resource {
    pub const ALL: [Resource; 9] = [
        Resource::Dashboard,
        Resource::Products,
        Resource::Warehouses,
        Resource::Categories,
        Resource::Suppliers,
        Resource::Stock,
        Resource::Movements,
        Resource::Users,
        Resource::Reports,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Dashboard => "dashboard",
            Resource::Products => "products",
            Resource::Warehouses => "warehouses",
            Resource::Categories => "categories",
            Resource::Suppliers => "suppliers",
            Resource::Stock => "stock",
            Resource::Movements => "movements",
            Resource::Users => "users",
            Resource::Reports => "reports",
        }
    }
}

/// What is being done to a [`Resource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Open the view / list active records.
    View,
    /// Also list soft-deleted records.
    ViewDeleted,
    /// See records owned by every user (movements), not only one's own.
    ViewAll,
    Create,
    Update,
    Delete,
    Restore,
    Download,
}

impl Action {
    pub const ALL: [Action; 8] = [
        Action::View,
        Action::ViewDeleted,
        Action::ViewAll,
        Action::Create,
        Action::Update,
        Action::Delete,
        Action::Restore,
        Action::Download,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::View => "view",
            Action::ViewDeleted => "view_deleted",
            Action::ViewAll => "view_all",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Restore => "restore",
            Action::Download => "download",
        }
    }
}

/// Permission identifier, rendered as `"resource.action"` (e.g. `"products.create"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permission {
    pub resource: Resource,
    pub action: Action,
}

impl Permission {
    pub const fn new(resource: Resource, action: Action) -> Self {
        Self { resource, action }
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}.{}", self.resource.as_str(), self.action.as_str())
    }
}
