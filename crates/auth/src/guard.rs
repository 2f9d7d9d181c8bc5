//! Route Guard: decides, from session state alone, whether a view renders.
//!
//! The guard holds no state. Every decision is a pure function of the
//! session's `loading` flag and current user, delegating role checks to
//! [`can_view`].

use serde::{Deserialize, Serialize};

use crate::{Action, Resource, User, can_view};

/// Views of the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Login,
    Dashboard,
    Products,
    Stock,
    Movements,
    Warehouses,
    Categories,
    Suppliers,
    Users,
}

impl Route {
    /// Landing view for authenticated users.
    pub const LANDING: Route = Route::Dashboard;

    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Dashboard => "/dashboard",
            Route::Products => "/productos",
            Route::Stock => "/stock-almacen",
            Route::Movements => "/movimientos",
            Route::Warehouses => "/almacenes",
            Route::Categories => "/categorias",
            Route::Suppliers => "/proveedores",
            Route::Users => "/usuarios",
        }
    }

    /// Resolve a path. `/` and unknown paths land on the dashboard.
    pub fn from_path(path: &str) -> Route {
        let trimmed = path.trim().trim_end_matches('/');
        match trimmed {
            "/login" => Route::Login,
            "/productos" => Route::Products,
            "/stock-almacen" => Route::Stock,
            "/movimientos" => Route::Movements,
            "/almacenes" => Route::Warehouses,
            "/categorias" => Route::Categories,
            "/proveedores" => Route::Suppliers,
            "/usuarios" => Route::Users,
            _ => Route::LANDING,
        }
    }

    /// Resource the view shows; `None` for public views.
    pub fn resource(&self) -> Option<Resource> {
        match self {
            Route::Login => None,
            Route::Dashboard => Some(Resource::Dashboard),
            Route::Products => Some(Resource::Products),
            Route::Stock => Some(Resource::Stock),
            Route::Movements => Some(Resource::Movements),
            Route::Warehouses => Some(Resource::Warehouses),
            Route::Categories => Some(Resource::Categories),
            Route::Suppliers => Some(Resource::Suppliers),
            Route::Users => Some(Resource::Users),
        }
    }

    pub fn is_public(&self) -> bool {
        self.resource().is_none()
    }
}

/// Session state as seen by the guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    /// The persisted token is still being resolved.
    Unresolved,
    Anonymous,
    Employee,
    Admin,
}

impl GuardState {
    pub fn from_session(loading: bool, user: Option<&User>) -> Self {
        match (loading, user) {
            (true, _) => GuardState::Unresolved,
            (false, None) => GuardState::Anonymous,
            (false, Some(u)) if u.is_admin() => GuardState::Admin,
            (false, Some(_)) => GuardState::Employee,
        }
    }
}

/// Outcome of guarding a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    /// Session not resolved yet: render nothing, decide later.
    Pending,
    Render,
    Redirect(Route),
}

/// Decide what happens when navigating to `route`.
pub fn decide(loading: bool, user: Option<&User>, route: Route) -> GuardDecision {
    if loading {
        return GuardDecision::Pending;
    }

    let Some(resource) = route.resource() else {
        return GuardDecision::Render;
    };

    if user.is_none() {
        return GuardDecision::Redirect(Route::Login);
    }

    if can_view(user, resource, Action::View) {
        GuardDecision::Render
    } else {
        GuardDecision::Redirect(Route::LANDING)
    }
}
