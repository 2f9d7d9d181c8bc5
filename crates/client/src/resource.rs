//! Generic list/CRUD screen over one backend collection.
//!
//! Products, warehouses, categories, suppliers and users share the same
//! contract: list (active plus deleted for admins), create, update,
//! soft-delete with confirmation, restore, client-side pagination and an
//! active/inactive filter. [`ResourceKind`] describes one collection;
//! [`ResourceScreen`] is the screen state over it.

use std::marker::PhantomData;
use std::sync::Arc;

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use inventario_auth::{Action, NewUser, Resource, User, UserUpdate};
use inventario_catalog::{
    Category, CategoryInput, Product, ProductInput, Supplier, SupplierInput, Warehouse, WarehouseInput,
};
use inventario_core::{Entity, Pagination, SoftDelete, merge_by_id};

use crate::error::{ClientError, ClientResult};
use crate::session::SessionManager;

/// Page size of the catalog screens.
pub const CATALOG_PAGE_SIZE: usize = 5;

/// One backend collection with soft-delete and restore.
pub trait ResourceKind: Send + Sync + 'static {
    type Entity: DeserializeOwned + Entity + SoftDelete + Clone + Send;
    type Create: Serialize + Sync;
    type Update: Serialize + Sync;

    /// Collection path, e.g. `/productos`.
    const PATH: &'static str;
    const RESOURCE: Resource;
    const PAGE_SIZE: usize = CATALOG_PAGE_SIZE;
    /// Singular noun used in confirmation prompts.
    const NOUN: &'static str;

    /// Where new records are posted.
    fn create_path() -> String {
        Self::PATH.to_string()
    }

    fn item_path(id: <Self::Entity as Entity>::Id) -> String
    where
        <Self::Entity as Entity>::Id: std::fmt::Display,
    {
        format!("{}/{}", Self::PATH, id)
    }
}

pub struct Products;
pub struct Warehouses;
pub struct Categories;
pub struct Suppliers;
pub struct Users;

impl ResourceKind for Products {
    type Entity = Product;
    type Create = ProductInput;
    type Update = ProductInput;
    const PATH: &'static str = "/productos";
    const RESOURCE: Resource = Resource::Products;
    const NOUN: &'static str = "producto";
}

impl ResourceKind for Warehouses {
    type Entity = Warehouse;
    type Create = WarehouseInput;
    type Update = WarehouseInput;
    const PATH: &'static str = "/almacenes";
    const RESOURCE: Resource = Resource::Warehouses;
    const NOUN: &'static str = "almacén";
}

impl ResourceKind for Categories {
    type Entity = Category;
    type Create = CategoryInput;
    type Update = CategoryInput;
    const PATH: &'static str = "/categorias";
    const RESOURCE: Resource = Resource::Categories;
    const NOUN: &'static str = "categoría";
}

impl ResourceKind for Suppliers {
    type Entity = Supplier;
    type Create = SupplierInput;
    type Update = SupplierInput;
    const PATH: &'static str = "/proveedores";
    const RESOURCE: Resource = Resource::Suppliers;
    const NOUN: &'static str = "proveedor";
}

impl ResourceKind for Users {
    type Entity = User;
    type Create = NewUser;
    type Update = UserUpdate;
    const PATH: &'static str = "/usuarios";
    const RESOURCE: Resource = Resource::Users;
    const NOUN: &'static str = "usuario";

    fn create_path() -> String {
        "/auth/registro".to_string()
    }
}

/// Asks the user before a destructive action.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Confirms everything (`--yes` on the command line).
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The user declined; nothing was sent.
    Declined,
}

/// Which records the list shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Inactive,
}

impl StatusFilter {
    pub fn matches<T: SoftDelete>(&self, item: &T) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => item.is_active(),
            StatusFilter::Inactive => !item.is_active(),
        }
    }
}

impl std::str::FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "todos" | "all" => Ok(StatusFilter::All),
            "activos" | "activas" | "active" => Ok(StatusFilter::Active),
            "inactivos" | "inactivas" | "inactive" => Ok(StatusFilter::Inactive),
            other => Err(format!("unknown filter '{other}' (expected todos, activos or inactivos)")),
        }
    }
}

/// Screen state for one collection.
pub struct ResourceScreen<R: ResourceKind> {
    session: Arc<SessionManager>,
    cancel: CancellationToken,
    items: Vec<R::Entity>,
    pagination: Pagination,
    filter: StatusFilter,
    _kind: PhantomData<R>,
}

impl<R> ResourceScreen<R>
where
    R: ResourceKind,
    <R::Entity as Entity>::Id: std::fmt::Display,
{
    pub fn new(session: Arc<SessionManager>) -> Self {
        let cancel = session.child_token();
        Self {
            session,
            cancel,
            items: Vec::new(),
            pagination: Pagination::new(R::PAGE_SIZE),
            filter: StatusFilter::default(),
            _kind: PhantomData,
        }
    }

    /// Handle that cancels this screen's in-flight requests.
    pub fn cancel_handle(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Cancel in-flight requests; their results will not be applied.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    /// Reload the collection. Admins also get soft-deleted records, merged
    /// by id; a failing `/borrados` call is logged and the active list kept.
    pub async fn list(&mut self) -> ClientResult<&[R::Entity]> {
        let active: Vec<R::Entity> = self.session.get_json(R::PATH, &self.cancel).await?;

        let items = if self.session.can(R::RESOURCE, Action::ViewDeleted) {
            let path = format!("{}/borrados", R::PATH);
            match self.session.get_json::<Vec<R::Entity>>(&path, &self.cancel).await {
                Ok(deleted) => merge_by_id(active, deleted),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!(resource = R::RESOURCE.as_str(), error = %e, "could not load deleted records");
                    active
                }
            }
        } else {
            active
        };

        self.items = items;
        let total = self.visible_len();
        let page = self.pagination.page();
        self.pagination.set_page(page, total);
        Ok(&self.items)
    }

    pub async fn create(&mut self, input: &R::Create) -> ClientResult<R::Entity> {
        self.session.require(R::RESOURCE, Action::Create)?;
        let created: R::Entity = self
            .session
            .send_json(Method::POST, &R::create_path(), input, &self.cancel)
            .await?;
        info!(resource = R::RESOURCE.as_str(), id = %created.id(), "created");
        self.reload_after_write().await?;
        Ok(created)
    }

    pub async fn update(&mut self, id: <R::Entity as Entity>::Id, input: &R::Update) -> ClientResult<R::Entity> {
        self.session.require(R::RESOURCE, Action::Update)?;
        let updated: R::Entity = self
            .session
            .send_json(Method::PUT, &R::item_path(id), input, &self.cancel)
            .await?;
        info!(resource = R::RESOURCE.as_str(), %id, "updated");
        self.reload_after_write().await?;
        Ok(updated)
    }

    /// Mark a record inactive after `confirm` agrees. Already-inactive
    /// records are not special-cased.
    pub async fn soft_delete(
        &mut self,
        id: <R::Entity as Entity>::Id,
        confirm: &dyn Confirm,
    ) -> ClientResult<DeleteOutcome> {
        self.session.require(R::RESOURCE, Action::Delete)?;

        let prompt = format!("¿Eliminar {} {}?", R::NOUN, id);
        if !confirm.confirm(&prompt) {
            return Ok(DeleteOutcome::Declined);
        }

        self.session
            .send_empty(Method::DELETE, &R::item_path(id), &self.cancel)
            .await?;
        info!(resource = R::RESOURCE.as_str(), %id, "soft-deleted");
        self.reload_after_write().await?;
        Ok(DeleteOutcome::Deleted)
    }

    pub async fn restore(&mut self, id: <R::Entity as Entity>::Id) -> ClientResult<()> {
        self.session.require(R::RESOURCE, Action::Restore)?;
        let path = format!("{}/restaurar/{}", R::PATH, id);
        self.session.send_empty(Method::PUT, &path, &self.cancel).await?;
        info!(resource = R::RESOURCE.as_str(), %id, "restored");
        self.reload_after_write().await
    }

    /// The write already happened; only a dead session or a closed screen
    /// is worth reporting from the reload.
    async fn reload_after_write(&mut self) -> ClientResult<()> {
        match self.list().await {
            Ok(_) => Ok(()),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                warn!(resource = R::RESOURCE.as_str(), error = %e, "reload after write failed");
                Ok(())
            }
        }
    }

    /// Everything loaded, ignoring the filter.
    pub fn items(&self) -> &[R::Entity] {
        &self.items
    }

    pub fn find(&self, id: <R::Entity as Entity>::Id) -> Option<&R::Entity> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Loaded records passing the current filter.
    pub fn visible(&self) -> Vec<&R::Entity> {
        self.items.iter().filter(|item| self.filter.matches(*item)).collect()
    }

    fn visible_len(&self) -> usize {
        self.items.iter().filter(|item| self.filter.matches(*item)).count()
    }

    /// Records on the current page.
    pub fn page_items(&self) -> Vec<&R::Entity> {
        let visible = self.visible();
        self.pagination.slice(&visible).to_vec()
    }

    pub fn page(&self) -> usize {
        self.pagination.page()
    }

    pub fn page_count(&self) -> usize {
        self.pagination.page_count(self.visible_len())
    }

    pub fn set_page(&mut self, page: usize) {
        let total = self.visible_len();
        self.pagination.set_page(page, total);
    }

    pub fn filter(&self) -> StatusFilter {
        self.filter
    }

    /// Change the filter; the page goes back to 1.
    pub fn set_filter(&mut self, filter: StatusFilter) {
        self.filter = filter;
        self.pagination.reset();
    }
}
