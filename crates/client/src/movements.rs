//! Movement Recorder: the append-only write path for stock changes.
//!
//! The backend computes `cantidad_anterior`/`cantidad_nueva` and enforces
//! non-negative stock. The client validates the form, submits it and
//! reloads the list for the caller's scope.

use std::sync::Arc;

use reqwest::Method;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use inventario_auth::{Action, Resource};
use inventario_catalog::{Product, Supplier, Warehouse};
use inventario_core::{Pagination, ProductId, SupplierId, UserId, WarehouseId, label_or_unknown};
use inventario_inventory::{Movement, MovementDraft, MovementStats};

use crate::error::{ClientError, ClientResult};
use crate::session::SessionManager;
use crate::stock::LoadReport;

pub const MOVEMENT_PAGE_SIZE: usize = 10;
const MOVEMENTS_PATH: &str = "/movimientos";

/// Whose movements the list shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementScope {
    All,
    User(UserId),
}

impl MovementScope {
    pub fn path(&self) -> String {
        match self {
            MovementScope::All => MOVEMENTS_PATH.to_string(),
            MovementScope::User(id) => format!("{MOVEMENTS_PATH}/usuario/{id}"),
        }
    }
}

pub struct MovementRecorder {
    session: Arc<SessionManager>,
    cancel: CancellationToken,
    movements: Vec<Movement>,
    products: Vec<Product>,
    warehouses: Vec<Warehouse>,
    suppliers: Vec<Supplier>,
    pagination: Pagination,
}

impl MovementRecorder {
    pub fn new(session: Arc<SessionManager>) -> Self {
        let cancel = session.child_token();
        Self {
            session,
            cancel,
            movements: Vec::new(),
            products: Vec::new(),
            warehouses: Vec::new(),
            suppliers: Vec::new(),
            pagination: Pagination::new(MOVEMENT_PAGE_SIZE),
        }
    }

    pub fn close(&self) {
        self.cancel.cancel();
    }

    /// Admins see every movement; everyone else only their own.
    pub fn scope(&self) -> ClientResult<MovementScope> {
        let user = self.session.user().ok_or(ClientError::NotAuthenticated)?;
        if self.session.can(Resource::Movements, Action::ViewAll) {
            Ok(MovementScope::All)
        } else {
            Ok(MovementScope::User(user.id))
        }
    }

    /// Load movements and the three catalogs in parallel. Whatever arrives
    /// is applied; the report lists what did not.
    pub async fn load(&mut self) -> ClientResult<LoadReport> {
        let path = self.scope()?.path();
        let (movements, products, warehouses, suppliers) = tokio::join!(
            self.session.get_json::<Vec<Movement>>(&path, &self.cancel),
            self.session.get_json::<Vec<Product>>("/productos", &self.cancel),
            self.session.get_json::<Vec<Warehouse>>("/almacenes", &self.cancel),
            self.session.get_json::<Vec<Supplier>>("/proveedores", &self.cancel),
        );

        let mut report = LoadReport::default();
        match movements {
            Ok(movements) => {
                for m in movements.iter().filter(|m| !m.is_consistent()) {
                    warn!(
                        id = %m.id,
                        tipo = m.tipo_movimiento.as_str(),
                        cantidad = m.cantidad,
                        anterior = m.cantidad_anterior,
                        nueva = m.cantidad_nueva,
                        "movement quantities disagree with its type"
                    );
                }
                self.movements = movements;
                let page = self.pagination.page();
                self.pagination.set_page(page, self.movements.len());
            }
            Err(e) => report.absorb("movimientos", e)?,
        }
        match products {
            Ok(products) => self.products = products,
            Err(e) => report.absorb("productos", e)?,
        }
        match warehouses {
            Ok(warehouses) => self.warehouses = warehouses,
            Err(e) => report.absorb("almacenes", e)?,
        }
        match suppliers {
            Ok(suppliers) => self.suppliers = suppliers,
            Err(e) => report.absorb("proveedores", e)?,
        }
        Ok(report)
    }

    /// Validate `draft` locally, submit it on behalf of the signed-in user
    /// and reload the list. Nothing is sent when validation fails.
    pub async fn record(&mut self, draft: MovementDraft) -> ClientResult<Movement> {
        let user = self.session.user().ok_or(ClientError::NotAuthenticated)?;
        self.session.require(Resource::Movements, Action::Create)?;
        let submission = draft.validate(user.id)?;

        let created: Movement = self
            .session
            .send_json(Method::POST, MOVEMENTS_PATH, &submission, &self.cancel)
            .await?;

        info!(
            id = %created.id,
            tipo = created.tipo_movimiento.as_str(),
            cantidad = created.cantidad,
            "movement recorded"
        );
        if !created.is_consistent() {
            warn!(
                id = %created.id,
                anterior = created.cantidad_anterior,
                nueva = created.cantidad_nueva,
                "backend returned quantities that disagree with the movement type"
            );
        }

        match self.load().await {
            Ok(_) => {}
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => warn!(error = %e, "reload after recording failed"),
        }
        Ok(created)
    }

    pub fn movements(&self) -> &[Movement] {
        &self.movements
    }

    pub fn stats(&self) -> MovementStats {
        MovementStats::from_movements(&self.movements)
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn warehouses(&self) -> &[Warehouse] {
        &self.warehouses
    }

    pub fn suppliers(&self) -> &[Supplier] {
        &self.suppliers
    }

    pub fn product_label(&self, id: ProductId) -> &str {
        label_or_unknown(&self.products, id)
    }

    pub fn warehouse_label(&self, id: WarehouseId) -> &str {
        label_or_unknown(&self.warehouses, id)
    }

    pub fn supplier_label(&self, id: Option<SupplierId>) -> &str {
        match id {
            Some(id) => label_or_unknown(&self.suppliers, id),
            None => "N/A",
        }
    }

    pub fn page(&self) -> usize {
        self.pagination.page()
    }

    pub fn page_count(&self) -> usize {
        self.pagination.page_count(self.movements.len())
    }

    pub fn set_page(&mut self, page: usize) {
        self.pagination.set_page(page, self.movements.len());
    }

    pub fn page_movements(&self) -> &[Movement] {
        self.pagination.slice(&self.movements)
    }
}
