//! Stock-per-warehouse screen with its four views.

use std::sync::Arc;

use reqwest::Method;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use inventario_auth::{Action, Resource};
use inventario_catalog::{Product, Warehouse};
use inventario_core::{Pagination, ProductId, StockEntryId, WarehouseId, label_or_unknown};
use inventario_inventory::{ProductStockTotal, StockEntry, StockInput, StockLine, ensure_unique_pair};

use crate::error::{ClientError, ClientResult};
use crate::session::SessionManager;

pub const STOCK_PAGE_SIZE: usize = 5;
const STOCK_PATH: &str = "/stock_almacen";

/// Which view the screen shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StockTab {
    /// Every stock row (`/stock_almacen`).
    #[default]
    Detailed,
    /// Available units per product across warehouses.
    ByProduct,
    /// Rows of the selected warehouse.
    ByWarehouse,
    /// Rows of the selected product, with its code and name.
    ForProduct,
}

/// Failures of a multi-request load whose other parts still applied.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub failures: Vec<(&'static str, ClientError)>,
}

impl LoadReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Record a failed part, or bail out if the failure ends the load.
    pub(crate) fn absorb(&mut self, part: &'static str, err: ClientError) -> ClientResult<()> {
        if err.is_fatal() {
            return Err(err);
        }
        warn!(part, error = %err, "partial load failure");
        self.failures.push((part, err));
        Ok(())
    }
}

pub struct StockScreen {
    session: Arc<SessionManager>,
    cancel: CancellationToken,
    tab: StockTab,
    warehouse: Option<WarehouseId>,
    product: Option<ProductId>,
    products: Vec<Product>,
    warehouses: Vec<Warehouse>,
    entries: Vec<StockEntry>,
    totals: Vec<ProductStockTotal>,
    lines: Vec<StockLine>,
    pagination: Pagination,
}

impl StockScreen {
    pub fn new(session: Arc<SessionManager>) -> Self {
        let cancel = session.child_token();
        Self {
            session,
            cancel,
            tab: StockTab::default(),
            warehouse: None,
            product: None,
            products: Vec::new(),
            warehouses: Vec::new(),
            entries: Vec::new(),
            totals: Vec::new(),
            lines: Vec::new(),
            pagination: Pagination::new(STOCK_PAGE_SIZE),
        }
    }

    pub fn close(&self) {
        self.cancel.cancel();
    }

    /// Load the product and warehouse catalogs, then the current tab.
    pub async fn open(&mut self) -> ClientResult<LoadReport> {
        let mut report = self.load_catalogs().await?;
        if let Err(e) = self.load_tab().await {
            report.absorb("stock", e)?;
        }
        Ok(report)
    }

    /// Fetch both catalogs in parallel; each one that arrives is applied.
    pub async fn load_catalogs(&mut self) -> ClientResult<LoadReport> {
        let (products, warehouses) = tokio::join!(
            self.session.get_json::<Vec<Product>>("/productos", &self.cancel),
            self.session.get_json::<Vec<Warehouse>>("/almacenes", &self.cancel),
        );

        let mut report = LoadReport::default();
        match products {
            Ok(products) => self.products = products,
            Err(e) => report.absorb("productos", e)?,
        }
        match warehouses {
            Ok(warehouses) => self.warehouses = warehouses,
            Err(e) => report.absorb("almacenes", e)?,
        }
        Ok(report)
    }

    /// Reload the data behind the current tab. Tabs that need a selection
    /// show nothing until one is made.
    pub async fn load_tab(&mut self) -> ClientResult<()> {
        match self.tab {
            StockTab::Detailed => {
                self.entries = self.session.get_json(STOCK_PATH, &self.cancel).await?;
            }
            StockTab::ByProduct => {
                self.totals = self
                    .session
                    .get_json(&format!("{STOCK_PATH}/por_producto"), &self.cancel)
                    .await?;
            }
            StockTab::ByWarehouse => {
                let path = self.warehouse.map(|id| format!("{STOCK_PATH}/por_almacen/{id}"));
                self.load_lines(path).await?;
            }
            StockTab::ForProduct => {
                let path = self.product.map(|id| format!("{STOCK_PATH}/producto/{id}"));
                self.load_lines(path).await?;
            }
        }
        self.clamp_page();
        Ok(())
    }

    async fn load_lines(&mut self, path: Option<String>) -> ClientResult<()> {
        let Some(path) = path else {
            self.lines.clear();
            return Ok(());
        };
        match self.session.get_json(&path, &self.cancel).await {
            Ok(lines) => {
                self.lines = lines;
                Ok(())
            }
            Err(ClientError::Cancelled) => Err(ClientError::Cancelled),
            Err(e) => {
                self.lines.clear();
                Err(e)
            }
        }
    }

    pub fn tab(&self) -> StockTab {
        self.tab
    }

    /// Switch view and go back to page 1.
    pub async fn set_tab(&mut self, tab: StockTab) -> ClientResult<()> {
        self.tab = tab;
        self.pagination.reset();
        self.load_tab().await
    }

    pub async fn select_warehouse(&mut self, id: WarehouseId) -> ClientResult<()> {
        self.warehouse = Some(id);
        self.set_tab(StockTab::ByWarehouse).await
    }

    pub async fn select_product(&mut self, id: ProductId) -> ClientResult<()> {
        self.product = Some(id);
        self.set_tab(StockTab::ForProduct).await
    }

    /// Create a stock row. A second row for the same product and warehouse
    /// is rejected before anything is sent.
    pub async fn create_entry(&mut self, input: &StockInput) -> ClientResult<StockEntry> {
        self.session.require(Resource::Stock, Action::Create)?;
        input.validate()?;
        ensure_unique_pair(&self.entries, input, None)?;

        let created: StockEntry = self
            .session
            .send_json(Method::POST, STOCK_PATH, input, &self.cancel)
            .await?;
        info!(id = %created.id, "stock entry created");
        self.reload_after_write().await?;
        Ok(created)
    }

    pub async fn update_entry(&mut self, id: StockEntryId, input: &StockInput) -> ClientResult<StockEntry> {
        self.session.require(Resource::Stock, Action::Update)?;
        input.validate()?;
        ensure_unique_pair(&self.entries, input, Some(id))?;

        let updated: StockEntry = self
            .session
            .send_json(Method::PUT, &format!("{STOCK_PATH}/{id}"), input, &self.cancel)
            .await?;
        info!(%id, "stock entry updated");
        self.reload_after_write().await?;
        Ok(updated)
    }

    async fn reload_after_write(&mut self) -> ClientResult<()> {
        match self.load_tab().await {
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                warn!(error = %e, "reload after write failed");
                Ok(())
            }
            Ok(()) => Ok(()),
        }
    }

    pub fn entries(&self) -> &[StockEntry] {
        &self.entries
    }

    pub fn totals(&self) -> &[ProductStockTotal] {
        &self.totals
    }

    pub fn lines(&self) -> &[StockLine] {
        &self.lines
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn warehouses(&self) -> &[Warehouse] {
        &self.warehouses
    }

    pub fn product_label(&self, id: ProductId) -> &str {
        label_or_unknown(&self.products, id)
    }

    pub fn warehouse_label(&self, id: WarehouseId) -> &str {
        label_or_unknown(&self.warehouses, id)
    }

    fn row_count(&self) -> usize {
        match self.tab {
            StockTab::Detailed => self.entries.len(),
            StockTab::ByProduct => self.totals.len(),
            StockTab::ByWarehouse | StockTab::ForProduct => self.lines.len(),
        }
    }

    fn clamp_page(&mut self) {
        let total = self.row_count();
        let page = self.pagination.page();
        self.pagination.set_page(page, total);
    }

    pub fn page(&self) -> usize {
        self.pagination.page()
    }

    pub fn page_count(&self) -> usize {
        self.pagination.page_count(self.row_count())
    }

    pub fn set_page(&mut self, page: usize) {
        let total = self.row_count();
        self.pagination.set_page(page, total);
    }

    pub fn page_entries(&self) -> &[StockEntry] {
        self.pagination.slice(&self.entries)
    }

    pub fn page_totals(&self) -> &[ProductStockTotal] {
        self.pagination.slice(&self.totals)
    }

    pub fn page_lines(&self) -> &[StockLine] {
        self.pagination.slice(&self.lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_errors_abort_a_partial_load() {
        let mut report = LoadReport::default();
        assert!(report.absorb("productos", ClientError::Network("down".into())).is_ok());
        assert!(!report.is_complete());
        assert!(matches!(
            report.absorb("almacenes", ClientError::SessionExpired),
            Err(ClientError::SessionExpired)
        ));
        assert_eq!(report.failures.len(), 1);
    }
}
