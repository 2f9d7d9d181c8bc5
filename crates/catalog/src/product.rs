use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use inventario_core::datetime::lenient;
use inventario_core::{CategoryId, Entity, Labeled, ProductId, SoftDelete, SupplierId};

use crate::active_by_default;

/// Product as listed by `GET /productos`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    /// Unique product code (enforced by the backend).
    pub codigo: String,
    pub nombre: String,
    #[serde(default)]
    pub descripcion: Option<String>,
    pub precio_compra: f64,
    pub precio_venta: f64,
    pub fk_categoria: CategoryId,
    pub fk_proveedor: SupplierId,
    #[serde(default)]
    pub stock_minimo: Option<i64>,
    #[serde(default = "active_by_default")]
    pub activo: bool,
    #[serde(default, with = "lenient")]
    pub fecha_creacion: Option<NaiveDateTime>,
}

/// Body of `POST /productos` and `PUT /productos/{id}`.
///
/// Prices are sent as given: a sale price below the purchase price is a
/// business decision, not an input error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInput {
    pub codigo: String,
    pub nombre: String,
    #[serde(default)]
    pub descripcion: Option<String>,
    pub precio_compra: f64,
    pub precio_venta: f64,
    pub fk_categoria: CategoryId,
    pub fk_proveedor: SupplierId,
    #[serde(default)]
    pub stock_minimo: Option<i64>,
    #[serde(default = "active_by_default")]
    pub activo: bool,
}

impl From<&Product> for ProductInput {
    fn from(p: &Product) -> Self {
        Self {
            codigo: p.codigo.clone(),
            nombre: p.nombre.clone(),
            descripcion: p.descripcion.clone(),
            precio_compra: p.precio_compra,
            precio_venta: p.precio_venta,
            fk_categoria: p.fk_categoria,
            fk_proveedor: p.fk_proveedor,
            stock_minimo: p.stock_minimo,
            activo: p.activo,
        }
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> ProductId {
        self.id
    }
}

impl SoftDelete for Product {
    fn is_active(&self) -> bool {
        self.activo
    }

    fn set_active(&mut self, active: bool) {
        self.activo = active;
    }
}

impl Labeled for Product {
    fn label(&self) -> &str {
        &self.nombre
    }
}

/// Dashboard counters over a product list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProductSummary {
    pub total: usize,
    pub activos: usize,
    pub inactivos: usize,
}

pub fn summarize(products: &[Product]) -> ProductSummary {
    let activos = products.iter().filter(|p| p.activo).count();
    ProductSummary {
        total: products.len(),
        activos,
        inactivos: products.len() - activos,
    }
}

/// Newest `fecha_creacion` first; undated products go last, in their
/// original relative order.
pub fn sort_newest_first(products: &mut [Product]) {
    products.sort_by(|a, b| b.fecha_creacion.cmp(&a.fecha_creacion));
}
