//! Catalog records: products, warehouses, categories and suppliers.
//!
//! Plain data as the backend serves it, with the soft-delete and labelling
//! traits from `inventario-core`. Required-field and business validation is
//! the backend's job; nothing here second-guesses it.

pub mod category;
pub mod product;
pub mod supplier;
pub mod warehouse;

pub use category::{Category, CategoryInput};
pub use product::{Product, ProductInput, ProductSummary, sort_newest_first, summarize};
pub use supplier::{Supplier, SupplierInput};
pub use warehouse::{Warehouse, WarehouseInput};

pub(crate) fn active_by_default() -> bool {
    true
}
