//! `inventario-core`: shared building blocks for the inventory console.
//!
//! This crate contains **pure** primitives (no IO, no HTTP): identifiers,
//! the error model, soft-delete semantics, and the list helpers every screen
//! uses (merge by id, client-side pagination).

pub mod collection;
pub mod datetime;
pub mod entity;
pub mod error;
pub mod id;
pub mod pagination;

pub use collection::merge_by_id;
pub use entity::{Entity, Labeled, SoftDelete, UNKNOWN_LABEL, label_or_unknown};
pub use error::{DomainError, DomainResult};
pub use id::{CategoryId, MovementId, ProductId, StockEntryId, SupplierId, UserId, WarehouseId};
pub use pagination::{Pagination, page_count};
