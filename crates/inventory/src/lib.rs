//! Inventory module: stock per warehouse and stock movements.
//!
//! The backend is the authority for stock arithmetic. This crate only models
//! the records, validates what a user types before it is submitted, and
//! checks that what comes back obeys the sign convention.

pub mod movement;
pub mod stock;

pub use movement::{
    ENTRADA_REQUIRES_SUPPLIER, Movement, MovementDraft, MovementStats, MovementType, NewMovement,
    StockEffect, coerce_quantity,
};
pub use stock::{ProductStockTotal, StockEntry, StockInput, StockLine, ensure_unique_pair};
