//! `inventario-client`
//!
//! **Responsibility:** everything that talks to the inventory backend.
//!
//! This crate provides:
//! - Configuration and token persistence
//! - The Session Manager and its authenticated request path
//! - Screen state for every console view (catalogs, stock, movements,
//!   dashboard, reports), each with its own cancellation token
//!
//! The backend stays the authority: the client validates forms, checks
//! permissions for a fast refusal and renders what it is told.

pub mod config;
pub mod dashboard;
pub mod error;
mod http;
pub mod movements;
pub mod reports;
pub mod resource;
pub mod session;
pub mod stock;
pub mod token_store;

pub use config::{ClientConfig, ConfigError};
pub use dashboard::{Dashboard, load_dashboard};
pub use error::{ClientError, ClientResult, extract_detail};
pub use movements::{MOVEMENT_PAGE_SIZE, MovementRecorder, MovementScope};
pub use reports::{Report, ReportKind, download_report};
pub use resource::{
    AssumeYes, Categories, Confirm, DeleteOutcome, Products, ResourceKind, ResourceScreen, StatusFilter, Suppliers,
    Users, Warehouses,
};
pub use session::{RequestOptions, SessionManager, SessionState};
pub use stock::{LoadReport, STOCK_PAGE_SIZE, StockScreen, StockTab};
pub use token_store::{FileTokenStore, MemoryTokenStore, TOKEN_KEY, TokenStore, TokenStoreError};
