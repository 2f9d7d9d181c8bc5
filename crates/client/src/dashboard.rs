//! Landing view: product overview for admins.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use inventario_auth::{Action, Resource};
use inventario_catalog::{Product, ProductSummary, sort_newest_first, summarize};
use inventario_core::merge_by_id;

use crate::error::ClientResult;
use crate::session::SessionManager;

#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    /// Active and deleted products, newest first.
    pub products: Vec<Product>,
    pub summary: ProductSummary,
}

impl Dashboard {
    /// The `limit` most recently created products.
    pub fn recent(&self, limit: usize) -> &[Product] {
        &self.products[..limit.min(self.products.len())]
    }
}

/// Load the dashboard. Only sessions allowed to see deleted products get
/// the overview; everyone else gets an empty one without a request.
pub async fn load_dashboard(session: &Arc<SessionManager>, cancel: &CancellationToken) -> ClientResult<Dashboard> {
    session.require(Resource::Dashboard, Action::View)?;
    if !session.can(Resource::Products, Action::ViewDeleted) {
        return Ok(Dashboard::default());
    }

    let active: Vec<Product> = session.get_json("/productos", cancel).await?;
    let mut products = match session.get_json::<Vec<Product>>("/productos/borrados", cancel).await {
        Ok(deleted) => merge_by_id(active, deleted),
        Err(e) if e.is_fatal() => return Err(e),
        Err(e) => {
            warn!(error = %e, "could not load deleted products");
            active
        }
    };

    sort_newest_first(&mut products);
    let summary = summarize(&products);
    Ok(Dashboard { products, summary })
}
