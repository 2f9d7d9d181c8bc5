//! PDF report downloads.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use reqwest::header::CONTENT_DISPOSITION;
use tokio_util::sync::CancellationToken;
use tracing::info;

use inventario_auth::{Action, Resource};

use crate::error::{ClientError, ClientResult};
use crate::http::{cancellable, ensure_success};
use crate::session::{RequestOptions, SessionManager};

const DATE_PARAM: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// Products at or below their minimum stock.
    LowStock,
    InventoryOverview,
    /// Movements, optionally bounded by day (inclusive).
    Movements {
        desde: Option<NaiveDate>,
        hasta: Option<NaiveDate>,
    },
}

impl ReportKind {
    pub fn path(&self) -> &'static str {
        match self {
            ReportKind::LowStock => "/reportes/stock-bajo",
            ReportKind::InventoryOverview => "/reportes/inventario-general",
            ReportKind::Movements { .. } => "/reportes/movimientos",
        }
    }

    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let ReportKind::Movements { desde, hasta } = self {
            if let Some(d) = desde {
                query.push(("fecha_inicio", d.format(DATE_PARAM).to_string()));
            }
            if let Some(h) = hasta {
                query.push(("fecha_fin", h.format(DATE_PARAM).to_string()));
            }
        }
        query
    }

    /// Filename used when the response does not name the file.
    pub fn default_filename(&self) -> String {
        match self {
            ReportKind::LowStock => "reporte_stock_bajo.pdf".to_string(),
            ReportKind::InventoryOverview => "reporte_inventario_general.pdf".to_string(),
            ReportKind::Movements { desde, hasta } => {
                let fmt = |d: &NaiveDate| d.format(DATE_PARAM).to_string();
                match (desde, hasta) {
                    (Some(d), Some(h)) => format!("reporte_movimientos_{}_al_{}.pdf", fmt(d), fmt(h)),
                    (Some(d), None) => format!("reporte_movimientos_desde_{}.pdf", fmt(d)),
                    (None, Some(h)) => format!("reporte_movimientos_hasta_{}.pdf", fmt(h)),
                    (None, None) => "reporte_movimientos_general.pdf".to_string(),
                }
            }
        }
    }
}

/// A downloaded document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl Report {
    /// Write the document into `dir` under its filename.
    pub fn save_in(&self, dir: &Path) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

pub async fn download_report(
    session: &Arc<SessionManager>,
    kind: ReportKind,
    cancel: &CancellationToken,
) -> ClientResult<Report> {
    session.require(Resource::Reports, Action::Download)?;
    if let ReportKind::Movements {
        desde: Some(d),
        hasta: Some(h),
    } = kind
    {
        if d > h {
            return Err(ClientError::validation("fecha_inicio must not be after fecha_fin"));
        }
    }

    let mut options = RequestOptions::get().with_cancel(cancel);
    for (key, value) in kind.query() {
        options = options.with_query(key, value);
    }

    let resp = session.authenticated_request(kind.path(), options).await?;
    let report = cancellable(Some(cancel), async {
        let resp = ensure_success(resp).await?;
        let filename = resp
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(filename_from_disposition)
            .unwrap_or_else(|| kind.default_filename());
        let bytes = resp.bytes().await?.to_vec();
        Ok(Report { filename, bytes })
    })
    .await?;

    info!(filename = %report.filename, size = report.bytes.len(), "report downloaded");
    Ok(report)
}

/// `attachment; filename=x.pdf` (quoted or not). Path components are
/// stripped so the name cannot escape the target directory.
fn filename_from_disposition(header: &str) -> Option<String> {
    let raw = header.split(';').map(str::trim).find_map(|part| {
        let (key, value) = part.split_once('=')?;
        key.trim().eq_ignore_ascii_case("filename").then_some(value.trim())
    })?;

    let unquoted = raw.trim_matches('"');
    let name = unquoted.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(unquoted).trim();
    if name.is_empty() || name == "." || name == ".." {
        None
    } else {
        Some(name.to_string())
    }
}
