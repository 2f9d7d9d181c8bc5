//! Plain-text tables for the terminal.

use inventario_auth::User;
use inventario_catalog::{Category, Product, Supplier, Warehouse};
use inventario_core::SoftDelete;
use inventario_core::datetime::display;

/// A record that can be printed as one table row.
pub trait TableRow {
    const HEADERS: &'static [&'static str];

    fn cells(&self) -> Vec<String>;
}

pub fn status<T: SoftDelete>(item: &T) -> String {
    if item.is_active() { "activo" } else { "inactivo" }.to_string()
}

fn or_dash(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => "-".to_string(),
    }
}

impl TableRow for Product {
    const HEADERS: &'static [&'static str] =
        &["ID", "CÓDIGO", "NOMBRE", "COMPRA", "VENTA", "STOCK MÍN.", "ESTADO", "CREADO"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.codigo.clone(),
            self.nombre.clone(),
            format!("{:.2}", self.precio_compra),
            format!("{:.2}", self.precio_venta),
            self.stock_minimo.map_or_else(|| "-".to_string(), |v| v.to_string()),
            status(self),
            display(self.fecha_creacion.as_ref()),
        ]
    }
}

impl TableRow for Warehouse {
    const HEADERS: &'static [&'static str] = &["ID", "NOMBRE", "UBICACIÓN", "ESTADO", "CREADO"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.nombre.clone(),
            self.ubicacion.clone(),
            status(self),
            display(self.fecha_creacion.as_ref()),
        ]
    }
}

impl TableRow for Category {
    const HEADERS: &'static [&'static str] = &["ID", "NOMBRE", "DESCRIPCIÓN", "ESTADO", "CREADA"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.nombre.clone(),
            or_dash(self.descripcion.as_deref()),
            if self.activa { "activa" } else { "inactiva" }.to_string(),
            display(self.fecha_creacion.as_ref()),
        ]
    }
}

impl TableRow for Supplier {
    const HEADERS: &'static [&'static str] = &["ID", "NOMBRE", "TELÉFONO", "EMAIL", "CIUDAD", "ESTADO"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.nombre.clone(),
            or_dash(self.telefono.as_deref()),
            or_dash(self.email.as_deref()),
            or_dash(self.ciudad.as_deref()),
            status(self),
        ]
    }
}

impl TableRow for User {
    const HEADERS: &'static [&'static str] = &["ID", "NOMBRE", "EMAIL", "ROL", "ESTADO", "ÚLTIMA SESIÓN"];

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.nombre.clone(),
            self.email.clone(),
            self.rol.to_string(),
            status(self),
            display(self.fecha_ultima_sesion.as_ref()),
        ]
    }
}

/// Left-aligned columns separated by two spaces.
pub fn format_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let line = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| {
                let pad = width.saturating_sub(cell.chars().count());
                format!("{cell}{}", " ".repeat(pad))
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = String::new();
    out.push_str(&line(headers.to_vec()));
    out.push('\n');
    for row in rows {
        out.push_str(&line(row.iter().map(String::as_str).collect()));
        out.push('\n');
    }
    out
}

pub fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    if rows.is_empty() {
        println!("(sin resultados)");
        return;
    }
    print!("{}", format_table(headers, rows));
}

pub fn print_page_footer(page: usize, page_count: usize, total: usize) {
    println!("Página {} de {} ({} registros)", page, page_count.max(1), total);
}
