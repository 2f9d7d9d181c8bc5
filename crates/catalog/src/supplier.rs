use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use inventario_core::datetime::lenient;
use inventario_core::{Entity, Labeled, SoftDelete, SupplierId};

use crate::active_by_default;

/// Supplier (proveedor) as listed by `GET /proveedores`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    pub id: SupplierId,
    pub nombre: String,
    #[serde(default)]
    pub telefono: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub direccion: Option<String>,
    #[serde(default)]
    pub ciudad: Option<String>,
    #[serde(default = "active_by_default")]
    pub activo: bool,
    #[serde(default, with = "lenient")]
    pub fecha_creacion: Option<NaiveDateTime>,
}

/// Body of `POST /proveedores` and `PUT /proveedores/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierInput {
    pub nombre: String,
    #[serde(default)]
    pub telefono: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub direccion: Option<String>,
    #[serde(default)]
    pub ciudad: Option<String>,
    #[serde(default = "active_by_default")]
    pub activo: bool,
}

impl From<&Supplier> for SupplierInput {
    fn from(s: &Supplier) -> Self {
        Self {
            nombre: s.nombre.clone(),
            telefono: s.telefono.clone(),
            email: s.email.clone(),
            direccion: s.direccion.clone(),
            ciudad: s.ciudad.clone(),
            activo: s.activo,
        }
    }
}

impl Entity for Supplier {
    type Id = SupplierId;

    fn id(&self) -> SupplierId {
        self.id
    }
}

impl SoftDelete for Supplier {
    fn is_active(&self) -> bool {
        self.activo
    }

    fn set_active(&mut self, active: bool) {
        self.activo = active;
    }
}

impl Labeled for Supplier {
    fn label(&self) -> &str {
        &self.nombre
    }
}
