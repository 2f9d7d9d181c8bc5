use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use inventario_core::datetime::lenient;
use inventario_core::{Entity, Labeled, SoftDelete, WarehouseId};

use crate::active_by_default;

/// Warehouse (almacén) as listed by `GET /almacenes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warehouse {
    pub id: WarehouseId,
    pub nombre: String,
    pub ubicacion: String,
    #[serde(default = "active_by_default")]
    pub activo: bool,
    #[serde(default, with = "lenient")]
    pub fecha_creacion: Option<NaiveDateTime>,
}

/// Body of `POST /almacenes` and `PUT /almacenes/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarehouseInput {
    pub nombre: String,
    pub ubicacion: String,
    #[serde(default = "active_by_default")]
    pub activo: bool,
}

impl From<&Warehouse> for WarehouseInput {
    fn from(w: &Warehouse) -> Self {
        Self {
            nombre: w.nombre.clone(),
            ubicacion: w.ubicacion.clone(),
            activo: w.activo,
        }
    }
}

impl Entity for Warehouse {
    type Id = WarehouseId;

    fn id(&self) -> WarehouseId {
        self.id
    }
}

impl SoftDelete for Warehouse {
    fn is_active(&self) -> bool {
        self.activo
    }

    fn set_active(&mut self, active: bool) {
        self.activo = active;
    }
}

impl Labeled for Warehouse {
    fn label(&self) -> &str {
        &self.nombre
    }
}
