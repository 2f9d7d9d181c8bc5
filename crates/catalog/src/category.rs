use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use inventario_core::datetime::lenient;
use inventario_core::{CategoryId, Entity, Labeled, SoftDelete};

use crate::active_by_default;

/// Product category. Note the feminine `activa` flag on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub nombre: String,
    #[serde(default)]
    pub descripcion: Option<String>,
    #[serde(default = "active_by_default")]
    pub activa: bool,
    #[serde(default, with = "lenient")]
    pub fecha_creacion: Option<NaiveDateTime>,
}

/// Body of `POST /categorias` and `PUT /categorias/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryInput {
    pub nombre: String,
    #[serde(default)]
    pub descripcion: Option<String>,
    #[serde(default = "active_by_default")]
    pub activa: bool,
}

impl From<&Category> for CategoryInput {
    fn from(c: &Category) -> Self {
        Self {
            nombre: c.nombre.clone(),
            descripcion: c.descripcion.clone(),
            activa: c.activa,
        }
    }
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> CategoryId {
        self.id
    }
}

impl SoftDelete for Category {
    fn is_active(&self) -> bool {
        self.activa
    }

    fn set_active(&mut self, active: bool) {
        self.activa = active;
    }
}

impl Labeled for Category {
    fn label(&self) -> &str {
        &self.nombre
    }
}
