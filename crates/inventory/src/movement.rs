use core::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use inventario_core::datetime::lenient;
use inventario_core::{
    DomainError, DomainResult, Entity, MovementId, ProductId, SupplierId, UserId, WarehouseId,
};

/// Shown when an entrada is submitted without a supplier.
pub const ENTRADA_REQUIRES_SUPPLIER: &str = "entradas must have an associated supplier";

/// Kind of stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementType {
    /// Stock in, from a supplier.
    Entrada,
    /// Stock out.
    Salida,
    /// Correction after a count.
    Ajuste,
    /// Customer return.
    Devolucion,
}

/// How a movement type moves the stock level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockEffect {
    Increase,
    Decrease,
    /// Either direction; `cantidad` is the size of the correction.
    Correction,
}

impl MovementType {
    pub const ALL: [MovementType; 4] = [
        MovementType::Entrada,
        MovementType::Salida,
        MovementType::Ajuste,
        MovementType::Devolucion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::Entrada => "entrada",
            MovementType::Salida => "salida",
            MovementType::Ajuste => "ajuste",
            MovementType::Devolucion => "devolucion",
        }
    }

    pub fn effect(&self) -> StockEffect {
        match self {
            MovementType::Entrada | MovementType::Devolucion => StockEffect::Increase,
            MovementType::Salida => StockEffect::Decrease,
            MovementType::Ajuste => StockEffect::Correction,
        }
    }

    pub fn requires_supplier(&self) -> bool {
        matches!(self, MovementType::Entrada)
    }
}

impl core::fmt::Display for MovementType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MovementType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "entrada" => Ok(MovementType::Entrada),
            "salida" => Ok(MovementType::Salida),
            "ajuste" => Ok(MovementType::Ajuste),
            "devolucion" | "devolución" => Ok(MovementType::Devolucion),
            other => Err(DomainError::validation(format!(
                "unknown movement type '{other}' (expected entrada, salida, ajuste or devolucion)"
            ))),
        }
    }
}

/// A recorded movement. Append-only: there is no edit or delete path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub id: MovementId,
    pub fk_producto: ProductId,
    pub fk_almacen: WarehouseId,
    pub tipo_movimiento: MovementType,
    pub cantidad: i64,
    pub cantidad_anterior: i64,
    pub cantidad_nueva: i64,
    #[serde(default)]
    pub motivo: Option<String>,
    pub fk_usuario: UserId,
    #[serde(default)]
    pub fk_proveedor: Option<SupplierId>,
    #[serde(default, with = "lenient")]
    pub fecha_movimiento: Option<NaiveDateTime>,
}

impl Movement {
    /// Whether the before/after quantities the backend reported agree with
    /// the movement's type and size. Never used to recompute anything.
    /// Values that overflow `i64` are never consistent.
    pub fn is_consistent(&self) -> bool {
        let Some(delta) = self.cantidad_nueva.checked_sub(self.cantidad_anterior) else {
            return false;
        };
        match self.tipo_movimiento.effect() {
            StockEffect::Increase => delta == self.cantidad,
            StockEffect::Decrease => self.cantidad.checked_neg() == Some(delta),
            StockEffect::Correction => delta.checked_abs() == Some(self.cantidad),
        }
    }
}

impl Entity for Movement {
    type Id = MovementId;

    fn id(&self) -> MovementId {
        self.id
    }
}

/// Body of `POST /movimientos`.
///
/// `fk_proveedor` is always serialized (as `null` outside entradas).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMovement {
    pub fk_producto: ProductId,
    pub fk_almacen: WarehouseId,
    pub tipo_movimiento: MovementType,
    pub cantidad: i64,
    pub motivo: Option<String>,
    pub fk_usuario: UserId,
    pub fk_proveedor: Option<SupplierId>,
}

/// Movement form as the user filled it in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovementDraft {
    pub fk_producto: Option<ProductId>,
    pub fk_almacen: Option<WarehouseId>,
    pub tipo_movimiento: Option<MovementType>,
    /// Raw quantity text; coerced with [`coerce_quantity`].
    pub cantidad: String,
    pub motivo: String,
    pub fk_proveedor: Option<SupplierId>,
}

impl MovementDraft {
    /// Turn the form into a submission on behalf of `fk_usuario`.
    ///
    /// An entrada without a supplier is rejected before anything else is
    /// looked at.
    pub fn validate(self, fk_usuario: UserId) -> DomainResult<NewMovement> {
        if self.tipo_movimiento == Some(MovementType::Entrada) && self.fk_proveedor.is_none() {
            return Err(DomainError::validation(ENTRADA_REQUIRES_SUPPLIER));
        }

        let fk_producto = self
            .fk_producto
            .ok_or_else(|| DomainError::validation("a product is required"))?;
        let fk_almacen = self
            .fk_almacen
            .ok_or_else(|| DomainError::validation("a warehouse is required"))?;
        let tipo_movimiento = self
            .tipo_movimiento
            .ok_or_else(|| DomainError::validation("a movement type is required"))?;
        let cantidad = coerce_quantity(&self.cantidad)?;

        let motivo = match self.motivo.trim() {
            "" => None,
            m => Some(m.to_string()),
        };

        let fk_proveedor = if tipo_movimiento.requires_supplier() {
            self.fk_proveedor
        } else {
            None
        };

        Ok(NewMovement {
            fk_producto,
            fk_almacen,
            tipo_movimiento,
            cantidad,
            motivo,
            fk_usuario,
            fk_proveedor,
        })
    }
}

/// Coerce form text to a positive integer, reading the leading integer the
/// way HTML number inputs are usually parsed (`"12abc"` and `"12.9"` are 12).
pub fn coerce_quantity(raw: &str) -> DomainResult<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits.bytes().take_while(u8::is_ascii_digit).count();
    if end == 0 {
        return Err(DomainError::validation("cantidad must be a positive integer"));
    }

    let value = digits[..end]
        .parse::<i64>()
        .map_err(|_| DomainError::validation("cantidad is too large"))?;

    if negative || value == 0 {
        return Err(DomainError::validation("cantidad must be greater than zero"));
    }
    Ok(value)
}

/// Per-type counters over a movement list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MovementStats {
    pub total: usize,
    pub entradas: usize,
    pub salidas: usize,
    pub ajustes: usize,
    pub devoluciones: usize,
}

impl MovementStats {
    pub fn from_movements(movements: &[Movement]) -> Self {
        movements.iter().fold(Self::default(), |mut acc, m| {
            acc.total += 1;
            match m.tipo_movimiento {
                MovementType::Entrada => acc.entradas += 1,
                MovementType::Salida => acc.salidas += 1,
                MovementType::Ajuste => acc.ajustes += 1,
                MovementType::Devolucion => acc.devoluciones += 1,
            }
            acc
        })
    }
}
