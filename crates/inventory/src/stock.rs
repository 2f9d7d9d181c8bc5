use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

use inventario_core::datetime::lenient;
use inventario_core::{DomainError, DomainResult, Entity, ProductId, StockEntryId, WarehouseId};

/// Stock of one product in one warehouse (`GET /stock_almacen`).
///
/// At most one row exists per `(fk_producto, fk_almacen)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockEntry {
    pub id: StockEntryId,
    pub fk_producto: ProductId,
    pub fk_almacen: WarehouseId,
    pub cantidad_disponible: i64,
    pub cantidad_reservada: i64,
    #[serde(default, with = "lenient")]
    pub fecha_ultima_actualizacion: Option<NaiveDateTime>,
}

impl StockEntry {
    pub fn pair(&self) -> (ProductId, WarehouseId) {
        (self.fk_producto, self.fk_almacen)
    }
}

impl Entity for StockEntry {
    type Id = StockEntryId;

    fn id(&self) -> StockEntryId {
        self.id
    }
}

/// Body of `POST /stock_almacen` and `PUT /stock_almacen/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockInput {
    pub fk_producto: ProductId,
    pub fk_almacen: WarehouseId,
    pub cantidad_disponible: i64,
    pub cantidad_reservada: i64,
}

impl StockInput {
    /// Quantities are never negative.
    pub fn validate(&self) -> DomainResult<()> {
        if self.cantidad_disponible < 0 {
            return Err(DomainError::validation("cantidad_disponible cannot be negative"));
        }
        if self.cantidad_reservada < 0 {
            return Err(DomainError::validation("cantidad_reservada cannot be negative"));
        }
        Ok(())
    }

    pub fn pair(&self) -> (ProductId, WarehouseId) {
        (self.fk_producto, self.fk_almacen)
    }
}

/// Reject an input that would create a second row for an existing pair.
///
/// `editing` is the row being updated, which may keep its own pair.
pub fn ensure_unique_pair(
    existing: &[StockEntry],
    input: &StockInput,
    editing: Option<StockEntryId>,
) -> DomainResult<()> {
    let clash = existing
        .iter()
        .find(|e| e.pair() == input.pair() && Some(e.id) != editing);

    match clash {
        Some(e) => Err(DomainError::conflict(format!(
            "product {} already has stock row {} in warehouse {}",
            input.fk_producto, e.id, input.fk_almacen
        ))),
        None => Ok(()),
    }
}

/// Total available units of a product across warehouses
/// (`GET /stock_almacen/por_producto`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductStockTotal {
    pub fk_producto: ProductId,
    #[serde(deserialize_with = "quantity")]
    pub total_disponible: i64,
}

/// Row of the per-warehouse and per-product stock views
/// (`/stock_almacen/por_almacen/{id}`, `/stock_almacen/producto/{id}`).
///
/// Those endpoints join different columns depending on the view, so every
/// field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLine {
    #[serde(default)]
    pub id: Option<StockEntryId>,
    #[serde(default)]
    pub fk_producto: Option<ProductId>,
    #[serde(default)]
    pub fk_almacen: Option<WarehouseId>,
    #[serde(default)]
    pub codigo_producto: Option<String>,
    #[serde(default)]
    pub nombre_producto: Option<String>,
    #[serde(default, deserialize_with = "quantity")]
    pub cantidad_disponible: i64,
    #[serde(default, deserialize_with = "quantity")]
    pub cantidad_reservada: i64,
    #[serde(default, deserialize_with = "optional_quantity")]
    pub total_disponible: Option<i64>,
    #[serde(default, with = "lenient")]
    pub fecha_ultima_actualizacion: Option<NaiveDateTime>,
}

/// Aggregated columns come back as integers, floats or decimal strings
/// depending on the database driver.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawQuantity {
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawQuantity {
    fn into_i64<E: serde::de::Error>(self) -> Result<i64, E> {
        match self {
            RawQuantity::Int(v) => Ok(v),
            RawQuantity::Float(v) => Ok(v.trunc() as i64),
            RawQuantity::Text(s) => s
                .trim()
                .parse::<f64>()
                .map(|v| v.trunc() as i64)
                .map_err(|_| E::custom(format!("invalid quantity '{s}'"))),
        }
    }
}

fn quantity<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawQuantity>::deserialize(deserializer)? {
        Some(raw) => raw.into_i64(),
        None => Ok(0),
    }
}

fn optional_quantity<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<RawQuantity>::deserialize(deserializer)?
        .map(RawQuantity::into_i64)
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: i64, producto: i64, almacen: i64) -> StockEntry {
        StockEntry {
            id: StockEntryId::new(id),
            fk_producto: ProductId::new(producto),
            fk_almacen: WarehouseId::new(almacen),
            cantidad_disponible: 10,
            cantidad_reservada: 0,
            fecha_ultima_actualizacion: None,
        }
    }

    fn input(producto: i64, almacen: i64) -> StockInput {
        StockInput {
            fk_producto: ProductId::new(producto),
            fk_almacen: WarehouseId::new(almacen),
            cantidad_disponible: 5,
            cantidad_reservada: 1,
        }
    }

    #[test]
    fn duplicate_pair_is_a_conflict() {
        let existing = vec![entry(1, 10, 1), entry(2, 11, 1)];
        assert!(matches!(
            ensure_unique_pair(&existing, &input(10, 1), None),
            Err(DomainError::Conflict(_))
        ));
        assert!(ensure_unique_pair(&existing, &input(10, 2), None).is_ok());
    }

    #[test]
    fn updating_a_row_may_keep_its_pair() {
        let existing = vec![entry(1, 10, 1)];
        assert!(ensure_unique_pair(&existing, &input(10, 1), Some(StockEntryId::new(1))).is_ok());
        assert!(ensure_unique_pair(&existing, &input(10, 1), Some(StockEntryId::new(2))).is_err());
    }

    #[test]
    fn negative_quantities_are_rejected() {
        let mut i = input(1, 1);
        assert!(i.validate().is_ok());
        i.cantidad_reservada = -1;
        assert!(matches!(i.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn totals_accept_decimal_encodings() {
        let rows: Vec<ProductStockTotal> = serde_json::from_str(
            r#"[{"fk_producto":1,"total_disponible":12},{"fk_producto":2,"total_disponible":"7.0"},{"fk_producto":3,"total_disponible":3.0}]"#,
        )
        .unwrap();
        let totals: Vec<i64> = rows.iter().map(|r| r.total_disponible).collect();
        assert_eq!(totals, vec![12, 7, 3]);
    }

    #[test]
    fn stock_lines_tolerate_partial_columns() {
        let line: StockLine = serde_json::from_str(
            r#"{"codigo_producto":"P-1","nombre_producto":"Tornillo","cantidad_disponible":4,"cantidad_reservada":null}"#,
        )
        .unwrap();
        assert_eq!(line.cantidad_disponible, 4);
        assert_eq!(line.cantidad_reservada, 0);
        assert!(line.fk_producto.is_none());
        assert!(line.total_disponible.is_none());
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn a_pair_already_loaded_is_always_refused_on_create(
                pairs in proptest::collection::vec((1i64..20, 1i64..5), 1..30),
                pick in any::<proptest::sample::Index>(),
            ) {
                let existing: Vec<StockEntry> = pairs
                    .iter()
                    .enumerate()
                    .map(|(i, (p, a))| entry(i as i64 + 1, *p, *a))
                    .collect();
                let (p, a) = pairs[pick.index(pairs.len())];
                prop_assert!(ensure_unique_pair(&existing, &input(p, a), None).is_err());

                let fresh_product = 100;
                prop_assert!(ensure_unique_pair(&existing, &input(fresh_product, a), None).is_ok());
            }

            #[test]
            fn non_negative_quantities_validate(disponible in 0i64..=i64::MAX, reservada in 0i64..=i64::MAX) {
                let mut i = input(1, 1);
                i.cantidad_disponible = disponible;
                i.cantidad_reservada = reservada;
                prop_assert!(i.validate().is_ok());
            }
        }
    }
}
