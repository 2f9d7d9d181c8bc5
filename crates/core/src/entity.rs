//! Entity traits: identity, soft-delete lifecycle and display labels.

/// Label rendered when a reference does not resolve in the cached catalog.
pub const UNKNOWN_LABEL: &str = "Desconocido";

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;
}

/// Records that are never hard-deleted: deletion flips an `activo`/`activa`
/// flag and restore flips it back.
pub trait SoftDelete {
    fn is_active(&self) -> bool;

    fn set_active(&mut self, active: bool);

    /// Copy of `self` in the deleted state. Nothing but the flag changes.
    fn soft_deleted(&self) -> Self
    where
        Self: Clone,
    {
        let mut next = self.clone();
        next.set_active(false);
        next
    }

    /// Copy of `self` in the active state. Nothing but the flag changes.
    fn restored(&self) -> Self
    where
        Self: Clone,
    {
        let mut next = self.clone();
        next.set_active(true);
        next
    }
}

/// Human-readable name of a record, used when other records reference it.
pub trait Labeled {
    fn label(&self) -> &str;
}

/// Resolve `id` against a locally cached catalog.
///
/// A dangling reference is not an error: it renders as [`UNKNOWN_LABEL`].
pub fn label_or_unknown<T>(catalog: &[T], id: T::Id) -> &str
where
    T: Entity + Labeled,
{
    catalog
        .iter()
        .find(|item| item.id() == id)
        .map(Labeled::label)
        .unwrap_or(UNKNOWN_LABEL)
}
