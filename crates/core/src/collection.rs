//! Collection helpers shared by the list screens.

use std::collections::HashMap;

use crate::entity::Entity;

/// Union of `primary` and `secondary` by primary key, last write wins.
///
/// Admin screens fetch active and soft-deleted records in two requests and
/// show them as one list. Ids are unique per entity, so a collision only
/// happens when the backend answers inconsistently; the later record then
/// replaces the earlier one in place (first-seen position is kept).
pub fn merge_by_id<T>(primary: Vec<T>, secondary: Vec<T>) -> Vec<T>
where
    T: Entity,
{
    let mut merged: Vec<T> = Vec::with_capacity(primary.len() + secondary.len());
    let mut index: HashMap<T::Id, usize> = HashMap::new();

    for item in primary.into_iter().chain(secondary) {
        match index.get(&item.id()) {
            Some(&pos) => merged[pos] = item,
            None => {
                index.insert(item.id(), merged.len());
                merged.push(item);
            }
        }
    }

    merged
}
