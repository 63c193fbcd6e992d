#![forbid(unsafe_code)]

//! Deep content equality for draft snapshots.
//!
//! The dirty check compares the current snapshot against the baseline by
//! value. Snapshots are shared through `Arc`, so two snapshots can be equal
//! in content while being distinct allocations, and the reverse never
//! happens. [`SnapshotEq`] states which parts of a snapshot count as content.
//!
//! Sets compare order-insensitively. Bucket lists compare by item id in
//! order; display fields are ignored.

use std::collections::{BTreeMap, BTreeSet};

/// Content equality between two versions of the same draft.
pub trait SnapshotEq {
    /// Returns `true` when both snapshots hold the same draft content.
    fn snapshot_eq(&self, other: &Self) -> bool;
}

/// Same size and same members.
#[must_use]
pub fn sets_equal<T: Ord>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> bool {
    a.len() == b.len() && a.iter().all(|member| b.contains(member))
}

/// Same key set, and for every key the value sets are [`sets_equal`].
#[must_use]
pub fn set_maps_equal<K: Ord, V: Ord>(
    a: &BTreeMap<K, BTreeSet<V>>,
    b: &BTreeMap<K, BTreeSet<V>>,
) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().all(|(key, left)| match b.get(key) {
        Some(right) => sets_equal(left, right),
        None => false,
    })
}

/// Same length and the same ids at every position.
#[must_use]
pub fn ordered_ids_equal<T, I, F>(a: &[T], b: &[T], id_of: F) -> bool
where
    I: PartialEq,
    F: Fn(&T) -> I,
{
    a.len() == b.len() && a.iter().zip(b).all(|(left, right)| id_of(left) == id_of(right))
}

macro_rules! impl_scalar_snapshot_eq {
    ($($ty:ty),* $(,)?) => {
        $(
            impl SnapshotEq for $ty {
                fn snapshot_eq(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

impl_scalar_snapshot_eq!(bool, i32, i64, u32, u64, usize, String);

impl<T: SnapshotEq> SnapshotEq for std::sync::Arc<T> {
    fn snapshot_eq(&self, other: &Self) -> bool {
        std::sync::Arc::ptr_eq(self, other) || (**self).snapshot_eq(other)
    }
}
