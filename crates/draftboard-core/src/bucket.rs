#![forbid(unsafe_code)]

//! Bucketed selection draft: items grouped under fixed rarity tiers.
//!
//! [`Buckets`] maps every [`Tier`] to an ordered list of [`BucketItem`]s.
//! An item's `rank` is derived from the tier it was inserted into, never
//! from whatever the incoming descriptor carried.
//!
//! # Invariants
//!
//! 1. Every tier has an entry (possibly empty).
//! 2. An item id appears at most once across all tiers when items only
//!    enter through [`Buckets::with_dropped`].
//! 3. Every item's `rank` equals the rank of the tier holding it.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::equality::{SnapshotEq, ordered_ids_equal};

/// Fixed category enumeration, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Tier {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Tier {
    /// All tiers, lowest first.
    pub const ALL: [Self; 5] = [
        Self::Common,
        Self::Uncommon,
        Self::Rare,
        Self::Epic,
        Self::Legendary,
    ];

    /// Rank assigned to items placed in this tier (1 = lowest).
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Common => 1,
            Self::Uncommon => 2,
            Self::Rare => 3,
            Self::Epic => 4,
            Self::Legendary => 5,
        }
    }

    /// Wire name of the tier.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Common => "COMMON",
            Self::Uncommon => "UNCOMMON",
            Self::Rare => "RARE",
            Self::Epic => "EPIC",
            Self::Legendary => "LEGENDARY",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// External item identity plus minimal display fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDescriptor {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

impl ItemDescriptor {
    #[must_use]
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            thumbnail: None,
        }
    }
}

/// An item placed in a tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketItem {
    pub id: u64,
    pub name: String,
    pub thumbnail: Option<String>,
    /// Rank of the tier the item was inserted into.
    pub rank: u8,
}

impl BucketItem {
    /// Place `descriptor` into `tier`, deriving the rank from the tier.
    #[must_use]
    pub fn placed(descriptor: &ItemDescriptor, tier: Tier) -> Self {
        Self {
            id: descriptor.id,
            name: descriptor.name.clone(),
            thumbnail: descriptor.thumbnail.clone(),
            rank: tier.rank(),
        }
    }
}

/// Tier-bucketed item lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buckets {
    tiers: BTreeMap<Tier, Vec<BucketItem>>,
}

impl Default for Buckets {
    fn default() -> Self {
        Self {
            tiers: Tier::ALL.into_iter().map(|tier| (tier, Vec::new())).collect(),
        }
    }
}

impl Buckets {
    /// Every tier empty.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a baseline from a loaded record.
    ///
    /// Assignments are applied in order; later duplicates of an id already
    /// placed are skipped.
    #[must_use]
    pub fn from_assignments<I>(assignments: I) -> Self
    where
        I: IntoIterator<Item = (Tier, Vec<ItemDescriptor>)>,
    {
        let mut buckets = Self::default();
        let mut seen = BTreeSet::new();
        for (tier, descriptors) in assignments {
            let list = buckets.tiers.entry(tier).or_default();
            for descriptor in descriptors {
                if seen.insert(descriptor.id) {
                    list.push(BucketItem::placed(&descriptor, tier));
                }
            }
        }
        buckets
    }

    // ====================================================================
    // Query
    // ====================================================================

    /// Items in `tier`, in display order.
    #[must_use]
    pub fn items(&self, tier: Tier) -> &[BucketItem] {
        self.tiers.get(&tier).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterate tiers in display order with their items.
    pub fn iter(&self) -> impl Iterator<Item = (Tier, &[BucketItem])> {
        self.tiers.iter().map(|(tier, items)| (*tier, items.as_slice()))
    }

    /// Tier currently holding item `id`.
    #[must_use]
    pub fn locate(&self, id: u64) -> Option<Tier> {
        self.iter()
            .find(|(_, items)| items.iter().any(|item| item.id == id))
            .map(|(tier, _)| tier)
    }

    #[must_use]
    pub fn contains(&self, id: u64) -> bool {
        self.locate(id).is_some()
    }

    /// Item count across all tiers.
    #[must_use]
    pub fn total_items(&self) -> usize {
        self.tiers.values().map(Vec::len).sum()
    }

    // ====================================================================
    // Operators
    // ====================================================================

    /// Remove item `id` from `tier`.
    ///
    /// Always returns a new snapshot, even when nothing matched.
    #[must_use]
    pub fn without_item(&self, tier: Tier, id: u64) -> Self {
        let mut next = self.clone();
        if let Some(list) = next.tiers.get_mut(&tier) {
            list.retain(|item| item.id != id);
        }
        next
    }

    /// Append every incoming item not already present in any tier.
    ///
    /// Returns `None` when every incoming id was already present, so the
    /// caller records no history entry.
    #[must_use]
    pub fn with_dropped(&self, target: Tier, incoming: &[ItemDescriptor]) -> Option<Self> {
        let mut present: BTreeSet<u64> = self
            .tiers
            .values()
            .flat_map(|items| items.iter().map(|item| item.id))
            .collect();

        let fresh: Vec<BucketItem> = incoming
            .iter()
            .filter(|descriptor| present.insert(descriptor.id))
            .map(|descriptor| BucketItem::placed(descriptor, target))
            .collect();

        if fresh.is_empty() {
            return None;
        }

        let mut next = self.clone();
        next.tiers.entry(target).or_default().extend(fresh);
        Some(next)
    }
}

impl SnapshotEq for Buckets {
    fn snapshot_eq(&self, other: &Self) -> bool {
        if self.tiers.len() != other.tiers.len() {
            return false;
        }
        self.tiers.iter().all(|(tier, items)| match other.tiers.get(tier) {
            Some(theirs) => ordered_ids_equal(items, theirs, |item| item.id),
            None => false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(buckets: &Buckets, tier: Tier) -> Vec<u64> {
        buckets.items(tier).iter().map(|item| item.id).collect()
    }

    #[test]
    fn new_has_every_tier_empty() {
        let buckets = Buckets::new();
        assert_eq!(buckets.iter().count(), 5);
        assert_eq!(buckets.total_items(), 0);
    }

    #[test]
    fn drop_into_empty_tier_appends_in_order() {
        let buckets = Buckets::new();
        let next = buckets
            .with_dropped(Tier::Rare, &[ItemDescriptor::new(5, "a"), ItemDescriptor::new(7, "b")])
            .unwrap();
        assert_eq!(ids(&next, Tier::Rare), vec![5, 7]);
        assert!(next.items(Tier::Rare).iter().all(|item| item.rank == Tier::Rare.rank()));
    }

    #[test]
    fn rank_follows_target_not_origin() {
        let buckets = Buckets::new();
        let next = buckets
            .with_dropped(Tier::Legendary, &[ItemDescriptor::new(1, "a")])
            .unwrap();
        assert_eq!(next.items(Tier::Legendary)[0].rank, 5);
    }

    #[test]
    fn duplicate_drop_is_none() {
        let incoming = [ItemDescriptor::new(5, "a"), ItemDescriptor::new(7, "b")];
        let once = Buckets::new().with_dropped(Tier::Rare, &incoming).unwrap();
        assert!(once.with_dropped(Tier::Rare, &incoming).is_none());
        assert!(once.with_dropped(Tier::Epic, &incoming).is_none());
    }

    #[test]
    fn partial_duplicate_adds_only_new_items() {
        let once = Buckets::new()
            .with_dropped(Tier::Common, &[ItemDescriptor::new(1, "a")])
            .unwrap();
        let next = once
            .with_dropped(Tier::Rare, &[ItemDescriptor::new(1, "a"), ItemDescriptor::new(2, "b")])
            .unwrap();
        assert_eq!(ids(&next, Tier::Common), vec![1]);
        assert_eq!(ids(&next, Tier::Rare), vec![2]);
    }

    #[test]
    fn repeated_id_within_one_drop_is_inserted_once() {
        let next = Buckets::new()
            .with_dropped(Tier::Epic, &[ItemDescriptor::new(9, "a"), ItemDescriptor::new(9, "a")])
            .unwrap();
        assert_eq!(ids(&next, Tier::Epic), vec![9]);
    }

    #[test]
    fn remove_item_filters_only_that_tier() {
        let buckets = Buckets::from_assignments([
            (Tier::Rare, vec![ItemDescriptor::new(5, "a"), ItemDescriptor::new(7, "b")]),
            (Tier::Common, vec![ItemDescriptor::new(8, "c")]),
        ]);
        let next = buckets.without_item(Tier::Rare, 5);
        assert_eq!(ids(&next, Tier::Rare), vec![7]);
        assert_eq!(ids(&next, Tier::Common), vec![8]);

        let untouched = buckets.without_item(Tier::Common, 5);
        assert_eq!(untouched, buckets);
    }

    #[test]
    fn locate_finds_owning_tier() {
        let buckets = Buckets::from_assignments([(Tier::Epic, vec![ItemDescriptor::new(3, "x")])]);
        assert_eq!(buckets.locate(3), Some(Tier::Epic));
        assert_eq!(buckets.locate(4), None);
    }

    #[test]
    fn snapshot_eq_is_order_sensitive_and_ignores_names() {
        let a = Buckets::from_assignments([(
            Tier::Rare,
            vec![ItemDescriptor::new(1, "a"), ItemDescriptor::new(2, "b")],
        )]);
        let renamed = Buckets::from_assignments([(
            Tier::Rare,
            vec![ItemDescriptor::new(1, "renamed"), ItemDescriptor::new(2, "b")],
        )]);
        let swapped = Buckets::from_assignments([(
            Tier::Rare,
            vec![ItemDescriptor::new(2, "b"), ItemDescriptor::new(1, "a")],
        )]);
        assert!(a.snapshot_eq(&renamed));
        assert!(!a.snapshot_eq(&swapped));
    }

    #[test]
    fn from_assignments_skips_duplicate_ids() {
        let buckets = Buckets::from_assignments([
            (Tier::Common, vec![ItemDescriptor::new(1, "a")]),
            (Tier::Rare, vec![ItemDescriptor::new(1, "a")]),
        ]);
        assert_eq!(buckets.total_items(), 1);
        assert_eq!(buckets.locate(1), Some(Tier::Common));
    }

    #[test]
    fn tier_serializes_screaming_snake() {
        let json = serde_json::to_string(&Tier::Legendary).unwrap();
        assert_eq!(json, "\"LEGENDARY\"");
        let tier: Tier = serde_json::from_str("\"UNCOMMON\"").unwrap();
        assert_eq!(tier, Tier::Uncommon);
    }
}
