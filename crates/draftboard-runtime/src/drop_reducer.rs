#![forbid(unsafe_code)]

//! Drop reducer: drag payload in, bucketed draft mutation out.
//!
//! ```text
//! raw payload ──parse_transfer──► Absent     ──► NoPayload
//!                               ├► Malformed  ──► Malformed (warn logged)
//!                               └► Valid ──no items──────► NoPayload
//!                                        └─with_dropped──► None    ──► Duplicate
//!                                                        └► Some(b) ──► Applied(b)
//! ```
//!
//! Only [`DropReduction::Applied`] should be pushed onto history.

use draftboard_core::{Buckets, Tier, TransferError, TransferParse, parse_transfer};

/// Result of reducing one drop event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReduction {
    /// At least one item was new; the next snapshot.
    Applied(Buckets),
    /// Every dropped item was already present in some tier.
    Duplicate,
    /// The drop carried no payload, or a list of zero items.
    NoPayload,
    /// The payload could not be decoded.
    Malformed(TransferError),
}

impl DropReduction {
    /// Whether this reduction produced a new snapshot.
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// Reduce a drop of `payload` onto `target`.
#[must_use]
pub fn reduce_drop(buckets: &Buckets, target: Tier, payload: Option<&str>) -> DropReduction {
    match parse_transfer(payload) {
        TransferParse::Absent => {
            tracing::debug!(target: "draftboard.drop", tier = %target, "drop without payload ignored");
            DropReduction::NoPayload
        }
        TransferParse::Malformed(err) => {
            tracing::warn!(
                target: "draftboard.drop",
                tier = %target,
                error = %err,
                "malformed drop payload rejected"
            );
            DropReduction::Malformed(err)
        }
        TransferParse::Valid(payload) => {
            let items = payload.into_items();
            if items.is_empty() {
                tracing::debug!(target: "draftboard.drop", tier = %target, "drop without items ignored");
                return DropReduction::NoPayload;
            }
            match buckets.with_dropped(target, &items) {
                Some(next) => {
                    tracing::debug!(
                        target: "draftboard.drop",
                        tier = %target,
                        incoming = items.len(),
                        added = next.total_items() - buckets.total_items(),
                        "items dropped"
                    );
                    DropReduction::Applied(next)
                }
                None => {
                    tracing::debug!(
                        target: "draftboard.drop",
                        tier = %target,
                        incoming = items.len(),
                        "duplicate drop ignored"
                    );
                    DropReduction::Duplicate
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAIR: &str = r#"{"kind":"list","items":[{"id":5,"name":"a"},{"id":7,"name":"b"}]}"#;

    #[test]
    fn valid_list_applies() {
        let DropReduction::Applied(next) = reduce_drop(&Buckets::new(), Tier::Rare, Some(PAIR)) else {
            panic!("expected applied drop");
        };
        let ids: Vec<u64> = next.items(Tier::Rare).iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![5, 7]);
    }

    #[test]
    fn second_identical_drop_is_duplicate() {
        let DropReduction::Applied(once) = reduce_drop(&Buckets::new(), Tier::Rare, Some(PAIR)) else {
            panic!("expected applied drop");
        };
        assert_eq!(reduce_drop(&once, Tier::Rare, Some(PAIR)), DropReduction::Duplicate);
    }

    #[test]
    fn single_payload_applies() {
        let raw = r#"{"kind":"single","item":{"id":3,"name":"c"}}"#;
        let reduction = reduce_drop(&Buckets::new(), Tier::Epic, Some(raw));
        assert!(reduction.is_applied());
    }

    #[test]
    fn empty_list_is_a_no_op() {
        let raw = r#"{"kind":"list","items":[]}"#;
        assert_eq!(reduce_drop(&Buckets::new(), Tier::Rare, Some(raw)), DropReduction::NoPayload);
    }

    #[test]
    fn absent_and_malformed_do_not_apply() {
        assert_eq!(reduce_drop(&Buckets::new(), Tier::Rare, None), DropReduction::NoPayload);
        assert!(matches!(
            reduce_drop(&Buckets::new(), Tier::Rare, Some("[1,2")),
            DropReduction::Malformed(_)
        ));
    }
}
