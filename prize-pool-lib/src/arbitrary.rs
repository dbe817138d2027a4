//! proptest strategies for prize pools, shared with dependent crates through
//! the `proptest` feature.

use crate::{PrizeEntry, PrizePool, Weight};
use proptest::collection::vec;
use proptest::prelude::*;

pub fn weight() -> impl Strategy<Value = Weight> {
    prop_oneof![
        1 => Just(0.0),
        3 => (1u32..100).prop_map(Weight::from),
        2 => 0.001f64..1000.0,
    ]
}

pub fn prize_entry() -> impl Strategy<Value = PrizeEntry> {
    (
        "p[0-9]{2}",
        "[a-zA-Z ]{0,12}",
        "[a-zA-Z ]{0,24}",
        weight(),
        any::<bool>(),
    )
        .prop_map(|(id, name, detail, weight, enabled)| PrizeEntry {
            id,
            name,
            detail,
            weight,
            enabled,
        })
}

/// An entry guaranteed to be drawable.
pub fn candidate() -> impl Strategy<Value = PrizeEntry> {
    (prize_entry(), "[a-zA-Z]{1,12}", (1u32..100).prop_map(Weight::from)).prop_map(
        |(entry, name, weight)| PrizeEntry {
            name,
            weight,
            enabled: true,
            ..entry
        },
    )
}

pub fn prize_pool() -> impl Strategy<Value = PrizePool> {
    vec(prize_entry(), 0..16).prop_map(PrizePool::from)
}

pub fn prize_pool_of_size(size: usize) -> impl Strategy<Value = PrizePool> {
    vec(prize_entry(), size).prop_map(PrizePool::from)
}

/// A pool holding at least one candidate, mixed with arbitrary entries.
pub fn drawable_pool() -> impl Strategy<Value = PrizePool> {
    (vec(prize_entry(), 0..8), candidate(), vec(prize_entry(), 0..8)).prop_map(
        |(mut head, candidate, tail)| {
            head.push(candidate);
            head.extend(tail);
            PrizePool::from(head)
        },
    )
}
