mod defaults;
pub mod lenient;
mod raw;

#[cfg(any(test, feature = "proptest"))]
pub mod arbitrary;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

pub use defaults::{default_pool, DEFAULT_POOL_SIZE};
pub use raw::{normalize_entry, RawPrizeEntry};

pub type PrizeId = String;
pub type Weight = f64;

/// Maximum length of the participant-facing prize name, counted in Unicode
/// scalar values. Browser-era data was cut at 36 UTF-16 units, so names with
/// astral characters (most emoji) may keep a few more characters here.
pub const NAME_MAX_CHARS: usize = 36;
/// Maximum length of the host-only prize detail, counted like
/// [`NAME_MAX_CHARS`].
pub const DETAIL_MAX_CHARS: usize = 240;

/// Largest weight a single prize may carry. Keeps the total weight of any
/// pool finite, so every draw lands in a real interval.
pub const MAX_WEIGHT: Weight = 1e12;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PrizeEntry {
    pub id: PrizeId,
    /// Shown to the participant after a draw.
    pub name: String,
    /// Only visible to the host, copied into the draw record.
    pub detail: String,
    /// Relative selection weight. Normalized entries always carry a finite,
    /// non-negative value; 0 makes the entry undrawable.
    pub weight: Weight,
    pub enabled: bool,
}

impl PrizeEntry {
    /// An entry takes part in a draw only when it is enabled, carries a
    /// positive weight and has a non blank name.
    pub fn is_drawable(&self) -> bool {
        self.enabled && self.weight > 0.0 && !self.name.trim().is_empty()
    }
}

/// Whether a loaded pool came from storage or had to be replaced by the
/// default one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PoolOrigin {
    Stored,
    Defaults,
}

/// Ordered collection of prizes, drawable and non drawable alike.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(transparent)]
pub struct PrizePool(Vec<PrizeEntry>);

impl PrizePool {
    /// Build a pool from whatever was found in storage.
    ///
    /// Anything that is not an array holding exactly [`DEFAULT_POOL_SIZE`]
    /// items is discarded in favour of the default pool, otherwise every
    /// item goes through [`normalize_entry`] using the default prize in the
    /// same slot as fallback.
    pub fn from_stored(stored: Option<Value>) -> (Self, PoolOrigin) {
        match stored {
            Some(Value::Array(items)) if items.len() == DEFAULT_POOL_SIZE => {
                let entries = items
                    .into_iter()
                    .enumerate()
                    .map(|(index, item)| normalize_entry(RawPrizeEntry::from_value(item), index))
                    .collect();
                (Self(entries), PoolOrigin::Stored)
            }
            other => {
                if other.is_some() {
                    warn!("stored prize pool has an unexpected shape, using defaults");
                }
                (default_pool(), PoolOrigin::Defaults)
            }
        }
    }

    /// Re-run normalization over an already typed pool, e.g. after the host
    /// edited it.
    pub fn normalized(self) -> Self {
        Self(
            self.0
                .into_iter()
                .enumerate()
                .map(|(index, entry)| normalize_entry(RawPrizeEntry::from(entry), index))
                .collect(),
        )
    }

    pub fn entries(&self) -> &[PrizeEntry] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PrizeEntry> {
        self.0.get(index)
    }

    pub fn candidates(&self) -> impl Iterator<Item = &PrizeEntry> {
        self.0.iter().filter(|entry| entry.is_drawable())
    }

    pub fn is_drawable(&self) -> bool {
        self.candidates().next().is_some()
    }

    pub fn total_weight(&self) -> Weight {
        self.candidates().map(|entry| entry.weight).sum()
    }

    pub fn into_inner(self) -> Vec<PrizeEntry> {
        self.0
    }
}

impl From<Vec<PrizeEntry>> for PrizePool {
    fn from(from: Vec<PrizeEntry>) -> Self {
        Self(from)
    }
}

impl AsRef<[PrizeEntry]> for PrizePool {
    fn as_ref(&self) -> &[PrizeEntry] {
        &self.0
    }
}

/// Keep at most `max` chars of `text`.
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arbitrary;
    use serde_json::json;
    use serde_test::{assert_tokens, Token};
    use test_strategy::proptest;

    fn entry(id: &str, name: &str, weight: Weight, enabled: bool) -> PrizeEntry {
        PrizeEntry {
            id: id.to_string(),
            name: name.to_string(),
            detail: String::new(),
            weight,
            enabled,
        }
    }

    #[test]
    fn drawable_requires_all_three_conditions() {
        assert!(entry("a", "A", 1.0, true).is_drawable());
        assert!(!entry("a", "A", 1.0, false).is_drawable());
        assert!(!entry("a", "A", 0.0, true).is_drawable());
        assert!(!entry("a", "   ", 1.0, true).is_drawable());
    }

    #[test]
    fn missing_or_malformed_storage_falls_back_to_defaults() {
        for stored in [
            None,
            Some(json!({"id": "p01"})),
            Some(json!([])),
            Some(json!([{"id": "p01"}])),
        ] {
            let (pool, origin) = PrizePool::from_stored(stored);
            assert_eq!(origin, PoolOrigin::Defaults);
            assert_eq!(pool, default_pool());
        }
    }

    #[test]
    fn stored_pool_is_normalized_slot_by_slot() {
        let mut items: Vec<Value> = default_pool()
            .entries()
            .iter()
            .map(|e| serde_json::to_value(e).unwrap())
            .collect();
        items[3] = json!({"id": "", "name": "Lantern", "weight": "-4", "enabled": false});
        items[7] = json!(42);

        let (pool, origin) = PrizePool::from_stored(Some(Value::Array(items)));
        assert_eq!(origin, PoolOrigin::Stored);

        let defaults = default_pool();
        let slot3 = pool.get(3).unwrap();
        assert_eq!(slot3.id, defaults.get(3).unwrap().id);
        assert_eq!(slot3.name, "Lantern");
        assert_eq!(slot3.detail, defaults.get(3).unwrap().detail);
        assert_eq!(slot3.weight, defaults.get(3).unwrap().weight);
        assert!(!slot3.enabled);

        assert_eq!(pool.get(7), defaults.get(7));
    }

    #[test]
    fn total_weight_only_counts_candidates() {
        let pool = PrizePool::from(vec![
            entry("a", "A", 1.0, true),
            entry("b", "B", 3.0, true),
            entry("c", "C", 5.0, false),
            entry("d", "", 7.0, true),
        ]);
        assert_eq!(pool.total_weight(), 4.0);
        assert_eq!(pool.candidates().count(), 2);
    }

    #[test]
    fn entry_serializes_with_stored_field_names() {
        assert_tokens(
            &entry("p01", "A", 2.0, true),
            &[
                Token::Struct {
                    name: "PrizeEntry",
                    len: 5,
                },
                Token::Str("id"),
                Token::Str("p01"),
                Token::Str("name"),
                Token::Str("A"),
                Token::Str("detail"),
                Token::Str(""),
                Token::Str("weight"),
                Token::F64(2.0),
                Token::Str("enabled"),
                Token::Bool(true),
                Token::StructEnd,
            ],
        );
    }

    #[test]
    fn truncation_counts_chars_not_bytes() {
        assert_eq!(truncate_chars("公主的星光好运包", 3), "公主的");
        assert_eq!(truncate_chars("ab", 36), "ab");
        // astral characters count once each
        assert_eq!(truncate_chars("🐴🐴🐴", 2), "🐴🐴");
    }

    #[test]
    fn huge_stored_weights_keep_the_total_finite() {
        let items = (0..DEFAULT_POOL_SIZE)
            .map(|i| json!({"id": format!("h{}", i), "name": "Huge", "weight": 1e308}))
            .collect();
        let (pool, origin) = PrizePool::from_stored(Some(Value::Array(items)));
        assert_eq!(origin, PoolOrigin::Stored);
        assert!(pool.entries().iter().all(|e| e.weight == MAX_WEIGHT));
        assert!(pool.total_weight().is_finite());

        let typed = PrizePool::from(vec![entry("a", "A", Weight::MAX, true); 3]).normalized();
        assert_eq!(typed.total_weight(), 3.0 * MAX_WEIGHT);
    }

    #[proptest]
    fn normalizing_twice_is_stable(
        #[strategy(arbitrary::prize_pool_of_size(DEFAULT_POOL_SIZE))] pool: PrizePool,
    ) {
        let once = pool.normalized();
        let twice = once.clone().normalized();
        assert_eq!(once, twice);
    }
}
