use prize_pool_lib::{
    truncate_chars, PrizeEntry, PrizePool, Weight, DEFAULT_POOL_SIZE, DETAIL_MAX_CHARS,
    MAX_WEIGHT, NAME_MAX_CHARS,
};
use serde::Deserialize;

const PLACEHOLDER_DETAIL: &str = "待主持人补充";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EditorError {
    #[error("keep at least one enabled prize with a name and a weight above 0")]
    NoDrawablePrize,

    #[error("the pool has {expected} slots, got {found}")]
    SlotCountMismatch { expected: usize, found: usize },

    #[error("the weight of slot {0} is too large")]
    WeightTooLarge(usize),
}

/// A prize slot as filled in by the host.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct PoolEdit {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub detail: String,
    #[serde(default)]
    pub weight: Weight,
    #[serde(default)]
    pub enabled: bool,
}

impl From<&PrizeEntry> for PoolEdit {
    fn from(entry: &PrizeEntry) -> Self {
        Self {
            name: entry.name.clone(),
            detail: entry.detail.clone(),
            weight: entry.weight,
            enabled: entry.enabled,
        }
    }
}

impl PoolEdit {
    /// Current content of every slot, ready to be modified.
    pub fn from_pool(pool: &PrizePool) -> Vec<Self> {
        pool.entries().iter().map(Self::from).collect()
    }
}

fn slot_id(index: usize) -> String {
    format!("p{:02}", index + 1)
}

fn placeholder_name(index: usize) -> String {
    format!("神秘奖项 {}", index + 1)
}

/// Validate the edited slots and turn them into the next pool.
///
/// Ids are kept from `current` slot by slot. Weights are floored, with
/// negative or non finite input counting as 0, and may not exceed
/// [`MAX_WEIGHT`]. The edited pool must keep at least one drawable prize;
/// blank names and details are filled with placeholders afterwards.
pub fn collect_pool(edits: Vec<PoolEdit>, current: &PrizePool) -> Result<PrizePool, EditorError> {
    if edits.len() != DEFAULT_POOL_SIZE {
        return Err(EditorError::SlotCountMismatch {
            expected: DEFAULT_POOL_SIZE,
            found: edits.len(),
        });
    }

    let next = edits
        .into_iter()
        .enumerate()
        .map(|(index, edit)| PrizeEntry {
            id: current
                .get(index)
                .map(|entry| entry.id.clone())
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| slot_id(index)),
            name: truncate_chars(edit.name.trim(), NAME_MAX_CHARS),
            detail: truncate_chars(edit.detail.trim(), DETAIL_MAX_CHARS),
            weight: if edit.weight.is_finite() && edit.weight >= 0.0 {
                edit.weight.floor()
            } else {
                0.0
            },
            enabled: edit.enabled,
        })
        .collect::<Vec<_>>();

    if let Some(index) = next.iter().position(|entry| entry.weight > MAX_WEIGHT) {
        return Err(EditorError::WeightTooLarge(index + 1));
    }
    if !next.iter().any(PrizeEntry::is_drawable) {
        return Err(EditorError::NoDrawablePrize);
    }

    Ok(next
        .into_iter()
        .enumerate()
        .map(|(index, entry)| PrizeEntry {
            name: if entry.name.is_empty() {
                placeholder_name(index)
            } else {
                entry.name
            },
            detail: if entry.detail.is_empty() {
                PLACEHOLDER_DETAIL.to_string()
            } else {
                entry.detail
            },
            ..entry
        })
        .collect::<Vec<_>>()
        .into())
}
