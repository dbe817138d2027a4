use crate::defaults::fallback_entry;
use crate::lenient;
use crate::{truncate_chars, PrizeEntry, DETAIL_MAX_CHARS, MAX_WEIGHT, NAME_MAX_CHARS};
use serde::Deserialize;
use serde_json::Value;

/// A prize as found in storage, with no guarantee about the shape of any
/// field.
///
/// Every field distinguishes "absent" (`None`) from "present" (`Some`),
/// including an explicit `null`, because numeric coercion treats the two
/// differently.
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct RawPrizeEntry {
    #[serde(default, deserialize_with = "lenient::present")]
    pub id: Option<Value>,
    #[serde(default, deserialize_with = "lenient::present")]
    pub name: Option<Value>,
    #[serde(default, deserialize_with = "lenient::present")]
    pub detail: Option<Value>,
    #[serde(default, deserialize_with = "lenient::present")]
    pub weight: Option<Value>,
    #[serde(default, deserialize_with = "lenient::present")]
    pub enabled: Option<Value>,
}

impl RawPrizeEntry {
    /// Items that are not JSON objects carry no usable field at all.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(_) => serde_json::from_value(value).unwrap_or_default(),
            _ => Self::default(),
        }
    }
}

impl From<PrizeEntry> for RawPrizeEntry {
    fn from(entry: PrizeEntry) -> Self {
        Self {
            id: Some(Value::String(entry.id)),
            name: Some(Value::String(entry.name)),
            detail: Some(Value::String(entry.detail)),
            weight: Some(
                serde_json::Number::from_f64(entry.weight)
                    .map(Value::Number)
                    .unwrap_or(Value::Null),
            ),
            enabled: Some(Value::Bool(entry.enabled)),
        }
    }
}

/// Turn a stored record into a well formed [`PrizeEntry`], borrowing any
/// unusable field from the default prize occupying the same slot.
pub fn normalize_entry(raw: RawPrizeEntry, index: usize) -> PrizeEntry {
    let fallback = fallback_entry(index);

    let weight = lenient::to_number(raw.weight.as_ref());
    PrizeEntry {
        id: raw
            .id
            .as_ref()
            .and_then(lenient::truthy_text)
            .unwrap_or(fallback.id),
        name: truncate_chars(
            &raw.name
                .as_ref()
                .and_then(lenient::truthy_text)
                .unwrap_or(fallback.name),
            NAME_MAX_CHARS,
        ),
        detail: truncate_chars(
            &raw.detail
                .as_ref()
                .and_then(lenient::truthy_text)
                .unwrap_or(fallback.detail),
            DETAIL_MAX_CHARS,
        ),
        weight: if weight.is_finite() && weight >= 0.0 {
            weight.min(MAX_WEIGHT)
        } else {
            fallback.weight
        },
        enabled: !matches!(raw.enabled, Some(Value::Bool(false))),
    }
}
