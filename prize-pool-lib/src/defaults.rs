use crate::{PrizeEntry, PrizePool, Weight};

/// (id, name, detail, weight)
const DEFAULT_PRIZES: [(&str, &str, &str, Weight); 10] = [
    ("p01", "公主的星光好运包", "马年好运红包礼物 1 份", 9.0),
    ("p02", "哆哆的跳跳好运包", "马年好运红包礼物 1 份", 10.0),
    (
        "p03",
        "西西的绵绵好运包",
        "马年好运红包礼物 1 份 + 专属祝福卡",
        9.0,
    ),
    ("p04", "公主的云锦丝巾礼", "南京云锦丝巾礼盒 1 份", 10.0),
    ("p05", "哆哆的雨花石愿望礼", "南京雨花石文创摆件礼盒 1 份", 10.0),
    ("p06", "西西的金陵折扇礼", "金陵折扇手作礼盒 1 份", 10.0),
    ("p07", "公主的秦淮灯彩礼", "秦淮灯彩手作小灯 1 份", 10.0),
    ("p08", "哆哆的香囊平安礼", "南京香囊与流苏挂件套装 1 份", 11.0),
    ("p09", "西西的文具心愿礼", "高颜值手帐文具礼盒 1 份", 11.0),
    (
        "p10",
        "公主哆哆西西终极礼",
        "马年好运红包礼物 + 新春纪念周边套装",
        10.0,
    ),
];

/// Number of slots in a stored pool. The host edits prizes in place, so a
/// stored pool with a different length is considered corrupt.
pub const DEFAULT_POOL_SIZE: usize = DEFAULT_PRIZES.len();

pub fn default_pool() -> PrizePool {
    DEFAULT_PRIZES
        .iter()
        .map(|&(id, name, detail, weight)| PrizeEntry {
            id: id.to_string(),
            name: name.to_string(),
            detail: detail.to_string(),
            weight,
            enabled: true,
        })
        .collect::<Vec<_>>()
        .into()
}

/// Fallback entry for a given slot, used while normalizing stored data.
pub(crate) fn fallback_entry(index: usize) -> PrizeEntry {
    let (id, name, detail, weight) = DEFAULT_PRIZES
        .get(index)
        .copied()
        .unwrap_or(DEFAULT_PRIZES[0]);
    PrizeEntry {
        id: id.to_string(),
        name: name.to_string(),
        detail: detail.to_string(),
        weight,
        enabled: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_all_drawable() {
        let pool = default_pool();
        assert_eq!(pool.len(), DEFAULT_POOL_SIZE);
        assert!(pool.entries().iter().all(PrizeEntry::is_drawable));
        assert_eq!(pool.total_weight(), 100.0);
    }

    #[test]
    fn fallback_beyond_defaults_uses_first_slot() {
        assert_eq!(fallback_entry(42).id, "p01");
        assert_eq!(fallback_entry(9).id, "p10");
    }
}
