use crate::entity::AllocationEntity;
use serde::Serialize;
use std::collections::BTreeMap;

/// Rounds half-way values towards positive infinity, matching how the
/// dashboard has always displayed amounts (`2.5 -> 3`, `-2.5 -> -2`).
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

/// `(total_percent, total_amount)` for a base value and its share map.
pub fn recompute(base_value: f64, shares: &BTreeMap<String, f64>) -> (f64, i64) {
    let total_percent: f64 = shares.values().sum();
    let total_amount = round_half_up(base_value * total_percent / 100.0);
    (total_percent, total_amount)
}

/// Returns a copy of `entity` with `project_key` set to `new_value`.
///
/// `None` is stored as 0. Values are not clamped: negative and over-100
/// shares are kept as given so correction workflows still add up.
pub fn apply_share(
    entity: &AllocationEntity,
    project_key: &str,
    new_value: Option<f64>,
) -> AllocationEntity {
    let mut updated = entity.clone();
    updated.put_share(project_key, new_value.unwrap_or(0.0));
    updated
}

pub fn grand_total<'a, I>(entities: I) -> i64
where
    I: IntoIterator<Item = &'a AllocationEntity>,
{
    entities.into_iter().map(AllocationEntity::total_amount).sum()
}

pub fn base_total<'a, I>(entities: I) -> f64
where
    I: IntoIterator<Item = &'a AllocationEntity>,
{
    entities.into_iter().map(AllocationEntity::base_value).sum()
}

/// `total / base * 100`, or 0 when `base` is 0.
pub fn ratio(total: f64, base: f64) -> f64 {
    if base == 0.0 {
        return 0.0;
    }
    total / base * 100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CollectionTotals {
    pub base_total: f64,
    pub grand_total: i64,
    pub ratio: f64,
}

impl CollectionTotals {
    pub fn of(entities: &[AllocationEntity]) -> Self {
        let base_total = base_total(entities);
        let grand_total = grand_total(entities);
        Self {
            base_total,
            grand_total,
            ratio: ratio(grand_total as f64, base_total),
        }
    }
}
