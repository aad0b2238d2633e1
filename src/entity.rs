use crate::calculations::allocation;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Which in-kind collection an entity belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Personnel,
    Equipment,
}

impl AssetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::Personnel => "personnel",
            AssetKind::Equipment => "equipment",
        }
    }

    pub fn all() -> [AssetKind; 2] {
        [AssetKind::Personnel, AssetKind::Equipment]
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "personnel" | "person" | "people" => Ok(AssetKind::Personnel),
            "equipment" | "equip" | "machine" => Ok(AssetKind::Equipment),
            other => Err(format!("unknown asset kind '{other}'")),
        }
    }
}

/// A person or a piece of equipment whose base value is apportioned across
/// projects by percentage.
///
/// `total_percent` and `total_amount` are private and only ever written by
/// the private recompute step, so they cannot drift from `shares`
/// and `base_value`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationEntity {
    pub id: i64,
    pub kind: AssetKind,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acquisition_date: Option<NaiveDate>,
    base_value: f64,
    shares: BTreeMap<String, f64>,
    total_percent: f64,
    total_amount: i64,
}

impl AllocationEntity {
    pub fn new(id: i64, kind: AssetKind, name: impl Into<String>, base_value: f64) -> Self {
        let mut entity = Self {
            id,
            kind,
            name: name.into(),
            department: None,
            acquisition_date: None,
            base_value,
            shares: BTreeMap::new(),
            total_percent: 0.0,
            total_amount: 0,
        };
        entity.refresh_totals();
        entity
    }

    /// Salary is in thousands of currency units.
    pub fn personnel(id: i64, name: impl Into<String>, salary: f64) -> Self {
        Self::new(id, AssetKind::Personnel, name, salary)
    }

    /// Acquisition cost is in thousands of currency units.
    pub fn equipment(id: i64, name: impl Into<String>, acquisition_cost: f64) -> Self {
        Self::new(id, AssetKind::Equipment, name, acquisition_cost)
    }

    pub fn with_shares<I, K>(mut self, shares: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        self.shares = shares.into_iter().map(|(k, v)| (k.into(), v)).collect();
        self.refresh_totals();
        self
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn with_acquisition_date(mut self, date: NaiveDate) -> Self {
        self.acquisition_date = Some(date);
        self
    }

    pub fn base_value(&self) -> f64 {
        self.base_value
    }

    pub fn set_base_value(&mut self, base_value: f64) {
        self.base_value = base_value;
        self.refresh_totals();
    }

    pub fn shares(&self) -> &BTreeMap<String, f64> {
        &self.shares
    }

    /// Share for `project`, or 0 when the entity has no entry for it.
    pub fn share(&self, project: &str) -> f64 {
        self.shares.get(project).copied().unwrap_or(0.0)
    }

    pub fn total_percent(&self) -> f64 {
        self.total_percent
    }

    pub fn total_amount(&self) -> i64 {
        self.total_amount
    }

    /// True when the entity is allocated beyond its full value.
    pub fn is_over_allocated(&self) -> bool {
        self.total_percent > 100.0
    }

    pub(crate) fn put_share(&mut self, project: &str, value: f64) {
        self.shares.insert(project.to_string(), value);
        self.refresh_totals();
    }

    fn refresh_totals(&mut self) {
        let (total_percent, total_amount) = allocation::recompute(self.base_value, &self.shares);
        self.total_percent = total_percent;
        self.total_amount = total_amount;
    }
}

/// Everything the assets listing returns, after boundary validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AssetsSnapshot {
    pub projects: Vec<String>,
    pub personnel: Vec<AllocationEntity>,
    pub equipment: Vec<AllocationEntity>,
}

impl AssetsSnapshot {
    pub fn entities(&self, kind: AssetKind) -> &[AllocationEntity] {
        match kind {
            AssetKind::Personnel => &self.personnel,
            AssetKind::Equipment => &self.equipment,
        }
    }

    pub fn entities_mut(&mut self, kind: AssetKind) -> &mut Vec<AllocationEntity> {
        match kind {
            AssetKind::Personnel => &mut self.personnel,
            AssetKind::Equipment => &mut self.equipment,
        }
    }

    pub fn find(&self, kind: AssetKind, id: i64) -> Option<&AllocationEntity> {
        self.entities(kind).iter().find(|entity| entity.id == id)
    }

    /// Project columns: the listed projects first, then any extra keys found in
    /// entity shares, in name order.
    pub fn project_columns(&self) -> Vec<String> {
        let mut columns = self.projects.clone();
        let mut extra: Vec<&String> = self
            .personnel
            .iter()
            .chain(self.equipment.iter())
            .flat_map(|entity| entity.shares().keys())
            .filter(|key| !self.projects.contains(*key))
            .collect();
        extra.sort();
        extra.dedup();
        columns.extend(extra.into_iter().cloned());
        columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_follow_base_value_changes() {
        let mut entity =
            AllocationEntity::personnel(1, "Kim", 50_000.0).with_shares([("A", 40.0), ("B", 70.0)]);
        assert_eq!(entity.total_percent(), 110.0);
        assert_eq!(entity.total_amount(), 55_000);

        entity.set_base_value(10_000.0);
        assert_eq!(entity.total_amount(), 11_000);
        assert!(entity.is_over_allocated());
    }

    #[test]
    fn missing_share_reads_as_zero() {
        let entity = AllocationEntity::equipment(3, "MCT-01", 1_200.0);
        assert_eq!(entity.share("unknown"), 0.0);
        assert_eq!(entity.total_amount(), 0);
    }

    #[test]
    fn asset_kind_parses_aliases() {
        assert_eq!("Personnel".parse::<AssetKind>(), Ok(AssetKind::Personnel));
        assert_eq!("equip".parse::<AssetKind>(), Ok(AssetKind::Equipment));
        assert!("vehicle".parse::<AssetKind>().is_err());
    }

    #[test]
    fn project_columns_append_unlisted_share_keys() {
        let snapshot = AssetsSnapshot {
            projects: vec!["B".into(), "A".into()],
            personnel: vec![AllocationEntity::personnel(1, "Lee", 1.0).with_shares([("Z", 1.0)])],
            equipment: vec![AllocationEntity::equipment(2, "S1", 1.0).with_shares([("C", 1.0)])],
        };
        assert_eq!(snapshot.project_columns(), vec!["B", "A", "C", "Z"]);
    }
}
