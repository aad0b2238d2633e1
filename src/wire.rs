//! Request and response bodies exchanged with the dashboard backend.
//!
//! Every listing is decoded into these structs first and only becomes a
//! domain value after [`crate::validation`] accepted it. Totals the backend
//! sends alongside rows are kept for inspection but never trusted; the domain
//! types recompute them.

use crate::entity::{AllocationEntity, AssetKind, AssetsSnapshot};
use crate::ledger::Investment;
use crate::process::{OrderStatus, ProcessTimeBreakdown};
use crate::session::Role;
use crate::validation::{self, ValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Accepts `null`, `""`, `YYYY-MM-DD` or a timestamp starting with a date.
pub fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => {
            let date_part = text.get(..10).unwrap_or(text);
            NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
                .map(Some)
                .map_err(|err| serde::de::Error::custom(format!("invalid date '{text}': {err}")))
        }
    }
}

/// Reads JSON `null` the same as a missing key: the field's default.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn coerce_shares(raw: BTreeMap<String, Option<f64>>) -> BTreeMap<String, f64> {
    raw.into_iter()
        .map(|(project, value)| (project, value.unwrap_or(0.0)))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonnelRow {
    pub person_id: i64,
    pub name: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub salary: Option<f64>,
    #[serde(default)]
    pub shares: BTreeMap<String, Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<f64>,
}

impl PersonnelRow {
    pub fn new(person_id: i64, name: impl Into<String>, salary: f64) -> Self {
        Self {
            person_id,
            name: name.into(),
            department: None,
            salary: Some(salary),
            shares: BTreeMap::new(),
            total_percent: None,
            total_amount: None,
        }
    }

    pub fn with_share(mut self, project: impl Into<String>, value: Option<f64>) -> Self {
        self.shares.insert(project.into(), value);
        self
    }

    pub fn into_entity(self) -> AllocationEntity {
        let mut entity = AllocationEntity::personnel(
            self.person_id,
            self.name,
            self.salary.unwrap_or(0.0),
        )
        .with_shares(coerce_shares(self.shares));
        entity.department = self.department.filter(|d| !d.trim().is_empty());
        entity
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentRow {
    pub equipment_id: i64,
    pub name: String,
    #[serde(default)]
    pub acquisition_cost: Option<f64>,
    #[serde(default, deserialize_with = "lenient_date")]
    pub acquisition_date: Option<NaiveDate>,
    #[serde(default)]
    pub shares: BTreeMap<String, Option<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_percent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_amount: Option<f64>,
}

impl EquipmentRow {
    pub fn new(equipment_id: i64, name: impl Into<String>, acquisition_cost: f64) -> Self {
        Self {
            equipment_id,
            name: name.into(),
            acquisition_cost: Some(acquisition_cost),
            acquisition_date: None,
            shares: BTreeMap::new(),
            total_percent: None,
            total_amount: None,
        }
    }

    pub fn with_share(mut self, project: impl Into<String>, value: Option<f64>) -> Self {
        self.shares.insert(project.into(), value);
        self
    }

    pub fn into_entity(self) -> AllocationEntity {
        let mut entity = AllocationEntity::equipment(
            self.equipment_id,
            self.name,
            self.acquisition_cost.unwrap_or(0.0),
        )
        .with_shares(coerce_shares(self.shares));
        entity.acquisition_date = self.acquisition_date;
        entity
    }
}

/// Body of `GET /assets`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetsResponse {
    #[serde(default)]
    pub projects: Vec<String>,
    #[serde(default)]
    pub personnel_rows: Vec<PersonnelRow>,
    #[serde(default)]
    pub equipment_rows: Vec<EquipmentRow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personnel_salary_total: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personnel_grand_total: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment_acquisition_total: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equipment_grand_total: Option<f64>,
}

impl TryFrom<AssetsResponse> for AssetsSnapshot {
    type Error = ValidationError;

    fn try_from(response: AssetsResponse) -> Result<Self, Self::Error> {
        validation::validate_assets_response(&response)?;
        Ok(AssetsSnapshot {
            projects: response.projects,
            personnel: response
                .personnel_rows
                .into_iter()
                .map(PersonnelRow::into_entity)
                .collect(),
            equipment: response
                .equipment_rows
                .into_iter()
                .map(EquipmentRow::into_entity)
                .collect(),
        })
    }
}

/// Body of `PUT /{personnel|equipment}/{id}/shares`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharesPayload {
    pub shares: BTreeMap<String, f64>,
}

impl SharesPayload {
    pub fn from_entity(entity: &AllocationEntity) -> Self {
        Self {
            shares: entity.shares().clone(),
        }
    }
}

/// Form fields of `POST /personnel`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPersonnel {
    pub name: String,
    #[serde(default)]
    pub department: Option<String>,
    pub salary: f64,
}

/// Form fields of `POST /equipment`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEquipment {
    pub name: String,
    pub acquisition_cost: f64,
    #[serde(default)]
    pub acquisition_date: Option<NaiveDate>,
}

/// Form fields of `POST /process/orders`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    pub company_name: String,
    #[serde(default)]
    pub quote_date: Option<NaiveDate>,
    #[serde(default)]
    pub category: String,
    pub product_name: String,
    pub quantity: i64,
    /// Whole-order manufacturing cost.
    pub manufacturing_cost: f64,
    pub total_quote_price: f64,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub actual_order_amount: Option<f64>,
}

impl NewOrder {
    pub fn new(company_name: impl Into<String>, product_name: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            quote_date: None,
            category: String::new(),
            product_name: product_name.into(),
            quantity: 0,
            manufacturing_cost: 0.0,
            total_quote_price: 0.0,
            status: OrderStatus::Quoting,
            due_date: None,
            actual_order_amount: None,
        }
    }
}

/// Form fields of `POST /investments` and `PUT /investments/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentForm {
    pub round: String,
    #[serde(default)]
    pub contract_date: Option<NaiveDate>,
    #[serde(default)]
    pub registration_date: Option<NaiveDate>,
    pub shares: i64,
    pub amount: f64,
    #[serde(default)]
    pub investor: String,
    #[serde(default)]
    pub security_type: String,
}

impl InvestmentForm {
    pub fn new(round: impl Into<String>, investor: impl Into<String>, shares: i64, amount: f64) -> Self {
        Self {
            round: round.into(),
            contract_date: None,
            registration_date: None,
            shares,
            amount,
            investor: investor.into(),
            security_type: String::new(),
        }
    }

    pub fn into_investment(self, id: i64) -> Investment {
        Investment {
            id,
            round: self.round,
            contract_date: self.contract_date,
            registration_date: self.registration_date,
            shares: self.shares,
            amount: self.amount,
            investor: self.investor,
            security_type: self.security_type,
        }
    }
}

impl From<&Investment> for InvestmentForm {
    fn from(investment: &Investment) -> Self {
        Self {
            round: investment.round.clone(),
            contract_date: investment.contract_date,
            registration_date: investment.registration_date,
            shares: investment.shares,
            amount: investment.amount,
            investor: investment.investor.clone(),
            security_type: investment.security_type.clone(),
        }
    }
}

/// Dates go over multipart forms as `YYYY-MM-DD`, or empty when unset.
pub fn form_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Body of `PUT /process/orders/{id}/times`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessTimesPayload {
    pub order_id: i64,
    #[serde(flatten)]
    pub times: ProcessTimeBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// The backend identifies accounts by role name.
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    pub fn for_role(role: Role, password: impl Into<String>) -> Self {
        Self {
            username: role.as_str().to_string(),
            password: password.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub role: Role,
}

/// Path segment used by the shares endpoints.
pub fn shares_path(kind: AssetKind, id: i64) -> String {
    format!("{}/{id}/shares", kind.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_shares_and_missing_salary_coerce_to_zero() {
        let json = r#"{
            "person_id": 4,
            "name": "Choi",
            "department": "",
            "shares": {"A": null, "B": 30},
            "total_percent": 999,
            "total_amount": 999
        }"#;
        let row: PersonnelRow = serde_json::from_str(json).unwrap();
        let entity = row.into_entity();
        assert_eq!(entity.base_value(), 0.0);
        assert_eq!(entity.share("A"), 0.0);
        assert_eq!(entity.total_percent(), 30.0);
        assert_eq!(entity.total_amount(), 0);
        assert_eq!(entity.department, None);
    }

    #[test]
    fn backend_totals_are_recomputed() {
        let json = r#"{
            "projects": ["A"],
            "personnel_rows": [
                {"person_id": 1, "name": "Kim", "salary": 50000,
                 "shares": {"A": 40, "B": 70}, "total_percent": 12, "total_amount": 1}
            ],
            "equipment_rows": [
                {"equipment_id": 2, "name": "S1", "acquisition_cost": 1000,
                 "acquisition_date": "2024-03-05T00:00:00", "shares": {"A": 50}}
            ],
            "personnel_grand_total": 1
        }"#;
        let response: AssetsResponse = serde_json::from_str(json).unwrap();
        let snapshot = AssetsSnapshot::try_from(response).unwrap();
        assert_eq!(snapshot.personnel[0].total_amount(), 55_000);
        assert_eq!(
            snapshot.equipment[0].acquisition_date,
            NaiveDate::from_ymd_opt(2024, 3, 5)
        );
        assert_eq!(snapshot.equipment[0].total_amount(), 500);
    }

    #[test]
    fn process_times_payload_is_flat() {
        let payload = ProcessTimesPayload {
            order_id: 3,
            times: ProcessTimeBreakdown {
                design_hr: Some(2.0),
                ..Default::default()
            },
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["order_id"], 3);
        assert_eq!(value["design_hr"], 2.0);
        assert!(value.get("times").is_none());
    }
}
