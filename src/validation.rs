use crate::ledger::Investment;
use crate::process::ProcessOrder;
use crate::wire::{
    AssetsResponse, EquipmentRow, InvestmentForm, NewEquipment, NewOrder, NewPersonnel,
    PersonnelRow,
};
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub fn validate_project_key(project: &str) -> Result<(), ValidationError> {
    if project.trim().is_empty() {
        return Err(ValidationError::new("project key must not be empty"));
    }
    Ok(())
}

/// A share or stage-hour edit. Cleared values are fine; `NaN` and infinities
/// are not, since JSON cannot carry them.
pub fn validate_edit_value(value: Option<f64>) -> Result<(), ValidationError> {
    match value {
        Some(v) if !v.is_finite() => Err(ValidationError::new(format!(
            "value must be a finite number (got {v})"
        ))),
        _ => Ok(()),
    }
}

fn validate_share_keys<'a, I>(label: &str, id: i64, keys: I) -> Result<(), ValidationError>
where
    I: IntoIterator<Item = &'a String>,
{
    for key in keys {
        if key.trim().is_empty() {
            return Err(ValidationError::new(format!(
                "{label} {id} has a share with an empty project key"
            )));
        }
    }
    Ok(())
}

fn validate_base_value(label: &str, id: i64, value: Option<f64>) -> Result<(), ValidationError> {
    if let Some(value) = value {
        if !value.is_finite() {
            return Err(ValidationError::new(format!(
                "{label} {id} has non-finite base value {value}"
            )));
        }
    }
    Ok(())
}

pub fn validate_personnel_row(row: &PersonnelRow) -> Result<(), ValidationError> {
    if row.name.trim().is_empty() {
        return Err(ValidationError::new(format!(
            "personnel {} requires a non-empty name",
            row.person_id
        )));
    }
    validate_base_value("personnel", row.person_id, row.salary)?;
    validate_share_keys("personnel", row.person_id, row.shares.keys())
}

pub fn validate_equipment_row(row: &EquipmentRow) -> Result<(), ValidationError> {
    if row.name.trim().is_empty() {
        return Err(ValidationError::new(format!(
            "equipment {} requires a non-empty name",
            row.equipment_id
        )));
    }
    validate_base_value("equipment", row.equipment_id, row.acquisition_cost)?;
    validate_share_keys("equipment", row.equipment_id, row.shares.keys())
}

/// Share keys that are not in `projects` are accepted: a project deleted on
/// the backend still leaves its share rows behind.
pub fn validate_assets_response(response: &AssetsResponse) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(response.personnel_rows.len());
    for row in &response.personnel_rows {
        if !seen.insert(row.person_id) {
            return Err(ValidationError::new(format!(
                "duplicate personnel id {}",
                row.person_id
            )));
        }
        validate_personnel_row(row)?;
    }

    let mut seen = HashSet::with_capacity(response.equipment_rows.len());
    for row in &response.equipment_rows {
        if !seen.insert(row.equipment_id) {
            return Err(ValidationError::new(format!(
                "duplicate equipment id {}",
                row.equipment_id
            )));
        }
        validate_equipment_row(row)?;
    }
    Ok(())
}

pub fn validate_orders(orders: &[ProcessOrder]) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(orders.len());
    for order in orders {
        if !seen.insert(order.id) {
            return Err(ValidationError::new(format!(
                "duplicate order id {}",
                order.id
            )));
        }
    }
    Ok(())
}

pub fn validate_investments(investments: &[Investment]) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(investments.len());
    for investment in investments {
        if !seen.insert(investment.id) {
            return Err(ValidationError::new(format!(
                "duplicate investment id {}",
                investment.id
            )));
        }
        if !investment.amount.is_finite() {
            return Err(ValidationError::new(format!(
                "investment {} has non-finite amount",
                investment.id
            )));
        }
    }
    Ok(())
}

pub fn validate_new_personnel(request: &NewPersonnel) -> Result<(), ValidationError> {
    if request.name.trim().is_empty() {
        return Err(ValidationError::new("personnel name is required"));
    }
    if !request.salary.is_finite() || request.salary < 0.0 {
        return Err(ValidationError::new(format!(
            "salary must be a non-negative amount (got {})",
            request.salary
        )));
    }
    Ok(())
}

pub fn validate_new_equipment(request: &NewEquipment) -> Result<(), ValidationError> {
    if request.name.trim().is_empty() {
        return Err(ValidationError::new("equipment name is required"));
    }
    if !request.acquisition_cost.is_finite() || request.acquisition_cost < 0.0 {
        return Err(ValidationError::new(format!(
            "acquisition cost must be a non-negative amount (got {})",
            request.acquisition_cost
        )));
    }
    Ok(())
}

pub fn validate_new_order(request: &NewOrder) -> Result<(), ValidationError> {
    if request.company_name.trim().is_empty() || request.product_name.trim().is_empty() {
        return Err(ValidationError::new(
            "company and product name are required",
        ));
    }
    if request.quantity < 0 {
        return Err(ValidationError::new(format!(
            "quantity must not be negative (got {})",
            request.quantity
        )));
    }
    for (label, value) in [
        ("manufacturing cost", request.manufacturing_cost),
        ("total quote price", request.total_quote_price),
    ] {
        if !value.is_finite() {
            return Err(ValidationError::new(format!("{label} must be a finite amount")));
        }
    }
    Ok(())
}

pub fn validate_investment_form(form: &InvestmentForm) -> Result<(), ValidationError> {
    if form.round.trim().is_empty() {
        return Err(ValidationError::new("investment round is required"));
    }
    if !form.amount.is_finite() {
        return Err(ValidationError::new("investment amount must be a finite amount"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_duplicate_personnel_ids() {
        let response = AssetsResponse {
            personnel_rows: vec![PersonnelRow::new(1, "A", 1.0), PersonnelRow::new(1, "B", 1.0)],
            ..Default::default()
        };
        let err = validate_assets_response(&response).unwrap_err();
        assert!(err.message().contains("duplicate personnel id 1"));
    }

    #[test]
    fn tolerates_shares_for_unlisted_projects() {
        let response = AssetsResponse {
            projects: vec!["Live".into()],
            equipment_rows: vec![EquipmentRow::new(5, "S1", 10.0).with_share("Deleted", Some(20.0))],
            ..Default::default()
        };
        assert!(validate_assets_response(&response).is_ok());
    }

    #[test]
    fn rejects_blank_project_keys() {
        assert!(validate_project_key("  ").is_err());
        let row = PersonnelRow::new(2, "Han", 1.0).with_share("", Some(1.0));
        assert!(validate_personnel_row(&row).is_err());
    }

    #[test]
    fn new_personnel_requires_name_and_salary() {
        let mut request = NewPersonnel {
            name: "Jung".into(),
            department: None,
            salary: 42_000.0,
        };
        assert!(validate_new_personnel(&request).is_ok());
        request.salary = -1.0;
        assert!(validate_new_personnel(&request).is_err());
        request.salary = 1.0;
        request.name = String::new();
        assert!(validate_new_personnel(&request).is_err());
    }

    #[test]
    fn edit_values_must_be_finite() {
        assert!(validate_edit_value(None).is_ok());
        assert!(validate_edit_value(Some(-12.5)).is_ok());
        assert!(validate_edit_value(Some(f64::NAN)).is_err());
        assert!(validate_edit_value(Some(f64::INFINITY)).is_err());
    }

    #[test]
    fn new_order_and_investment_need_their_keys() {
        let mut order = NewOrder::new("ACME", "Impeller");
        assert!(validate_new_order(&order).is_ok());
        order.quantity = -1;
        assert!(validate_new_order(&order).is_err());

        let mut form = InvestmentForm::new("Seed", "", 100, 5.0);
        assert!(validate_investment_form(&form).is_ok());
        form.round = " ".into();
        assert!(validate_investment_form(&form).is_err());
    }
}
