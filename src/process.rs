use crate::calculations::{lead_time, order_metrics};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Manufacturing sub-processes that contribute to an order's lead time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessStage {
    Design,
    Printing,
    Infiltration,
    Bonding,
    Lsi,
    Machining,
    Coating,
}

impl ProcessStage {
    pub const ALL: [ProcessStage; 7] = [
        ProcessStage::Design,
        ProcessStage::Printing,
        ProcessStage::Infiltration,
        ProcessStage::Bonding,
        ProcessStage::Lsi,
        ProcessStage::Machining,
        ProcessStage::Coating,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            ProcessStage::Design => "design",
            ProcessStage::Printing => "printing",
            ProcessStage::Infiltration => "infiltration",
            ProcessStage::Bonding => "bonding",
            ProcessStage::Lsi => "lsi",
            ProcessStage::Machining => "machining",
            ProcessStage::Coating => "coating",
        }
    }

    /// Name of the hour field on the wire, e.g. `design_hr`.
    pub fn field_name(&self) -> &'static str {
        match self {
            ProcessStage::Design => "design_hr",
            ProcessStage::Printing => "printing_hr",
            ProcessStage::Infiltration => "infiltration_hr",
            ProcessStage::Bonding => "bonding_hr",
            ProcessStage::Lsi => "lsi_hr",
            ProcessStage::Machining => "machining_hr",
            ProcessStage::Coating => "coating_hr",
        }
    }
}

impl fmt::Display for ProcessStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ProcessStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let key = normalized.strip_suffix("_hr").unwrap_or(&normalized);
        ProcessStage::ALL
            .iter()
            .copied()
            .find(|stage| stage.key() == key)
            .ok_or_else(|| format!("unknown process stage '{s}'"))
    }
}

/// Hours per sub-process for one order. Absent fields count as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessTimeBreakdown {
    #[serde(default)]
    pub design_hr: Option<f64>,
    #[serde(default)]
    pub printing_hr: Option<f64>,
    #[serde(default)]
    pub infiltration_hr: Option<f64>,
    #[serde(default)]
    pub bonding_hr: Option<f64>,
    #[serde(default)]
    pub lsi_hr: Option<f64>,
    #[serde(default)]
    pub machining_hr: Option<f64>,
    #[serde(default)]
    pub coating_hr: Option<f64>,
}

impl ProcessTimeBreakdown {
    pub fn hours(&self, stage: ProcessStage) -> Option<f64> {
        match stage {
            ProcessStage::Design => self.design_hr,
            ProcessStage::Printing => self.printing_hr,
            ProcessStage::Infiltration => self.infiltration_hr,
            ProcessStage::Bonding => self.bonding_hr,
            ProcessStage::Lsi => self.lsi_hr,
            ProcessStage::Machining => self.machining_hr,
            ProcessStage::Coating => self.coating_hr,
        }
    }

    pub fn set_hours(&mut self, stage: ProcessStage, hours: Option<f64>) {
        let slot = match stage {
            ProcessStage::Design => &mut self.design_hr,
            ProcessStage::Printing => &mut self.printing_hr,
            ProcessStage::Infiltration => &mut self.infiltration_hr,
            ProcessStage::Bonding => &mut self.bonding_hr,
            ProcessStage::Lsi => &mut self.lsi_hr,
            ProcessStage::Machining => &mut self.machining_hr,
            ProcessStage::Coating => &mut self.coating_hr,
        };
        *slot = hours;
    }

    pub fn with_hours(mut self, stage: ProcessStage, hours: Option<f64>) -> Self {
        self.set_hours(stage, hours);
        self
    }

    /// Derived on every call; never stored.
    pub fn expected_lead_time_hr(&self) -> f64 {
        lead_time::expected_lead_time(self)
    }
}

/// Order lifecycle label. The backend stores free text; labels the dashboard
/// does not know are kept verbatim in `Other` so they survive a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Quoting,
    InProgress,
    Producing,
    Ordered,
    Delivered,
    NotProceeding,
    Other(String),
}

impl OrderStatus {
    pub const KNOWN: [OrderStatus; 6] = [
        OrderStatus::Quoting,
        OrderStatus::InProgress,
        OrderStatus::Producing,
        OrderStatus::Ordered,
        OrderStatus::Delivered,
        OrderStatus::NotProceeding,
    ];

    pub fn label(&self) -> &str {
        match self {
            OrderStatus::Quoting => "견적중",
            OrderStatus::InProgress => "진행중",
            OrderStatus::Producing => "제작중",
            OrderStatus::Ordered => "발주완료",
            OrderStatus::Delivered => "납품완료",
            OrderStatus::NotProceeding => "미진행",
            OrderStatus::Other(label) => label,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, OrderStatus::Other(_))
    }
}

/// No label at all.
impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Other(String::new())
    }
}

impl From<&str> for OrderStatus {
    fn from(label: &str) -> Self {
        let label = label.trim();
        OrderStatus::KNOWN
            .into_iter()
            .find(|status| status.label() == label)
            .unwrap_or_else(|| OrderStatus::Other(label.to_string()))
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for OrderStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for OrderStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label: Option<String> = Option::deserialize(deserializer)?;
        Ok(label
            .map(|label| OrderStatus::from(label.as_str()))
            .unwrap_or_default())
    }
}

/// A quoted or running manufacturing order as listed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessOrder {
    pub id: i64,
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub company_name: String,
    #[serde(default, deserialize_with = "crate::wire::lenient_date")]
    pub quote_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub category: String,
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub product_name: String,
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub quantity: i64,
    /// Manufacturing cost for the whole order, not per unit.
    #[serde(
        default,
        rename = "unit_manufacturing_cost",
        deserialize_with = "crate::wire::null_as_default"
    )]
    pub manufacturing_cost: f64,
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub total_quote_price: f64,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub actual_order_amount: Option<f64>,
    #[serde(default, deserialize_with = "crate::wire::lenient_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(flatten)]
    pub process_times: ProcessTimeBreakdown,
}

impl ProcessOrder {
    pub fn new(id: i64, company_name: impl Into<String>, product_name: impl Into<String>) -> Self {
        Self {
            id,
            company_name: company_name.into(),
            quote_date: None,
            category: String::new(),
            product_name: product_name.into(),
            quantity: 0,
            manufacturing_cost: 0.0,
            total_quote_price: 0.0,
            status: OrderStatus::default(),
            actual_order_amount: None,
            due_date: None,
            process_times: ProcessTimeBreakdown::default(),
        }
    }

    pub fn unit_quote_price(&self) -> i64 {
        order_metrics::unit_quote_price(self.total_quote_price, self.quantity)
    }

    pub fn margin_rate(&self) -> Option<f64> {
        order_metrics::margin_rate(self.total_quote_price, self.manufacturing_cost)
    }

    pub fn expected_lead_time_hr(&self) -> f64 {
        self.process_times.expected_lead_time_hr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_parses_with_or_without_suffix() {
        assert_eq!("lsi".parse::<ProcessStage>(), Ok(ProcessStage::Lsi));
        assert_eq!("Coating_hr".parse::<ProcessStage>(), Ok(ProcessStage::Coating));
        assert!("welding".parse::<ProcessStage>().is_err());
    }

    #[test]
    fn set_hours_round_trips_every_stage() {
        let mut breakdown = ProcessTimeBreakdown::default();
        for (idx, stage) in ProcessStage::ALL.iter().enumerate() {
            breakdown.set_hours(*stage, Some(idx as f64));
        }
        for (idx, stage) in ProcessStage::ALL.iter().enumerate() {
            assert_eq!(breakdown.hours(*stage), Some(idx as f64));
        }
        assert_eq!(breakdown.expected_lead_time_hr(), 21.0);
    }

    #[test]
    fn order_deserializes_flat_hour_fields() {
        let json = r#"{
            "id": 7,
            "company_name": "ACME",
            "quote_date": "",
            "product_name": "Impeller",
            "quantity": 4,
            "unit_manufacturing_cost": 800000,
            "total_quote_price": 1000000,
            "status": "납품완료",
            "printing_hr": 5.5,
            "lsi_hr": null
        }"#;
        let order: ProcessOrder = serde_json::from_str(json).unwrap();
        assert_eq!(order.status, OrderStatus::Delivered);
        assert_eq!(order.quote_date, None);
        assert_eq!(order.process_times.printing_hr, Some(5.5));
        assert_eq!(order.process_times.lsi_hr, None);
        assert_eq!(order.unit_quote_price(), 250_000);
        assert_eq!(order.margin_rate(), Some(20.0));
    }

    #[test]
    fn null_fields_read_as_defaults() {
        let json = r#"{
            "id": 8,
            "company_name": null,
            "category": null,
            "product_name": null,
            "quantity": null,
            "unit_manufacturing_cost": null,
            "total_quote_price": null,
            "status": null
        }"#;
        let order: ProcessOrder = serde_json::from_str(json).unwrap();
        assert_eq!(order.company_name, "");
        assert_eq!(order.quantity, 0);
        assert_eq!(order.manufacturing_cost, 0.0);
        assert_eq!(order.status, OrderStatus::default());
        assert_eq!(order.unit_quote_price(), 0);
        assert_eq!(order.margin_rate(), None);
    }

    #[test]
    fn status_labels_survive_a_round_trip() {
        for label in ["견적중", "진행중", "제작중", "발주완료", "납품완료", "미진행", "보류"] {
            let status: OrderStatus = serde_json::from_value(serde_json::json!(label)).unwrap();
            assert_eq!(status.label(), label);
            assert_eq!(serde_json::to_value(&status).unwrap(), serde_json::json!(label));
        }
        assert_eq!(OrderStatus::from("제작중"), OrderStatus::Producing);
        assert_eq!(
            OrderStatus::from(" 보류 "),
            OrderStatus::Other("보류".to_string())
        );
        assert!(!OrderStatus::from("보류").is_known());
    }
}
