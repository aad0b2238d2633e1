use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One investment round entry from the shareholder ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Investment {
    pub id: i64,
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub round: String,
    #[serde(default, deserialize_with = "crate::wire::lenient_date")]
    pub contract_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "crate::wire::lenient_date")]
    pub registration_date: Option<NaiveDate>,
    /// Number of shares issued in this entry.
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub shares: i64,
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub amount: f64,
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub investor: String,
    #[serde(default, deserialize_with = "crate::wire::null_as_default")]
    pub security_type: String,
}

impl Investment {
    pub fn new(id: i64, round: impl Into<String>, investor: impl Into<String>) -> Self {
        Self {
            id,
            round: round.into(),
            contract_date: None,
            registration_date: None,
            shares: 0,
            amount: 0.0,
            investor: investor.into(),
            security_type: String::new(),
        }
    }

    pub fn with_position(mut self, shares: i64, amount: f64) -> Self {
        self.shares = shares;
        self.amount = amount;
        self
    }
}
