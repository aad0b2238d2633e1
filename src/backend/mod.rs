use crate::entity::AssetKind;
use crate::ledger::Investment;
use crate::process::ProcessOrder;
use crate::validation::ValidationError;
use crate::wire::{
    AssetsResponse, InvestmentForm, LoginRequest, LoginResponse, NewEquipment, NewOrder,
    NewPersonnel, ProcessTimesPayload, SharesPayload,
};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("login rejected")]
    Unauthorized,
    #[error("{0} not found")]
    NotFound(String),
    #[error("invalid backend data: {0}")]
    Invalid(#[from] ValidationError),
    #[error("invalid backend url: {0}")]
    Url(#[from] url::ParseError),
}

pub type BackendResult<T> = Result<T, BackendError>;

/// The dashboard's REST backend. Each call is a single request: no retry,
/// no queueing, last write wins.
#[async_trait]
pub trait AssetBackend: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> BackendResult<LoginResponse>;
    async fn fetch_assets(&self) -> BackendResult<AssetsResponse>;
    async fn save_shares(
        &self,
        kind: AssetKind,
        id: i64,
        payload: &SharesPayload,
    ) -> BackendResult<()>;
    async fn create_personnel(&self, request: &NewPersonnel) -> BackendResult<()>;
    async fn create_equipment(&self, request: &NewEquipment) -> BackendResult<()>;
    async fn fetch_orders(&self) -> BackendResult<Vec<ProcessOrder>>;
    async fn save_process_times(&self, payload: &ProcessTimesPayload) -> BackendResult<()>;
    /// Replaces the stored order with `order`; used for status changes.
    async fn update_order(&self, order: &ProcessOrder) -> BackendResult<()>;
    async fn create_order(&self, request: &NewOrder) -> BackendResult<()>;
    async fn fetch_investments(&self) -> BackendResult<Vec<Investment>>;
    async fn create_investment(&self, form: &InvestmentForm) -> BackendResult<()>;
    async fn update_investment(&self, id: i64, form: &InvestmentForm) -> BackendResult<()>;
    async fn delete_investment(&self, id: i64) -> BackendResult<()>;
}

pub mod http;
pub mod memory;

pub use http::HttpBackend;
pub use memory::InMemoryBackend;
