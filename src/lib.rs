pub mod backend;
pub mod calculations;
pub mod config;
pub mod entity;
pub mod export;
pub mod ledger;
pub mod process;
pub mod session;
pub mod telemetry;
pub mod validation;
pub mod views;
pub mod wire;

pub use backend::{AssetBackend, BackendError, HttpBackend, InMemoryBackend};
pub use config::AppConfig;
pub use entity::{AllocationEntity, AssetKind, AssetsSnapshot};
pub use ledger::Investment;
pub use process::{OrderStatus, ProcessOrder, ProcessStage, ProcessTimeBreakdown};
pub use session::{Role, Session, SessionManager};
pub use views::{AssetsView, LedgerView, Notice, ProcessView};
