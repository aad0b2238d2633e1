//! Headless screens: each view owns the data it fetched, applies user edits
//! through the calculators and talks to the backend on save.

use crate::backend::BackendError;
use crate::entity::AssetKind;
use crate::validation::ValidationError;
use serde::Serialize;
use thiserror::Error;

pub mod assets;
pub mod ledger;
pub mod process;

pub use assets::AssetsView;
pub use ledger::LedgerView;
pub use process::ProcessView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A message for the user, queued by the view until the front end shows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

#[derive(Debug, Error)]
pub enum ViewError {
    #[error("{kind} {id} not found")]
    UnknownEntity { kind: AssetKind, id: i64 },
    #[error("order {0} not found")]
    UnknownOrder(i64),
    #[error("investment {0} not found")]
    UnknownInvestment(i64),
    #[error("no order selected")]
    NoSelection,
    #[error("the {0} role cannot modify data")]
    Forbidden(crate::session::Role),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

pub type ViewResult<T> = Result<T, ViewError>;
