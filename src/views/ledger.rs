use super::{Notice, ViewError, ViewResult};
use crate::backend::{AssetBackend, BackendError};
use crate::calculations::shareholders::{self, LedgerSummary};
use crate::ledger::Investment;
use crate::session::Session;
use crate::validation;
use crate::wire::InvestmentForm;
use std::sync::Arc;

/// The shareholder ledger: investment entries plus the summary derived from
/// them.
pub struct LedgerView<B: AssetBackend + ?Sized> {
    backend: Arc<B>,
    session: Session,
    investments: Vec<Investment>,
    notices: Vec<Notice>,
}

impl<B: AssetBackend + ?Sized> LedgerView<B> {
    pub fn new(backend: Arc<B>, session: Session) -> Self {
        Self {
            backend,
            session,
            investments: Vec::new(),
            notices: Vec::new(),
        }
    }

    pub fn investments(&self) -> &[Investment] {
        &self.investments
    }

    pub fn investment(&self, id: i64) -> Option<&Investment> {
        self.investments.iter().find(|investment| investment.id == id)
    }

    /// Recomputed from the current entries on every call.
    pub fn summary(&self) -> LedgerSummary {
        shareholders::summarize(&self.investments)
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub async fn refresh(&mut self) -> ViewResult<()> {
        let fetched = self.backend.fetch_investments().await.and_then(|investments| {
            validation::validate_investments(&investments)?;
            Ok::<_, BackendError>(investments)
        });
        match fetched {
            Ok(investments) => {
                self.investments = investments;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to load investments");
                self.notices
                    .push(Notice::error(format!("failed to load investments: {err}")));
                Err(err.into())
            }
        }
    }

    pub async fn add(&mut self, form: InvestmentForm) -> ViewResult<()> {
        self.ensure_can_edit()?;
        validation::validate_investment_form(&form)?;
        let result = self.backend.create_investment(&form).await;
        self.finish(result, format!("{} investment", form.round)).await
    }

    pub async fn update(&mut self, id: i64, form: InvestmentForm) -> ViewResult<()> {
        self.ensure_can_edit()?;
        if self.investment(id).is_none() {
            return Err(ViewError::UnknownInvestment(id));
        }
        validation::validate_investment_form(&form)?;
        let result = self.backend.update_investment(id, &form).await;
        self.finish(result, format!("investment {id}")).await
    }

    /// Entries stay listed when the delete fails.
    pub async fn delete(&mut self, id: i64) -> ViewResult<()> {
        self.ensure_can_edit()?;
        if self.investment(id).is_none() {
            return Err(ViewError::UnknownInvestment(id));
        }
        let result = self.backend.delete_investment(id).await;
        self.finish(result, format!("investment {id} removal")).await
    }

    async fn finish(&mut self, result: Result<(), BackendError>, what: String) -> ViewResult<()> {
        match result {
            Ok(()) => {
                tracing::info!(what = %what, "ledger saved");
                self.notices.push(Notice::success(format!("saved {what}")));
                self.refresh().await
            }
            Err(err) => {
                tracing::warn!(what = %what, error = %err, "ledger save failed");
                self.notices
                    .push(Notice::error(format!("failed to save {what}: {err}")));
                Err(err.into())
            }
        }
    }

    fn ensure_can_edit(&self) -> ViewResult<()> {
        if self.session.can_edit() {
            Ok(())
        } else {
            Err(ViewError::Forbidden(self.session.role))
        }
    }
}
