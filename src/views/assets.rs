use super::{Notice, ViewError, ViewResult};
use crate::backend::{AssetBackend, BackendError};
use crate::calculations::allocation::{self, CollectionTotals};
use crate::entity::{AllocationEntity, AssetKind, AssetsSnapshot};
use crate::session::Session;
use crate::validation;
use crate::wire::{NewEquipment, NewPersonnel, SharesPayload};
use std::sync::Arc;

/// The in-kind contribution screen: personnel and equipment allocation
/// tables with their totals.
pub struct AssetsView<B: AssetBackend + ?Sized> {
    backend: Arc<B>,
    session: Session,
    snapshot: AssetsSnapshot,
    notices: Vec<Notice>,
}

impl<B: AssetBackend + ?Sized> AssetsView<B> {
    pub fn new(backend: Arc<B>, session: Session) -> Self {
        Self {
            backend,
            session,
            snapshot: AssetsSnapshot::default(),
            notices: Vec::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn snapshot(&self) -> &AssetsSnapshot {
        &self.snapshot
    }

    pub fn projects(&self) -> &[String] {
        &self.snapshot.projects
    }

    pub fn entities(&self, kind: AssetKind) -> &[AllocationEntity] {
        self.snapshot.entities(kind)
    }

    pub fn entity(&self, kind: AssetKind, id: i64) -> Option<&AllocationEntity> {
        self.snapshot.find(kind, id)
    }

    pub fn totals(&self, kind: AssetKind) -> CollectionTotals {
        CollectionTotals::of(self.entities(kind))
    }

    pub fn grand_total(&self, kind: AssetKind) -> i64 {
        allocation::grand_total(self.entities(kind))
    }

    pub fn base_total(&self, kind: AssetKind) -> f64 {
        allocation::base_total(self.entities(kind))
    }

    pub fn ratio(&self, kind: AssetKind) -> f64 {
        allocation::ratio(self.grand_total(kind) as f64, self.base_total(kind))
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Replaces everything with the backend's current listing. On failure the
    /// previous data stays in place.
    pub async fn refresh(&mut self) -> ViewResult<()> {
        let fetched = self
            .backend
            .fetch_assets()
            .await
            .and_then(|response| AssetsSnapshot::try_from(response).map_err(BackendError::from));
        match fetched {
            Ok(snapshot) => {
                tracing::debug!(
                    personnel = snapshot.personnel.len(),
                    equipment = snapshot.equipment.len(),
                    "assets refreshed"
                );
                self.snapshot = snapshot;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to load assets");
                self.notices
                    .push(Notice::error(format!("failed to load assets: {err}")));
                Err(err.into())
            }
        }
    }

    /// Sets one project's share on one entity and recomputes its totals.
    /// Local only; nothing is sent until [`AssetsView::save`].
    pub fn edit_share(
        &mut self,
        kind: AssetKind,
        id: i64,
        project: &str,
        value: Option<f64>,
    ) -> ViewResult<&AllocationEntity> {
        validation::validate_project_key(project)?;
        validation::validate_edit_value(value)?;
        let slot = self
            .snapshot
            .entities_mut(kind)
            .iter_mut()
            .find(|entity| entity.id == id)
            .ok_or(ViewError::UnknownEntity { kind, id })?;
        *slot = allocation::apply_share(slot, project, value);
        Ok(&*slot)
    }

    /// Sends the entity's whole share map. Success triggers a full refresh;
    /// failure keeps the local edit and queues an error notice.
    pub async fn save(&mut self, kind: AssetKind, id: i64) -> ViewResult<()> {
        self.ensure_can_edit()?;
        let entity = self
            .snapshot
            .find(kind, id)
            .ok_or(ViewError::UnknownEntity { kind, id })?;
        let payload = SharesPayload::from_entity(entity);
        let name = entity.name.clone();

        match self.backend.save_shares(kind, id, &payload).await {
            Ok(()) => {
                tracing::info!(%kind, id, "allocation saved");
                self.notices
                    .push(Notice::success(format!("saved {kind} allocation for \"{name}\"")));
                self.refresh().await
            }
            Err(err) => {
                tracing::warn!(%kind, id, error = %err, "allocation save failed");
                self.notices.push(Notice::error(format!(
                    "failed to save {kind} allocation for \"{name}\": {err}"
                )));
                Err(err.into())
            }
        }
    }

    pub async fn add_personnel(&mut self, request: NewPersonnel) -> ViewResult<()> {
        self.ensure_can_edit()?;
        validation::validate_new_personnel(&request)?;
        match self.backend.create_personnel(&request).await {
            Ok(()) => {
                self.notices
                    .push(Notice::success(format!("registered \"{}\"", request.name)));
                self.refresh().await
            }
            Err(err) => {
                self.notices
                    .push(Notice::error(format!("failed to register personnel: {err}")));
                Err(err.into())
            }
        }
    }

    pub async fn add_equipment(&mut self, request: NewEquipment) -> ViewResult<()> {
        self.ensure_can_edit()?;
        validation::validate_new_equipment(&request)?;
        match self.backend.create_equipment(&request).await {
            Ok(()) => {
                self.notices
                    .push(Notice::success(format!("registered \"{}\"", request.name)));
                self.refresh().await
            }
            Err(err) => {
                self.notices
                    .push(Notice::error(format!("failed to register equipment: {err}")));
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
