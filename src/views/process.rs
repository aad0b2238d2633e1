use super::{Notice, ViewError, ViewResult};
use crate::backend::{AssetBackend, BackendError};
use crate::process::{OrderStatus, ProcessOrder, ProcessStage};
use crate::session::Session;
use crate::validation;
use crate::wire::{NewOrder, ProcessTimesPayload};
use std::sync::Arc;

/// Order list with one selected order whose sub-process hours can be edited.
pub struct ProcessView<B: AssetBackend + ?Sized> {
    backend: Arc<B>,
    session: Session,
    orders: Vec<ProcessOrder>,
    selected: Option<i64>,
    notices: Vec<Notice>,
}

impl<B: AssetBackend + ?Sized> ProcessView<B> {
    pub fn new(backend: Arc<B>, session: Session) -> Self {
        Self {
            backend,
            session,
            orders: Vec::new(),
            selected: None,
            notices: Vec::new(),
        }
    }

    pub fn orders(&self) -> &[ProcessOrder] {
        &self.orders
    }

    pub fn in_progress_orders(&self) -> impl Iterator<Item = &ProcessOrder> {
        self.orders
            .iter()
            .filter(|order| order.status == OrderStatus::InProgress)
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Reloads the order list. A selected order that no longer exists is
    /// deselected.
    pub async fn refresh(&mut self) -> ViewResult<()> {
        let fetched = self.backend.fetch_orders().await.and_then(|orders| {
            validation::validate_orders(&orders)?;
            Ok::<_, BackendError>(orders)
        });
        match fetched {
            Ok(orders) => {
                self.orders = orders;
                if let Some(id) = self.selected {
                    if !self.orders.iter().any(|order| order.id == id) {
                        tracing::debug!(order_id = id, "selected order disappeared");
                        self.selected = None;
                    }
                }
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to load orders");
                self.notices
                    .push(Notice::error(format!("failed to load orders: {err}")));
                Err(err.into())
            }
        }
    }

    pub fn select(&mut self, order_id: i64) -> ViewResult<&ProcessOrder> {
        let order = self
            .orders
            .iter()
            .find(|order| order.id == order_id)
            .ok_or(ViewError::UnknownOrder(order_id))?;
        self.selected = Some(order_id);
        Ok(order)
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&ProcessOrder> {
        let id = self.selected?;
        self.orders.iter().find(|order| order.id == id)
    }

    /// Lead time of the selected order, derived from its current stage hours.
    pub fn expected_lead_time(&self) -> Option<f64> {
        self.selected().map(ProcessOrder::expected_lead_time_hr)
    }

    /// Edits one stage of the selected order locally and returns the new lead
    /// time.
    pub fn set_stage_hours(&mut self, stage: ProcessStage, hours: Option<f64>) -> ViewResult<f64> {
        validation::validate_edit_value(hours)?;
        let id = self.selected.ok_or(ViewError::NoSelection)?;
        let order = self
            .orders
            .iter_mut()
            .find(|order| order.id == id)
            .ok_or(ViewError::UnknownOrder(id))?;
        order.process_times.set_hours(stage, hours);
        Ok(order.expected_lead_time_hr())
    }

    pub async fn save_times(&mut self) -> ViewResult<()> {
        self.ensure_can_edit()?;
        let order = self.selected().ok_or(ViewError::NoSelection)?;
        let payload = ProcessTimesPayload {
            order_id: order.id,
            times: order.process_times.clone(),
        };
        match self.backend.save_process_times(&payload).await {
            Ok(()) => {
                tracing::info!(order_id = payload.order_id, "process times saved");
                self.notices.push(Notice::success(format!(
                    "saved process times for order {}",
                    payload.order_id
                )));
                self.refresh().await
            }
            Err(err) => {
                tracing::warn!(order_id = payload.order_id, error = %err, "process time save failed");
                self.notices.push(Notice::error(format!(
                    "failed to save process times for order {}: {err}",
                    payload.order_id
                )));
                Err(err.into())
            }
        }
    }

    /// Moves an order to `status` and sends the whole order back. The new
    /// status stays in the local list when the save fails.
    pub async fn set_status(&mut self, order_id: i64, status: OrderStatus) -> ViewResult<()> {
        self.ensure_can_edit()?;
        let order = self
            .orders
            .iter_mut()
            .find(|order| order.id == order_id)
            .ok_or(ViewError::UnknownOrder(order_id))?;
        order.status = status;
        let order = order.clone();

        match self.backend.update_order(&order).await {
            Ok(()) => {
                tracing::info!(order_id, status = %order.status, "order status changed");
                self.notices.push(Notice::success(format!(
                    "order {order_id} is now {}",
                    order.status
                )));
                self.refresh().await
            }
            Err(err) => {
                tracing::warn!(order_id, error = %err, "order status change failed");
                self.notices.push(Notice::error(format!(
                    "failed to change status of order {order_id}: {err}"
                )));
                Err(err.into())
            }
        }
    }

    pub async fn add_order(&mut self, request: NewOrder) -> ViewResult<()> {
        self.ensure_can_edit()?;
        validation::validate_new_order(&request)?;
        match self.backend.create_order(&request).await {
            Ok(()) => {
                self.notices.push(Notice::success(format!(
                    "registered order for \"{}\"",
                    request.product_name
                )));
                self.refresh().await
            }
            Err(err) => {
                self.notices
                    .push(Notice::error(format!("failed to register order: {err}")));
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
