use super::{AssetBackend, BackendError, BackendResult};
use crate::entity::AssetKind;
use crate::ledger::Investment;
use crate::process::ProcessOrder;
use crate::session::Role;
use crate::wire::{
    AssetsResponse, EquipmentRow, InvestmentForm, LoginRequest, LoginResponse, NewEquipment,
    NewOrder, NewPersonnel, PersonnelRow, ProcessTimesPayload, SharesPayload,
};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Debug, Default)]
struct MemoryState {
    projects: Vec<String>,
    personnel: Vec<PersonnelRow>,
    equipment: Vec<EquipmentRow>,
    orders: Vec<ProcessOrder>,
    investments: Vec<Investment>,
    passwords: HashMap<Role, String>,
    fail_reads: bool,
    fail_writes: bool,
    requests: Vec<String>,
}

/// Backend stand-in that keeps everything in process. Writes replace stored
/// rows wholesale, so concurrent saves resolve as last-write-wins, like the
/// real backend.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    state: Mutex<MemoryState>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_projects<I, S>(self, projects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.state.lock().projects = projects.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_password(self, role: Role, password: impl Into<String>) -> Self {
        self.state.lock().passwords.insert(role, password.into());
        self
    }

    pub fn insert_personnel(&self, row: PersonnelRow) {
        self.state.lock().personnel.push(row);
    }

    pub fn insert_equipment(&self, row: EquipmentRow) {
        self.state.lock().equipment.push(row);
    }

    pub fn insert_order(&self, order: ProcessOrder) {
        self.state.lock().orders.push(order);
    }

    pub fn insert_investment(&self, investment: Investment) {
        self.state.lock().investments.push(investment);
    }

    pub fn remove_order(&self, order_id: i64) {
        self.state.lock().orders.retain(|order| order.id != order_id);
    }

    /// Makes every subsequent read fail with a 503.
    pub fn fail_reads(&self, fail: bool) {
        self.state.lock().fail_reads = fail;
    }

    /// Makes every subsequent write fail with a 503.
    pub fn fail_writes(&self, fail: bool) {
        self.state.lock().fail_writes = fail;
    }

    /// Requests served so far, as `METHOD path`.
    pub fn requests(&self) -> Vec<String> {
        self.state.lock().requests.clone()
    }

    pub fn request_count(&self, request: &str) -> usize {
        self.state
            .lock()
            .requests
            .iter()
            .filter(|r| r.as_str() == request)
            .count()
    }

    pub fn stored_personnel(&self, id: i64) -> Option<PersonnelRow> {
        let state = self.state.lock();
        state.personnel.iter().find(|row| row.person_id == id).cloned()
    }

    pub fn stored_equipment(&self, id: i64) -> Option<EquipmentRow> {
        let state = self.state.lock();
        state.equipment.iter().find(|row| row.equipment_id == id).cloned()
    }

    pub fn stored_order(&self, id: i64) -> Option<ProcessOrder> {
        let state = self.state.lock();
        state.orders.iter().find(|order| order.id == id).cloned()
    }

    pub fn stored_investments(&self) -> Vec<Investment> {
        self.state.lock().investments.clone()
    }

    fn read(&self, request: &str) -> BackendResult<parking_lot::MutexGuard<'_, MemoryState>> {
        let mut state = self.state.lock();
        state.requests.push(request.to_string());
        if state.fail_reads {
            return Err(unavailable());
        }
        Ok(state)
    }

    fn write(&self, request: &str) -> BackendResult<parking_lot::MutexGuard<'_, MemoryState>> {
        let mut state = self.state.lock();
        state.requests.push(request.to_string());
        if state.fail_writes {
            return Err(unavailable());
        }
        Ok(state)
    }
}

fn unavailable() -> BackendError {
    BackendError::Status {
        status: 503,
        body: "backend unavailable".to_string(),
    }
}

fn next_id<I: Iterator<Item = i64>>(ids: I) -> i64 {
    ids.max().map(|max| max + 1).unwrap_or(1)
}

#[async_trait]
impl AssetBackend for InMemoryBackend {
    async fn login(&self, request: &LoginRequest) -> BackendResult<LoginResponse> {
        let state = self.read("POST login")?;
        let role: Role = request
            .username
            .parse()
            .map_err(|_| BackendError::Unauthorized)?;
        match state.passwords.get(&role) {
            Some(expected) if *expected == request.password => Ok(LoginResponse { role }),
            _ => Err(BackendError::Unauthorized),
        }
    }

    async fn fetch_assets(&self) -> BackendResult<AssetsResponse> {
        let state = self.read("GET assets")?;
        Ok(AssetsResponse {
            projects: state.projects.clone(),
            personnel_rows: state.personnel.clone(),
            equipment_rows: state.equipment.clone(),
            ..Default::default()
        })
    }

    async fn save_shares(
        &self,
        kind: AssetKind,
        id: i64,
        payload: &SharesPayload,
    ) -> BackendResult<()> {
        let mut state = self.write(&format!("PUT {kind}/{id}/shares"))?;
        let shares = payload
            .shares
            .iter()
            .map(|(project, value)| (project.clone(), Some(*value)))
            .collect();
        match kind {
            AssetKind::Personnel => {
                let row = state
                    .personnel
                    .iter_mut()
                    .find(|row| row.person_id == id)
                    .ok_or_else(|| BackendError::NotFound(format!("personnel {id}")))?;
                row.shares = shares;
            }
            AssetKind::Equipment => {
                let row = state
                    .equipment
                    .iter_mut()
                    .find(|row| row.equipment_id == id)
                    .ok_or_else(|| BackendError::NotFound(format!("equipment {id}")))?;
                row.shares = shares;
            }
        }
        Ok(())
    }

    async fn create_personnel(&self, request: &NewPersonnel) -> BackendResult<()> {
        let mut state = self.write("POST personnel")?;
        let id = next_id(state.personnel.iter().map(|row| row.person_id));
        let mut row = PersonnelRow::new(id, request.name.clone(), request.salary);
        row.department = request.department.clone();
        state.personnel.push(row);
        Ok(())
    }

    async fn create_equipment(&self, request: &NewEquipment) -> BackendResult<()> {
        let mut state = self.write("POST equipment")?;
        let id = next_id(state.equipment.iter().map(|row| row.equipment_id));
        let mut row = EquipmentRow::new(id, request.name.clone(), request.acquisition_cost);
        row.acquisition_date = request.acquisition_date;
        state.equipment.push(row);
        Ok(())
    }

    async fn fetch_orders(&self) -> BackendResult<Vec<ProcessOrder>> {
        let state = self.read("GET process/orders")?;
        Ok(state.orders.clone())
    }

    async fn save_process_times(&self, payload: &ProcessTimesPayload) -> BackendResult<()> {
        let mut state =
            self.write(&format!("PUT process/orders/{}/times", payload.order_id))?;
        let order = state
            .orders
            .iter_mut()
            .find(|order| order.id == payload.order_id)
            .ok_or_else(|| BackendError::NotFound(format!("order {}", payload.order_id)))?;
        order.process_times = payload.times.clone();
        Ok(())
    }

    async fn update_order(&self, order: &ProcessOrder) -> BackendResult<()> {
        let mut state = self.write(&format!("PUT process/orders/{}", order.id))?;
        let stored = state
            .orders
            .iter_mut()
            .find(|stored| stored.id == order.id)
            .ok_or_else(|| BackendError::NotFound(format!("order {}", order.id)))?;
        *stored = order.clone();
        Ok(())
    }

    async fn create_order(&self, request: &NewOrder) -> BackendResult<()> {
        let mut state = self.write("POST process/orders")?;
        let id = next_id(state.orders.iter().map(|order| order.id));
        let mut order = ProcessOrder::new(id, request.company_name.clone(), request.product_name.clone());
        order.quote_date = request.quote_date;
        order.category = request.category.clone();
        order.quantity = request.quantity;
        order.manufacturing_cost = request.manufacturing_cost;
        order.total_quote_price = request.total_quote_price;
        order.status = request.status.clone();
        order.due_date = request.due_date;
        order.actual_order_amount = request.actual_order_amount;
        state.orders.push(order);
        Ok(())
    }

    async fn fetch_investments(&self) -> BackendResult<Vec<Investment>> {
        let state = self.read("GET investments")?;
        Ok(state.investments.clone())
    }

    async fn create_investment(&self, form: &InvestmentForm) -> BackendResult<()> {
        let mut state = self.write("POST investments")?;
        let id = next_id(state.investments.iter().map(|investment| investment.id));
        state.investments.push(form.clone().into_investment(id));
        Ok(())
    }

    async fn update_investment(&self, id: i64, form: &InvestmentForm) -> BackendResult<()> {
        let mut state = self.write(&format!("PUT investments/{id}"))?;
        let stored = state
            .investments
            .iter_mut()
            .find(|investment| investment.id == id)
            .ok_or_else(|| BackendError::NotFound(format!("investment {id}")))?;
        *stored = form.clone().into_investment(id);
        Ok(())
    }

    async fn delete_investment(&self, id: i64) -> BackendResult<()> {
        let mut state = self.write(&format!("DELETE investments/{id}"))?;
        let before = state.investments.len();
        state.investments.retain(|investment| investment.id != id);
        if state.investments.len() == before {
            return Err(BackendError::NotFound(format!("investment {id}")));
        }
        Ok(())
    }
}
