#![allow(dead_code)]

use inkind_ledger::InMemoryBackend;
use inkind_ledger::ledger::Investment;
use inkind_ledger::process::{OrderStatus, ProcessOrder, ProcessStage, ProcessTimeBreakdown};
use inkind_ledger::session::Role;
use inkind_ledger::wire::{EquipmentRow, PersonnelRow};
use std::sync::Arc;

pub const ADMIN_PASSWORD: &str = "admin-pw";
pub const VIEWER_PASSWORD: &str = "viewer-pw";

/// Two projects, two people, one machine, two orders and two ledger
/// entries.
pub fn seeded_backend() -> Arc<InMemoryBackend> {
    let backend = InMemoryBackend::new()
        .with_projects(["A", "B"])
        .with_password(Role::Admin, ADMIN_PASSWORD)
        .with_password(Role::Viewer, VIEWER_PASSWORD);

    let mut kim = PersonnelRow::new(1, "Kim", 50_000.0)
        .with_share("A", Some(40.0))
        .with_share("B", Some(60.0));
    kim.total_amount = Some(1.0);
    backend.insert_personnel(kim);
    backend.insert_personnel(PersonnelRow::new(2, "Lee", 30_000.0).with_share("A", None));
    backend.insert_equipment(EquipmentRow::new(10, "Printer", 1_000.0).with_share("B", Some(50.0)));

    let mut quoted = ProcessOrder::new(100, "ACME", "Impeller");
    quoted.quantity = 4;
    quoted.total_quote_price = 1_000_000.0;
    quoted.manufacturing_cost = 800_000.0;
    quoted.status = OrderStatus::Quoting;
    quoted.process_times = ProcessTimeBreakdown::default()
        .with_hours(ProcessStage::Design, Some(2.0))
        .with_hours(ProcessStage::Printing, Some(5.5));
    backend.insert_order(quoted);

    let mut running = ProcessOrder::new(101, "Globex", "Housing");
    running.status = OrderStatus::InProgress;
    backend.insert_order(running);

    backend.insert_investment(Investment::new(1, "Seed", "Alpha").with_position(1_000, 50.0));
    backend.insert_investment(Investment::new(2, "Series A", "").with_position(3_000, 150.0));

    Arc::new(backend)
}
