pub mod allocation;
pub mod lead_time;
pub mod order_metrics;
pub mod shareholders;
