use inkind_ledger::backend::{AssetBackend, HttpBackend};
use inkind_ledger::config::AppConfig;
use inkind_ledger::entity::AssetKind;
use inkind_ledger::export;
use inkind_ledger::ledger::Investment;
use inkind_ledger::process::{OrderStatus, ProcessOrder, ProcessStage};
use inkind_ledger::session::{Role, SessionManager};
use inkind_ledger::views::{AssetsView, LedgerView, Notice, ProcessView};
use inkind_ledger::wire::InvestmentForm;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

type DynBackend = dyn AssetBackend;

fn render_text_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (ci, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(ci) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let render_row = |cells: &[String]| {
        let mut line = String::from("|");
        for (ci, width) in widths.iter().enumerate() {
            let cell = cells.get(ci).map(String::as_str).unwrap_or("");
            line.push(' ');
            line.push_str(cell);
            line.push_str(&" ".repeat(width.saturating_sub(cell.chars().count())));
            line.push_str(" |");
        }
        line
    };

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(headers));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in rows {
        out.push_str(&render_row(row));
        out.push('\n');
    }
    out.push_str(&sep);
    out
}

/// `1234567` -> `1,234,567`
fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::new();
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

fn parse_value(s: &str) -> Result<Option<f64>, String> {
    if s == "-" {
        return Ok(None);
    }
    match s.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        _ => Err(format!("Invalid number '{s}' (use '-' to clear)")),
    }
}

fn print_help() {
    println!(
        "Commands:\n  help                               Show this help\n  login <admin|viewer> <password>    Sign in\n  logout                             Sign out\n  whoami                             Show the current session\n  refresh                            Reload assets, orders and the ledger\n  show [personnel|equipment]         Show allocation tables\n  share <kind> <id> <project> <value|->\n                                     Edit one share locally ('-' clears it)\n  save <kind> <id>                   Save an entity's shares\n  orders                             Show process orders\n  select <order_id|->                Select an order ('-' clears the selection)\n  hours <stage> <value|->            Edit a stage of the selected order\n  leadtime                           Show the selected order's lead time\n  savehours                          Save the selected order's stage hours\n  status <order_id> <label>          Change an order's status\n  investments                        Show the investment ledger\n  invest <round> <investor|-> <shares> <amount>\n                                     Record an investment\n  uninvest <id>                      Delete an investment\n  shareholders                       Show the shareholder summary\n  export <json|csv> <path>           Export the allocation sheet\n  quit|exit                          Exit"
    );
}

fn print_notices(notices: Vec<Notice>) {
    for notice in notices {
        let tag = if notice.is_error() { "error" } else { "ok" };
        println!("[{tag}] {}", notice.message);
    }
}

struct Workspace {
    assets: AssetsView<DynBackend>,
    process: ProcessView<DynBackend>,
    ledger: LedgerView<DynBackend>,
}

impl Workspace {
    /// Reloads every view, even after one of them failed.
    async fn refresh(&mut self) -> bool {
        let assets = self.assets.refresh().await;
        let process = self.process.refresh().await;
        let ledger = self.ledger.refresh().await;
        assets.is_ok() && process.is_ok() && ledger.is_ok()
    }

    fn drain_notices(&mut self) -> Vec<Notice> {
        let mut notices = self.assets.drain_notices();
        notices.extend(self.process.drain_notices());
        notices.extend(self.ledger.drain_notices());
        notices
    }
}

fn render_assets(assets: &AssetsView<DynBackend>, kind: AssetKind) -> String {
    let projects = assets.snapshot().project_columns();
    let base_label = match kind {
        AssetKind::Personnel => "salary",
        AssetKind::Equipment => "acquisition_cost",
    };
    let mut headers = vec!["id".to_string(), "name".to_string(), base_label.to_string()];
    headers.extend(projects.iter().cloned());
    headers.push("total_%".to_string());
    headers.push("total_amount".to_string());

    let rows: Vec<Vec<String>> = assets
        .entities(kind)
        .iter()
        .map(|entity| {
            let mut row = vec![
                entity.id.to_string(),
                entity.name.clone(),
                entity.base_value().to_string(),
            ];
            row.extend(projects.iter().map(|p| entity.share(p).to_string()));
            let mut percent = entity.total_percent().to_string();
            if entity.is_over_allocated() {
                percent.push_str(" !");
            }
            row.push(percent);
            row.push(group_thousands(entity.total_amount()));
            row
        })
        .collect();

    let totals = assets.totals(kind);
    format!(
        "{kind}\n{}\nbase total {} / allocated {} ({:.1}%)",
        render_text_table(&headers, &rows),
        totals.base_total,
        group_thousands(totals.grand_total),
        totals.ratio
    )
}

fn render_orders(orders: &[ProcessOrder], selected: Option<i64>) -> String {
    let headers: Vec<String> = [
        "", "id", "company", "product", "qty", "status", "unit_price", "margin_%", "lead_time_hr",
    ]
    .iter()
    .map(|h| h.to_string())
    .collect();
    let rows: Vec<Vec<String>> = orders
        .iter()
        .map(|order| {
            vec![
                if selected == Some(order.id) { "*" } else { "" }.to_string(),
                order.id.to_string(),
                order.company_name.clone(),
                order.product_name.clone(),
                order.quantity.to_string(),
                order.status.label().to_string(),
                group_thousands(order.unit_quote_price()),
                order
                    .margin_rate()
                    .map(|m| format!("{m:.1}"))
                    .unwrap_or_else(|| "-".to_string()),
                order.expected_lead_time_hr().to_string(),
            ]
        })
        .collect();
    render_text_table(&headers, &rows)
}

fn render_stage_hours(order: &ProcessOrder) -> String {
    let headers: Vec<String> = ProcessStage::ALL.iter().map(|s| s.key().to_string()).collect();
    let row: Vec<String> = ProcessStage::ALL
        .iter()
        .map(|stage| match order.process_times.hours(*stage) {
            Some(hours) => hours.to_string(),
            None => String::new(),
        })
        .collect();
    format!(
        "order {} ({})\n{}\nexpected lead time: {} hr",
        order.id,
        order.product_name,
        render_text_table(&headers, &[row]),
        order.expected_lead_time_hr()
    )
}

fn render_investments(investments: &[Investment]) -> String {
    let headers: Vec<String> = ["id", "round", "investor", "shares", "amount", "contract_date"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    let rows: Vec<Vec<String>> = investments
        .iter()
        .map(|inv| {
            vec![
                inv.id.to_string(),
                inv.round.clone(),
                inv.investor.clone(),
                group_thousands(inv.shares),
                inv.amount.to_string(),
                inv.contract_date.map(|d| d.to_string()).unwrap_or_default(),
            ]
        })
        .collect();
    render_text_table(&headers, &rows)
}

fn render_shareholders(ledger: &LedgerView<DynBackend>) -> String {
    let summary = ledger.summary();
    let headers: Vec<String> = ["investor", "shares", "amount", "percent"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    let rows: Vec<Vec<String>> = summary
        .holders
        .iter()
        .map(|holder| {
            vec![
                holder.investor.clone(),
                group_thousands(holder.shares),
                holder.amount.to_string(),
                format!("{:.2}", holder.percent),
            ]
        })
        .collect();
    format!(
        "{}\n{} rounds, {} shares, total amount {}",
        render_text_table(&headers, &rows),
        summary.round_count,
        group_thousands(summary.total_shares),
        summary.total_amount
    )
}

fn parse_args() -> Result<Option<PathBuf>, String> {
    let mut args = std::env::args().skip(1);
    let mut config_path = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => match args.next() {
                Some(path) => config_path = Some(PathBuf::from(path)),
                None => return Err("--config needs a path".to_string()),
            },
            other => return Err(format!("unexpected argument '{other}'")),
        }
    }
    Ok(config_path)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = parse_args()?;
    let config = AppConfig::load(config_path.as_deref())?;
    inkind_ledger::telemetry::init_from_config(&config.telemetry);

    let backend: Arc<DynBackend> = Arc::new(HttpBackend::from_config(&config.backend)?);
    let sessions = SessionManager::new();
    let mut workspace: Option<Workspace> = None;

    println!("In-kind Ledger (CLI) - type 'help' for commands");
    println!("backend: {}\n", config.backend.base_url);

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "login" => match (parts.next(), parts.next()) {
                (Some(role_s), Some(password)) => {
                    let role: Role = match role_s.parse() {
                        Ok(r) => r,
                        Err(e) => {
                            println!("{e}");
                            continue;
                        }
                    };
                    match sessions.login(backend.as_ref(), role, password).await {
                        Ok(session) => {
                            println!("Logged in as {}", session.role);
                            let mut ws = Workspace {
                                assets: AssetsView::new(backend.clone(), session.clone()),
                                process: ProcessView::new(backend.clone(), session.clone()),
                                ledger: LedgerView::new(backend.clone(), session),
                            };
                            // failures land in the notices printed below
                            ws.refresh().await;
                            print_notices(ws.drain_notices());
                            workspace = Some(ws);
                        }
                        Err(e) => println!("Login failed: {e}"),
                    }
                }
                _ => println!("Usage: login <admin|viewer> <password>"),
            },
            "logout" => {
                workspace = None;
                match sessions.logout() {
                    Some(session) => println!("Logged out {}", session.username),
                    None => println!("Not logged in"),
                }
            }
            "whoami" => match sessions.current() {
                Some(session) => println!(
                    "{} ({})",
                    session.username,
                    if session.can_edit() { "read/write" } else { "read-only" }
                ),
                None => println!("Not logged in"),
            },
            _ => {
                let Some(ws) = workspace.as_mut() else {
                    if matches!(
                        cmd,
                        "refresh" | "show" | "share" | "save" | "orders" | "select" | "hours"
                            | "leadtime" | "savehours" | "status" | "investments" | "invest"
                            | "uninvest" | "shareholders" | "export"
                    ) {
                        println!("Not logged in. Use 'login <role> <password>'.");
                    } else {
                        println!("Unknown command. Type 'help'.");
                    }
                    continue;
                };

                match cmd {
                    "refresh" => {
                        if ws.refresh().await {
                            println!("Refreshed.");
                        }
                    }
                    "show" => match parts.next() {
                        Some(kind_s) => match kind_s.parse::<AssetKind>() {
                            Ok(kind) => println!("{}", render_assets(&ws.assets, kind)),
                            Err(e) => println!("{e}"),
                        },
                        None => {
                            for kind in AssetKind::all() {
                                println!("{}\n", render_assets(&ws.assets, kind));
                            }
                        }
                    },
                    "share" => {
                        let args: Vec<&str> = parts.collect();
                        let &[kind_s, id_s, project, value_s] = args.as_slice() else {
                            println!("Usage: share <kind> <id> <project> <value|->");
                            continue;
                        };
                        let kind: AssetKind = match kind_s.parse() { Ok(k) => k, Err(e) => { println!("{e}"); continue; } };
                        let id: i64 = match id_s.parse() { Ok(v) => v, Err(_) => { println!("Invalid id"); continue; } };
                        let value = match parse_value(value_s) { Ok(v) => v, Err(e) => { println!("{e}"); continue; } };
                        match ws.assets.edit_share(kind, id, project, value) {
                            Ok(entity) => println!(
                                "{} {}: total {}% -> {} (unsaved)",
                                kind,
                                entity.name,
                                entity.total_percent(),
                                group_thousands(entity.total_amount())
                            ),
                            Err(e) => println!("Error: {e}"),
                        }
                    }
                    "save" => match (parts.next(), parts.next()) {
                        (Some(kind_s), Some(id_s)) => {
                            let kind: AssetKind = match kind_s.parse() { Ok(k) => k, Err(e) => { println!("{e}"); continue; } };
                            let id: i64 = match id_s.parse() { Ok(v) => v, Err(_) => { println!("Invalid id"); continue; } };
                            if let Err(e) = ws.assets.save(kind, id).await {
                                tracing::debug!(error = %e, "save command failed");
                                if ws.assets.notices().is_empty() {
                                    println!("Error: {e}");
                                }
                            }
                        }
                        _ => println!("Usage: save <kind> <id>"),
                    },
                    "orders" => {
                        let selected = ws.process.selected().map(|o| o.id);
                        println!("{}", render_orders(ws.process.orders(), selected));
                    }
                    "select" => match parts.next() {
                        Some("-") => {
                            ws.process.clear_selection();
                            println!("Selection cleared.");
                        }
                        Some(id_s) => {
                            let id: i64 = match id_s.parse() { Ok(v) => v, Err(_) => { println!("Invalid id"); continue; } };
                            match ws.process.select(id) {
                                Ok(order) => println!("{}", render_stage_hours(order)),
                                Err(e) => println!("Error: {e}"),
                            }
                        }
                        None => println!("Usage: select <order_id|->"),
                    },
                    "hours" => match (parts.next(), parts.next()) {
                        (Some(stage_s), Some(value_s)) => {
                            let stage: ProcessStage = match stage_s.parse() { Ok(s) => s, Err(e) => { println!("{e}"); continue; } };
                            let value = match parse_value(value_s) { Ok(v) => v, Err(e) => { println!("{e}"); continue; } };
                            match ws.process.set_stage_hours(stage, value) {
                                Ok(lead_time) => println!("{stage} set. expected lead time: {lead_time} hr (unsaved)"),
                                Err(e) => println!("Error: {e}"),
                            }
                        }
                        _ => println!("Usage: hours <stage> <value|->"),
                    },
                    "leadtime" => match ws.process.selected() {
                        Some(order) => println!("{}", render_stage_hours(order)),
                        None => println!("No order selected. Use 'select <order_id>'."),
                    },
                    "savehours" => {
                        if let Err(e) = ws.process.save_times().await {
                            tracing::debug!(error = %e, "savehours command failed");
                            if ws.process.notices().is_empty() {
                                println!("Error: {e}");
                            }
                        }
                    }
                    "status" => {
                        let (Some(id_s), Some(label)) = (parts.next(), parts.next()) else {
                            println!("Usage: status <order_id> <label>");
                            continue;
                        };
                        let id: i64 = match id_s.parse() { Ok(v) => v, Err(_) => { println!("Invalid id"); continue; } };
                        let status = OrderStatus::from(label);
                        if !status.is_known() {
                            tracing::debug!(%status, "unlisted order status");
                        }
                        if let Err(e) = ws.process.set_status(id, status).await {
                            tracing::debug!(error = %e, "status command failed");
                            if ws.process.notices().is_empty() {
                                println!("Error: {e}");
                            }
                        }
                    }
                    "investments" => println!("{}", render_investments(ws.ledger.investments())),
                    "invest" => {
                        let args: Vec<&str> = parts.collect();
                        let &[round, investor, shares_s, amount_s] = args.as_slice() else {
                            println!("Usage: invest <round> <investor|-> <shares> <amount>");
                            continue;
                        };
                        let shares: i64 = match shares_s.parse() { Ok(v) => v, Err(_) => { println!("Invalid share count '{shares_s}'"); continue; } };
                        let amount = match parse_value(amount_s) { Ok(Some(v)) => v, _ => { println!("Invalid amount '{amount_s}'"); continue; } };
                        let investor = if investor == "-" { "" } else { investor };
                        let form = InvestmentForm::new(round, investor, shares, amount);
                        if let Err(e) = ws.ledger.add(form).await {
                            tracing::debug!(error = %e, "invest command failed");
                            if ws.ledger.notices().is_empty() {
                                println!("Error: {e}");
                            }
                        }
                    }
                    "uninvest" => match parts.next() {
                        Some(id_s) => {
                            let id: i64 = match id_s.parse() { Ok(v) => v, Err(_) => { println!("Invalid id"); continue; } };
                            if let Err(e) = ws.ledger.delete(id).await {
                                tracing::debug!(error = %e, "uninvest command failed");
                                if ws.ledger.notices().is_empty() {
                                    println!("Error: {e}");
                                }
                            }
                        }
                        None => println!("Usage: uninvest <id>"),
                    },
                    "shareholders" => println!("{}", render_shareholders(&ws.ledger)),
                    "export" => match (parts.next(), parts.next()) {
                        (Some(format), Some(path)) => {
                            let snapshot = ws.assets.snapshot();
                            let result = match format {
                                "json" => export::export_assets_to_json(snapshot, path),
                                "csv" => export::export_assets_to_csv(snapshot, path),
                                _ => {
                                    println!("Usage: export <json|csv> <path>");
                                    continue;
                                }
                            };
                            match result {
                                Ok(()) => println!("Exported to {path}"),
                                Err(e) => println!("Export error: {e}"),
                            }
                        }
                        _ => println!("Usage: export <json|csv> <path>"),
                    },
                    _ => println!("Unknown command. Type 'help'."),
                }
                print_notices(ws.drain_notices());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands_with_sign() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(55_000), "55,000");
        assert_eq!(group_thousands(-1_234_567), "-1,234,567");
    }

    #[test]
    fn table_pads_to_widest_cell() {
        let table = render_text_table(
            &["id".to_string(), "name".to_string()],
            &[vec!["1".to_string(), "Kim".to_string()]],
        );
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "+----+------+");
        assert_eq!(lines[1], "| id | name |");
        assert_eq!(lines[3], "| 1  | Kim  |");
    }

    #[test]
    fn dash_clears_a_value() {
        assert_eq!(parse_value("-"), Ok(None));
        assert_eq!(parse_value("12.5"), Ok(Some(12.5)));
        assert!(parse_value("abc").is_err());
    }

    #[test]
    fn non_finite_values_are_rejected() {
        assert!(parse_value("NaN").is_err());
        assert!(parse_value("inf").is_err());
        assert!(parse_value("-infinity").is_err());
    }
}
