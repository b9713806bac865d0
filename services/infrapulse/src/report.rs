//! Plain text lines describing check results

use crate::checker::{CheckResult, Status};

/// One line describing a result, e.g. `[DOWN] Router (10.0.0.1): Host is down`
/// for ping units or `[UP] Web (example.com) port 443` for port units.
pub fn result_line(result: &CheckResult) -> String {
    let unit = &result.unit;
    let mut line = match (unit.port, result.status) {
        (None, Status::Up) => format!("[UP] {} ({}): Host is up", unit.name, unit.host),
        (None, Status::Down) => format!("[DOWN] {} ({}): Host is down", unit.name, unit.host),
        (Some(port), status) => format!("[{}] {} ({}) port {}", status, unit.name, unit.host, port),
    };
    if let Some(error) = &result.error {
        line.push_str(" - ");
        line.push_str(error);
    }
    line
}

/// Log every result of a cycle at a level that matches its status
pub fn log_results(results: &[CheckResult]) {
    for result in results {
        if result.is_down() {
            tracing::warn!("{}", result_line(result));
        } else {
            tracing::info!("{}", result_line(result));
        }
    }
}
