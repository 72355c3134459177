use isolator_app_core::{DashboardVm, Notification, ProfileCardVm, Severity};
use isolator_core::ProfileStatusReport;

const HEADERS: [&str; 5] = ["NAME", "STATUS", "SIZE", "DESKTOP", "ACTION"];

fn row(card: &ProfileCardVm) -> [String; 5] {
    let action = match card.busy {
        Some(kind) => format!("{}...", kind.verb()),
        None => card.primary_action.label().to_string(),
    };
    [
        card.name.clone(),
        card.status_label.to_string(),
        card.size_label.clone(),
        if card.has_desktop_entry { "yes" } else { "no" }.to_string(),
        action,
    ]
}

/// Plain-text table of the dashboard, one line per profile.
pub fn render_dashboard(vm: &DashboardVm) -> String {
    if !vm.loaded {
        return "Loading profiles...\n".to_string();
    }
    if vm.is_empty() {
        return "No profiles yet. Create one with `isolator create <name>`.\n".to_string();
    }

    let rows: Vec<[String; 5]> = vm.cards.iter().map(row).collect();
    let mut widths = HEADERS.map(str::len);
    for r in &rows {
        for (w, cell) in widths.iter_mut().zip(r) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let mut push_line = |cells: &[&str]| {
        let line: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(cell, w)| format!("{cell:<w$}"))
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    };

    push_line(&HEADERS);
    for r in &rows {
        let cells: Vec<&str> = r.iter().map(String::as_str).collect();
        push_line(&cells);
    }
    out
}

pub fn render_notification(n: &Notification) -> String {
    let marker = match n.severity {
        Severity::Success => "::",
        Severity::Error => "!!",
    };
    format!("{marker} {}", n.message)
}

pub fn render_status(report: &ProfileStatusReport) -> String {
    format!(
        "{}: {} ({} MB)",
        report.name,
        report.status.label(),
        report.size_mb
    )
}
