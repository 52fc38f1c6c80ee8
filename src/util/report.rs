use crate::models::{Controller, LogicalDrive, PhysicalDrive};

const RULE: &str = "═══════════════════════════════════════════════";

/// Generate a human-readable controller report to a String.
pub fn generate(controllers: &[Controller]) -> String {
    let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    let mut out = String::new();

    out.push_str(&format!("{}\n", RULE));
    out.push_str(&format!("  arcscan Controller Report, {}\n", now));
    out.push_str(&format!("{}\n\n", RULE));

    // ── Attention ──────────────────────────────────────────────────────
    let issues = attention(controllers);
    out.push_str(&format!("── Attention ({}) ──────────────────────────────\n", issues.len()));
    if issues.is_empty() {
        out.push_str("  ● All controllers nominal\n");
    } else {
        for issue in &issues {
            out.push_str(&format!("  [!]  {}\n", issue));
        }
    }
    out.push('\n');

    for ctl in controllers {
        out.push_str(&controller_section(ctl));
    }

    out.push_str(RULE);
    out.push('\n');
    out
}

fn controller_section(ctl: &Controller) -> String {
    let mut out = String::new();
    out.push_str(&format!("── Controller {} ──────────────────────────────\n", ctl.id));
    out.push_str(&format!(
        "  Model: {}  Mode: {}  Status: {}\n",
        or_dash(ctl.model()),
        or_dash(ctl.fields.text("controller_mode")),
        or_dash(ctl.status()),
    ));
    if let Some(fw) = ctl.versions().and_then(|v| v.get("firmware")).and_then(|p| p.as_value()) {
        out.push_str(&format!("  Firmware: {}\n", fw.render()));
    }
    out.push('\n');

    if !ctl.logical_drives.is_empty() {
        out.push_str(&format!("  Logical Drives ({})\n", ctl.logical_drives.len()));
        out.push_str(&format!(
            "  {:<4} {:<16} {:<7} {:>10} {:<10} {}\n",
            "ID", "Name", "RAID", "Size", "Status", "Members"
        ));
        out.push_str(&format!("  {}\n", "─".repeat(68)));
        for ld in &ctl.logical_drives {
            out.push_str(&format!(
                "  {:<4} {:<16} {:<7} {:>10} {:<10} {}\n",
                ld.id,
                or_dash(ld.name()),
                or_dash(&ld.raid()),
                or_dash(ld.size()),
                or_dash(ld.status()),
                ld.segments.len(),
            ));
        }
        out.push('\n');
    }

    if !ctl.arrays.is_empty() {
        out.push_str(&format!("  Arrays ({})\n", ctl.arrays.len()));
        for ar in &ctl.arrays {
            out.push_str(&format!(
                "  {:<4} {:<16} {:<10} {:>10}  drives: {}  logical: {:?}\n",
                ar.id,
                or_dash(ar.name()),
                or_dash(ar.status()),
                or_dash(ar.size()),
                ar.members.drives.iter().map(|a| a.to_string()).collect::<Vec<_>>().join(" "),
                ar.members.logical_drives,
            ));
        }
        out.push('\n');
    }

    out.push_str(&format!("  Physical Drives ({})\n", ctl.drives.len()));
    out.push_str(&format!(
        "  {:<6} {:<10} {:<24} {:<20} {:>10}\n",
        "Addr", "State", "Model", "Serial", "Size"
    ));
    out.push_str(&format!("  {}\n", "─".repeat(68)));
    for pd in &ctl.drives {
        out.push_str(&format!(
            "  {:<6} {:<10} {:<24} {:<20} {:>10}\n",
            pd.address.to_string(),
            or_dash(pd.state()),
            or_dash(pd.model()),
            or_dash(pd.serial()),
            or_dash(pd.size()),
        ));
    }
    for enc in &ctl.enclosures {
        out.push_str(&format!("  {:<6} {:<10} {}\n", enc.address.to_string(), enc.name(), or_dash(enc.model())));
    }
    out.push('\n');

    if !ctl.tasks.is_empty() {
        out.push_str(&format!("  Tasks ({})\n", ctl.tasks.len()));
        for task in &ctl.tasks {
            out.push_str(&format!(
                "  {}  {}  {}%\n",
                or_dash(task.operation()),
                or_dash(task.status()),
                or_dash(task.percent_complete()),
            ));
        }
        out.push('\n');
    }
    out
}

/// One line per entity whose reported status is not a healthy one.
pub fn attention(controllers: &[Controller]) -> Vec<String> {
    let mut issues = Vec::new();
    for ctl in controllers {
        if !ctl.status().is_empty() && !ctl.status().eq_ignore_ascii_case("optimal") {
            issues.push(format!("controller {}: status {}", ctl.id, ctl.status()));
        }
        issues.extend(ctl.logical_drives.iter().filter(|ld| !ld_healthy(ld)).map(|ld| {
            format!("controller {} logical drive {} ({}): {}", ctl.id, ld.id, or_dash(ld.name()), ld.status())
        }));
        issues.extend(ctl.drives.iter().filter(|pd| !pd_healthy(pd)).map(|pd| {
            format!("controller {} drive {} ({}): {}", ctl.id, pd.address, or_dash(pd.serial()), pd.state())
        }));
    }
    issues
}

fn ld_healthy(ld: &LogicalDrive) -> bool {
    ld.status().is_empty() || ld.status().eq_ignore_ascii_case("optimal")
}

fn pd_healthy(pd: &PhysicalDrive) -> bool {
    let state = pd.state().to_lowercase();
    state.is_empty() || ["online", "ready", "hot spare", "raw"].iter().any(|s| state.starts_with(s))
}

fn or_dash(s: &str) -> &str {
    if s.is_empty() { "—" } else { s }
}
