use stepdash_client::{ReportSnapshot, format_summary, format_user_row};
use stepdash_sdk::{MONTH_NAMES, year_options};

/// Full report view: summary cards plus the signup table. A busy
/// snapshot renders only the loading indicator.
pub fn render_report(snapshot: &ReportSnapshot) -> String {
    if snapshot.busy {
        return "⏳ Loading reports...\n".to_string();
    }

    let mut out = String::new();
    out.push_str(&format!("📊 Dashboard - {}\n", snapshot.filter.label()));
    for line in format_summary(snapshot).lines() {
        out.push_str(&format!("  {}\n", line));
    }
    out.push('\n');
    out.push_str(&render_users_table(snapshot));
    out
}

pub fn render_users_table(snapshot: &ReportSnapshot) -> String {
    let period = snapshot.filter.label();
    let mut out = String::new();
    out.push_str(&format!("👥 User Signups - {}\n", period));
    out.push_str(&format!(
        "{} users signed up this month",
        snapshot.total_signups()
    ));
    if let Some(active) = snapshot.signup.as_ref().and_then(|r| r.active_plans_count) {
        out.push_str(&format!(" • {} with active plans", active));
    }
    out.push('\n');

    let users = snapshot.users();
    if users.is_empty() {
        out.push_str("No signups found\n");
        out.push_str(&format!("No users signed up in {}\n", period));
        return out;
    }

    out.push_str(&format!("{}\n", "─".repeat(60)));
    for user in users {
        out.push_str(&format_user_row(user));
        out.push('\n');
    }
    out
}

/// The selectable period window, mirroring the year/month dropdowns.
pub fn render_periods() -> String {
    let years = year_options()
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");

    let mut out = String::new();
    out.push_str(&format!("📅 Years: {}\n", years));
    out.push_str("📅 Months:\n");
    for (index, name) in MONTH_NAMES.iter().enumerate() {
        out.push_str(&format!("  {:>2}. {}\n", index + 1, name));
    }
    out
}
