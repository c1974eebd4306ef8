use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

/// 报表查询周期（年/月）
///
/// Also serves as the request body for both report endpoints:
/// `{"year": .., "month": ..}`. The month is nominally 1-12 but is
/// never validated on this side; an out-of-range value is sent to the
/// backend unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodFilter {
    pub year: i32,
    pub month: u32,
}

impl PeriodFilter {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    /// Header label like "March 2024"; out-of-range months fall back
    /// to the raw number.
    pub fn label(&self) -> String {
        match month_name(self.month) {
            Some(name) => format!("{} {}", name, self.year),
            None => format!("Month {} {}", self.month, self.year),
        }
    }
}

impl Default for PeriodFilter {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            year: now.year(),
            month: now.month(),
        }
    }
}

/// 单个注册用户记录
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub masked_email: String,
    /// ISO-8601 date string, kept exactly as received.
    pub signup_date: String,
    pub name: String,
    pub has_active_plan: bool,
}

/// 注册报表响应
///
/// Replaced wholesale on every fetch. A `success: false` body is still
/// a valid report; missing fields render as 0 / empty downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupReport {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<UserRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_plans_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inactive_plans_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SignupReport {
    /// Percentage of signups holding an active plan, one decimal place.
    /// Zero (or absent) signups yield 0 regardless of the plan counts.
    pub fn conversion_rate(&self) -> f64 {
        let count = self.count.unwrap_or(0);
        if count <= 0 {
            return 0.0;
        }
        let active = self.active_plans_count.unwrap_or(0);
        (active as f64 / count as f64 * 100.0 * 10.0).round() / 10.0
    }
}

/// 收入报表响应
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueReport {
    pub success: bool,
    /// Currency units (dollars, not cents).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_revenue: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub fn month_name(month: u32) -> Option<&'static str> {
    MONTH_NAMES.get(month.checked_sub(1)? as usize).copied()
}

/// The ten-year selection window offered to the operator: five years
/// back through four years ahead of the current one.
pub fn year_options() -> Vec<i32> {
    let current = Utc::now().year();
    (current - 5..current + 5).collect()
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server_url: String,
    /// Partner slug in the referral endpoint path.
    pub partner: String,
    /// No timeout by default; requests rely on the transport's own
    /// behavior.
    pub timeout_seconds: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: "https://pre.dashboard.stepgenie.app".to_string(),
            partner: "manik".to_string(),
            timeout_seconds: None,
        }
    }
}
