use anyhow::Result;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use stepdash_sdk::{PeriodFilter, ReportClient, RevenueReport, SignupReport, UserRecord};

/// 共享的仪表盘状态管理
///
/// Owns the selected period, the two reports fetched for it and the
/// busy flag. All reads go through [`DashboardState::snapshot`]; the
/// stored reports only change via [`DashboardState::load_reports`] or
/// a filter change.
#[derive(Clone)]
pub struct DashboardState {
    pub client: ReportClient,
    filter: Arc<Mutex<PeriodFilter>>,
    signup: Arc<Mutex<Option<SignupReport>>>,
    revenue: Arc<Mutex<Option<RevenueReport>>>,
    busy: Arc<AtomicBool>,
    generation: Arc<AtomicU64>,
}

impl DashboardState {
    pub fn new(server_url: &str) -> Self {
        Self::with_client(ReportClient::new(server_url))
    }

    pub fn with_client(client: ReportClient) -> Self {
        Self {
            client,
            filter: Arc::new(Mutex::new(PeriodFilter::default())),
            signup: Arc::new(Mutex::new(None)),
            revenue: Arc::new(Mutex::new(None)),
            busy: Arc::new(AtomicBool::new(false)),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    pub fn filter(&self) -> PeriodFilter {
        *self.filter.lock().unwrap()
    }

    /// 只读状态快照
    pub fn snapshot(&self) -> ReportSnapshot {
        ReportSnapshot {
            filter: *self.filter.lock().unwrap(),
            signup: self.signup.lock().unwrap().clone(),
            revenue: self.revenue.lock().unwrap().clone(),
            busy: self.busy.load(Ordering::SeqCst),
        }
    }

    /// Update the year. A changed value invalidates the stored reports
    /// and means the caller should reload.
    pub fn set_year(&self, year: i32) -> bool {
        let mut filter = self.filter.lock().unwrap();
        if filter.year == year {
            return false;
        }
        filter.year = year;
        drop(filter);
        self.invalidate();
        true
    }

    /// Update the month. No range check: an out-of-range month goes to
    /// the backend as-is.
    pub fn set_month(&self, month: u32) -> bool {
        let mut filter = self.filter.lock().unwrap();
        if filter.month == month {
            return false;
        }
        filter.month = month;
        drop(filter);
        self.invalidate();
        true
    }

    fn invalidate(&self) {
        *self.signup.lock().unwrap() = None;
        *self.revenue.lock().unwrap() = None;
    }

    /// Select a period and load its reports: one filter change, one
    /// new pair of requests.
    pub async fn select_period(&self, year: i32, month: u32) -> ReportSnapshot {
        self.set_year(year);
        self.set_month(month);
        self.load_reports().await
    }

    /// 拉取两份报表并更新状态
    ///
    /// The two requests run concurrently and both must settle before
    /// the busy flag clears. A transport failure on either side is
    /// logged and leaves that report as "no data" without touching the
    /// other; a `success: false` body is stored as-is. If another
    /// `load_reports` started in the meantime, this (stale) pair is
    /// dropped and the newer call is left to clear the busy flag.
    pub async fn load_reports(&self) -> ReportSnapshot {
        let filter = *self.filter.lock().unwrap();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.busy.store(true, Ordering::SeqCst);

        let (signup, revenue) = tokio::join!(
            self.client.fetch_signup_report(&filter),
            self.client.fetch_revenue_report(&filter),
        );

        let signup = match signup {
            Ok(report) => Some(report),
            Err(err) => {
                tracing::error!("failed to fetch signup report: {err}");
                None
            }
        };
        let revenue = match revenue {
            Ok(report) => Some(report),
            Err(err) => {
                tracing::error!("failed to fetch revenue report: {err}");
                None
            }
        };

        if self.generation.load(Ordering::SeqCst) == generation {
            *self.signup.lock().unwrap() = signup;
            *self.revenue.lock().unwrap() = revenue;
            self.busy.store(false, Ordering::SeqCst);
        }

        self.snapshot()
    }

    /// 单独拉取注册报表
    pub async fn fetch_signups(&self) -> Result<SignupReport> {
        let filter = *self.filter.lock().unwrap();
        let report = self.client.fetch_signup_report(&filter).await?;
        *self.signup.lock().unwrap() = Some(report.clone());
        Ok(report)
    }

    /// 单独拉取收入报表
    pub async fn fetch_revenue(&self) -> Result<RevenueReport> {
        let filter = *self.filter.lock().unwrap();
        let report = self.client.fetch_revenue_report(&filter).await?;
        *self.revenue.lock().unwrap() = Some(report.clone());
        Ok(report)
    }
}

/// Read-only view of the dashboard state at one point in time.
#[derive(Debug, Clone)]
pub struct ReportSnapshot {
    pub filter: PeriodFilter,
    pub signup: Option<SignupReport>,
    pub revenue: Option<RevenueReport>,
    pub busy: bool,
}

impl ReportSnapshot {
    pub fn total_signups(&self) -> i64 {
        self.signup.as_ref().and_then(|r| r.count).unwrap_or(0)
    }

    pub fn active_plans(&self) -> i64 {
        self.signup
            .as_ref()
            .and_then(|r| r.active_plans_count)
            .unwrap_or(0)
    }

    pub fn inactive_plans(&self) -> i64 {
        self.signup
            .as_ref()
            .and_then(|r| r.inactive_plans_count)
            .unwrap_or(0)
    }

    pub fn conversion_rate(&self) -> f64 {
        self.signup
            .as_ref()
            .map(|r| r.conversion_rate())
            .unwrap_or(0.0)
    }

    pub fn total_revenue(&self) -> f64 {
        self.revenue
            .as_ref()
            .and_then(|r| r.total_revenue)
            .unwrap_or(0.0)
    }

    pub fn users(&self) -> &[UserRecord] {
        self.signup
            .as_ref()
            .and_then(|r| r.users.as_deref())
            .unwrap_or(&[])
    }
}

/// US-dollar display, e.g. `$1,999.50`.
pub fn format_currency(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let dollars = (cents / 100).to_string();
    let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
    for (i, ch) in dollars.chars().enumerate() {
        if i > 0 && (dollars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!(
        "{}${}.{:02}",
        if negative { "-" } else { "" },
        grouped,
        cents % 100
    )
}

/// Short date display for a signup date, e.g. `Mar 5, 2024`.
/// Unparseable input is shown unchanged.
pub fn format_signup_date(raw: &str) -> String {
    if let Ok(datetime) = chrono::DateTime::parse_from_rfc3339(raw) {
        return datetime.format("%b %-d, %Y").to_string();
    }
    if let Ok(date) = chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format("%b %-d, %Y").to_string();
    }
    raw.to_string()
}

/// 格式化汇总信息显示
pub fn format_summary(snapshot: &ReportSnapshot) -> String {
    let period = snapshot.filter.label();
    format!(
        "Total Signups: {} ({period})\nActive Plans: {} ({:.1}% conversion)\nNo Plans: {} (Free users)\nTotal Revenue: {} ({period})",
        snapshot.total_signups(),
        snapshot.active_plans(),
        snapshot.conversion_rate(),
        snapshot.inactive_plans(),
        format_currency(snapshot.total_revenue()),
    )
}

/// 格式化单行用户记录显示
pub fn format_user_row(user: &UserRecord) -> String {
    let status = if user.has_active_plan {
        "✅ Active"
    } else {
        "⚪ Free"
    };
    format!(
        "{} | {} | {} | {}",
        user.name,
        user.masked_email,
        format_signup_date(&user.signup_date),
        status
    )
}
