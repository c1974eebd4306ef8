use crate::SdkResult;
use crate::error::*;
use reqwest::Client;
use std::time::Duration;
use stepdash_core::{AppConfig, PeriodFilter, RevenueReport, SignupReport};
use url::Url;

#[derive(Clone)]
pub struct ReportClient {
    client: Client,
    pub base_url: String,
    pub partner: String,
    pub timeout: Option<Duration>,
}

impl ReportClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            partner: "manik".to_string(),
            timeout: None,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let mut client = Self::new(&config.server_url).with_partner(&config.partner);
        if let Some(secs) = config.timeout_seconds {
            client = client.with_timeout(Duration::from_secs(secs));
        }
        client
    }

    pub fn with_partner(mut self, partner: &str) -> Self {
        self.partner = partner.to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// POST the period filter as a JSON body and decode the response.
    ///
    /// Transport problems (connection errors, bad status, a body that
    /// is not valid JSON) come back as `SdkError`. A body carrying
    /// `success: false` decodes normally and is returned as-is.
    async fn post_report<T>(&self, endpoint: &str, filter: &PeriodFilter) -> SdkResult<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = Url::parse(&format!(
            "{}/api/referral/{}/{}",
            self.base_url, self.partner, endpoint
        ))?;
        let mut request = self.client.post(url).json(filter);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let response = response.error_for_status()?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    pub async fn fetch_signup_report(&self, filter: &PeriodFilter) -> SdkResult<SignupReport> {
        self.post_report("users", filter).await
    }

    pub async fn fetch_revenue_report(&self, filter: &PeriodFilter) -> SdkResult<RevenueReport> {
        self.post_report("revenue", filter).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_client_creation() {
        let client = ReportClient::new("https://pre.dashboard.stepgenie.app");
        assert_eq!(client.base_url, "https://pre.dashboard.stepgenie.app");
        assert_eq!(client.partner, "manik");
        assert!(client.timeout.is_none());
    }

    #[tokio::test]
    async fn test_client_url_trimming() {
        let client = ReportClient::new("http://localhost:3000/");
        assert_eq!(client.base_url, "http://localhost:3000");

        // trim_end_matches removes all trailing slashes
        let client = ReportClient::new("http://localhost:3000///");
        assert_eq!(client.base_url, "http://localhost:3000");
    }

    #[tokio::test]
    async fn test_client_with_timeout() {
        let client = ReportClient::new("http://localhost:3000")
            .with_timeout(Duration::from_secs(60));
        assert_eq!(client.timeout, Some(Duration::from_secs(60)));
    }

    #[tokio::test]
    async fn test_client_with_partner() {
        let client = ReportClient::new("http://localhost:3000").with_partner("acme");
        assert_eq!(client.partner, "acme");
    }

    #[test]
    fn test_client_from_config() {
        let config = AppConfig {
            server_url: "http://localhost:3000/".to_string(),
            partner: "acme".to_string(),
            timeout_seconds: Some(15),
        };
        let client = ReportClient::from_config(&config);
        assert_eq!(client.base_url, "http://localhost:3000");
        assert_eq!(client.partner, "acme");
        assert_eq!(client.timeout, Some(Duration::from_secs(15)));
    }

    #[tokio::test]
    async fn test_invalid_base_url_is_reported() {
        let client = ReportClient::new("not a url");
        let filter = PeriodFilter::new(2024, 3);
        match client.fetch_signup_report(&filter).await {
            Err(SdkError::InvalidUrl(_)) => {}
            other => panic!("expected InvalidUrl, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_sdk_result_type() {
        fn returns_success() -> SdkResult<String> {
            Ok("success".to_string())
        }

        assert!(returns_success().is_ok());
    }
}
