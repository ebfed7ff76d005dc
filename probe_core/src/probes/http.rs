//! HTTP endpoint checks

use crate::monitoring::{HttpFetcher, HttpResponse, TlsVerification};
use crate::probes::{Probe, DEFAULT_TIMEOUT};
use crate::{Outcome, Result};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Fetches a URL and asserts on status code, body and response headers.
///
/// Every assertion is evaluated and all violations end up in the same
/// failure message. A transport error skips the assertions entirely.
pub struct HttpProbe {
    url: String,
    expected_status: u16,
    body_pattern: Option<Regex>,
    expected_headers: BTreeMap<String, String>,
    timeout: Duration,
    tls: TlsVerification,
    fetcher: Arc<dyn HttpFetcher>,
}

impl HttpProbe {
    pub fn new(url: impl Into<String>, fetcher: Arc<dyn HttpFetcher>) -> Self {
        Self {
            url: url.into(),
            expected_status: 200,
            body_pattern: None,
            expected_headers: BTreeMap::new(),
            timeout: DEFAULT_TIMEOUT,
            tls: TlsVerification::Verify,
            fetcher,
        }
    }

    /// Same checks with certificate verification disabled.
    pub fn insecure(url: impl Into<String>, fetcher: Arc<dyn HttpFetcher>) -> Self {
        Self::new(url, fetcher).with_tls(TlsVerification::Skip)
    }

    pub fn expect_status(mut self, status: u16) -> Self {
        self.expected_status = status;
        self
    }

    /// `pattern` is a regular expression; plain text matches as a substring.
    pub fn expect_body(mut self, pattern: &str) -> Result<Self> {
        self.body_pattern = Some(Regex::new(pattern)?);
        Ok(self)
    }

    pub fn expect_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.expected_headers.insert(name.into(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_tls(mut self, tls: TlsVerification) -> Self {
        self.tls = tls;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn assert_response(&self, response: &HttpResponse) -> Vec<String> {
        let mut reasons = Vec::new();

        if response.status != self.expected_status {
            reasons.push(format!(
                "got code {}, expected {}",
                response.status, self.expected_status
            ));
        }

        if let Some(pattern) = &self.body_pattern {
            if !pattern.is_match(&response.body) {
                reasons.push(format!("couldn't find expected pattern {}", pattern.as_str()));
            }
        }

        for (name, expected) in &self.expected_headers {
            match response.header(name) {
                None => reasons.push(format!("expected response header {} not found", name)),
                Some(actual) if actual != *expected => reasons.push(format!(
                    "expected value '{}' for header {} but got '{}'",
                    expected, name, actual
                )),
                Some(_) => {}
            }
        }

        reasons
    }
}

#[async_trait::async_trait]
impl Probe for HttpProbe {
    fn name(&self) -> &str {
        &self.url
    }

    fn kind(&self) -> &'static str {
        match self.tls {
            TlsVerification::Verify => "http",
            TlsVerification::Skip => "http-insecure",
        }
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn run(&self) -> Result<Outcome> {
        let response = match self.fetcher.fetch(&self.url, self.tls).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Fetching {} failed: {}", self.url, e);
                return Ok(Outcome::failed(format!("Error fetching {}: {}", self.url, e)));
            }
        };

        let reasons = self.assert_response(&response);
        if reasons.is_empty() {
            debug!("{} answered {} as expected", self.url, response.status);
            return Ok(Outcome::Success);
        }

        let details: Vec<String> = reasons.iter().map(|r| format!("    {}", r)).collect();
        Ok(Outcome::failed(format!(
            "Error fetching {}:\n{}",
            self.url,
            details.join("\n")
        )))
    }
}
