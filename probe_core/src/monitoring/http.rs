//! HTTP transport used by [`crate::probes::HttpProbe`]

use crate::error::{ProbeError, Result};
use async_trait::async_trait;
use http::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{redirect, Client, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TlsVerification {
    #[default]
    Verify,
    Skip,
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    /// Appends a header, rejecting names or values that are not valid HTTP.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self> {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ProbeError::InvalidProbe(format!("invalid header name {:?}", name)))?;
        let header_value = HeaderValue::from_str(value).map_err(|_| {
            ProbeError::InvalidProbe(format!("invalid value {:?} for header {}", value, name))
        })?;
        self.headers.append(header_name, header_value);
        Ok(self)
    }

    /// All values for `name`, joined with `, `.
    pub fn header(&self, name: &str) -> Option<String> {
        let values: Vec<String> = self
            .headers
            .get_all(name)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect();

        if values.is_empty() {
            None
        } else {
            Some(values.join(", "))
        }
    }
}

#[async_trait]
pub trait HttpFetcher: Send + Sync {
    /// Any error returned here is a transport failure, never an unexpected status.
    async fn fetch(&self, url: &str, tls: TlsVerification) -> Result<HttpResponse>;
}

pub struct ReqwestFetcher {
    verifying: Client,
    insecure: Client,
}

impl ReqwestFetcher {
    pub fn new() -> Result<Self> {
        let user_agent = format!("probekit/{}", env!("CARGO_PKG_VERSION"));

        let verifying = Client::builder()
            .user_agent(user_agent.clone())
            .redirect(redirect::Policy::none())
            .build()?;

        let insecure = Client::builder()
            .user_agent(user_agent)
            .redirect(redirect::Policy::none())
            .danger_accept_invalid_certs(true)
            .build()?;

        Ok(Self { verifying, insecure })
    }
}

#[async_trait]
impl HttpFetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str, tls: TlsVerification) -> Result<HttpResponse> {
        let mut target = Url::parse(url).map_err(|e| ProbeError::Transport {
            kind: "InvalidUrl",
            message: e.to_string(),
        })?;

        let client = match tls {
            TlsVerification::Verify => &self.verifying,
            TlsVerification::Skip => {
                force_tls_on_443(&mut target);
                &self.insecure
            }
        };

        debug!("GET {} (tls: {:?})", target, tls);

        let response = client.get(target).send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.text().await?;

        debug!("{} answered {} with {} bytes", url, status, body.len());

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Plain `http` aimed at port 443 is upgraded to `https`.
pub fn force_tls_on_443(url: &mut Url) {
    if url.scheme() == "http" && url.port_or_known_default() == Some(443) {
        // http -> https is always an accepted scheme change
        let _ = url.set_scheme("https");
    }
}
