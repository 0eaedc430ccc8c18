use std::time::Duration;

use engine_logging::{engine_debug, engine_info};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::{json, Value};
use url::Url;

use crate::types::map_reqwest_error;
use crate::{FailureKind, FetchError};

const MATCH_LEADS_PATH: &str = "match-leads-go/";

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Applies to the one-shot fetch only; `None` keeps the transport default.
    pub request_timeout: Option<Duration>,
    /// Pause before reopening a broken live channel.
    pub retry_delay: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3070".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
            retry_delay: Duration::from_secs(3),
        }
    }
}

impl ApiSettings {
    /// Resolve `path` against the base URL, which may or may not end in `/`.
    pub fn endpoint(&self, path: &str) -> Result<Url, FetchError> {
        let mut base = self.base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Url::parse(&base)
            .and_then(|base| base.join(path.trim_start_matches('/')))
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    pub(crate) fn build_client(&self) -> Result<reqwest::Client, FetchError> {
        reqwest::Client::builder()
            .connect_timeout(self.connect_timeout)
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))
    }
}

#[async_trait::async_trait]
pub trait LeadFetcher: Send + Sync {
    /// Fetch the matched leads for `campaign_ids` in a single request.
    ///
    /// The decoded JSON body is returned as-is; validating its shape is up to the caller.
    async fn fetch_leads(&self, campaign_ids: &[String]) -> Result<Value, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestLeadFetcher {
    settings: ApiSettings,
}

impl ReqwestLeadFetcher {
    pub fn new(settings: ApiSettings) -> Self {
        Self { settings }
    }
}

#[async_trait::async_trait]
impl LeadFetcher for ReqwestLeadFetcher {
    async fn fetch_leads(&self, campaign_ids: &[String]) -> Result<Value, FetchError> {
        let url = self.settings.endpoint(MATCH_LEADS_PATH)?;
        let client = self.settings.build_client()?;

        engine_info!("POST {} for {} campaign(s)", url, campaign_ids.len());
        let mut request = client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .json(&json!({ "campaign_ids": campaign_ids }));
        if let Some(timeout) = self.settings.request_timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_reqwest_error)?;

        if !status.is_success() {
            let message = error_detail(&body).unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                message,
            ));
        }

        engine_debug!("Fetched {} byte(s) of leads", body.len());
        serde_json::from_slice(&body)
            .map_err(|err| FetchError::new(FailureKind::InvalidBody, err.to_string()))
    }
}

/// Human-readable `detail` from an error body, when the server sent one.
fn error_detail(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    match value.get("detail")? {
        Value::String(detail) => Some(detail.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}
