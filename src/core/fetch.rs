use crate::config::FetchConfig;
use crate::domain::model::FetchReport;
use crate::utils::error::Result;
use crate::utils::validation::validate_url;
use chrono::Utc;
use reqwest::Client;
use std::time::{Duration, Instant};

/// Times a single HTTP request, from send until the body is fully read.
pub struct FetchTimer {
    client: Client,
    options: FetchConfig,
}

impl FetchTimer {
    pub fn new(options: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_seconds))
            .user_agent(options.user_agent.clone())
            .build()?;

        Ok(Self { client, options })
    }

    pub async fn time(&self, url: &str) -> Result<FetchReport> {
        let target = validate_url("url", url)?;
        let method = self.options.method.as_reqwest();

        tracing::debug!("Sending {} request to {}", method, target);
        let started_at = Utc::now();
        let start = Instant::now();

        let response = self.client.request(method.clone(), target).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        let elapsed = start.elapsed();

        if status.is_success() {
            tracing::debug!("{} responded with {} in {:?}", url, status, elapsed);
        } else {
            tracing::warn!("{} responded with non-success status {}", url, status);
        }

        Ok(FetchReport {
            url: url.to_string(),
            method: method.to_string(),
            status: status.as_u16(),
            bytes: body.len(),
            elapsed,
            started_at,
        })
    }
}
