//! HTTP column-mapping client
//!
//! Posts the raw headers and one sample row to an external classifier and
//! expects a JSON object of column indices back (`-1` for absent fields):
//!
//! ```json
//! { "property": 0, "unit": 1, "date": 2, "type": -1, "extras": -1,
//!   "notes": 3, "technician": -1, "completed": -1 }
//! ```

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use super::column_mapper::ColumnMappingService;
use crate::defaults::DEFAULT_MAPPER_TIMEOUT_SECS;
use crate::error::MappingServiceError;
use crate::types::{ColumnMapping, WireColumnMapping};

/// Mapping client configuration
#[derive(Debug, Clone)]
pub struct MappingClientConfig {
    /// Endpoint accepting the mapping request (e.g. "http://localhost:8090/map-columns")
    pub url: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for MappingClientConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8090/map-columns".to_string(),
            timeout_seconds: DEFAULT_MAPPER_TIMEOUT_SECS,
        }
    }
}

impl MappingClientConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MappingRequest<'a> {
    headers: &'a [String],
    sample_row: &'a [String],
}

/// `ColumnMappingService` backed by an HTTP endpoint
pub struct HttpColumnMapper {
    client: Client,
    config: MappingClientConfig,
}

impl HttpColumnMapper {
    pub fn new(config: MappingClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &MappingClientConfig {
        &self.config
    }
}

#[async_trait]
impl ColumnMappingService for HttpColumnMapper {
    async fn map_columns(
        &self,
        headers: &[String],
        sample_row: &[String],
    ) -> Result<ColumnMapping, MappingServiceError> {
        let request = MappingRequest { headers, sample_row };
        debug!("Requesting column mapping for {} headers from {}", headers.len(), self.config.url);

        let response = self
            .client
            .post(&self.config.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    MappingServiceError::Timeout(self.config.timeout_seconds)
                } else {
                    MappingServiceError::Unavailable(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MappingServiceError::Unavailable(format!("{}: {}", status, body)));
        }

        let wire: WireColumnMapping = response
            .json()
            .await
            .map_err(|e| MappingServiceError::Unavailable(format!("invalid response: {}", e)))?;

        let mapping = wire.into_mapping(headers.len());
        if mapping == ColumnMapping::default() {
            return Err(MappingServiceError::Unmappable);
        }

        Ok(mapping)
    }

    fn name(&self) -> &str {
        "HTTP column mapper"
    }
}
