//! HTTP client for the remote course search service.

use super::{CourseSource, SearchError};
use crate::config::AppConfig;
use crate::tree::Record;
use anyhow::Context;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};

/// Characters left unescaped in the query value, the same set browsers keep
/// for a URI component.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Client for the course search service. One GET per search, no retries.
#[derive(Clone)]
pub struct CourseSearchClient {
    client: Client,
    base_url: String,
}

impl CourseSearchClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create a client with the configured endpoint and request timeout.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("Failed to build HTTP client")?;
        info!("Course search client targeting {}", config.search_url);
        Ok(Self::new(client, config.search_url.clone()))
    }

    /// URL requested for `query`, percent-encoded as a single `query` parameter.
    pub fn request_url(&self, query: &str) -> String {
        format!(
            "{}/?query={}",
            self.base_url,
            utf8_percent_encode(query, QUERY_VALUE)
        )
    }
}

#[async_trait::async_trait]
impl CourseSource for CourseSearchClient {
    fn name(&self) -> &str {
        "course_search"
    }

    async fn fetch(&self, query: &str) -> Result<Vec<Record>, SearchError> {
        let url = self.request_url(query);
        debug!("Requesting {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SearchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Network(format!(
                "API request failed with status {}",
                status.as_u16()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchError::Network(e.to_string()))?;

        Ok(records_from_body(body))
    }
}

/// Interpret a decoded response body. Anything other than an array means "no matches".
///
/// Array elements are taken as they come; one that cannot be read as a course
/// item is skipped, the same way the tree builder drops items it cannot link.
fn records_from_body(body: Value) -> Vec<Record> {
    let Value::Array(items) = body else {
        debug!("Non-array response body, treating as no results");
        return Vec::new();
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<Record>(item) {
            Ok(record) => Some(record),
            Err(e) => {
                debug!("Skipping response item that is not a course item: {}", e);
                None
            }
        })
        .collect()
}
