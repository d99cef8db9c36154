//! Search orchestration.
//!
//! Defines the [`CourseSource`] trait so the record backend (the remote course
//! search service, or a fake in tests) can be swapped, and the entry points
//! that turn a user query into display-ready tree rows.

pub mod course_search;

use crate::tree::{build_tree, DisplayRecord, Record};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Failure of a single search attempt. The `Display` text is shown to the user verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// The request could not be completed or the service answered with a failure status.
    #[error("Network error: {0}. Please try again.")]
    Network(String),
    /// The search failed without a recognizable error (panicked or was aborted).
    #[error("An unexpected error occurred. Please try again.")]
    Unexpected,
}

/// Async trait implemented by each course record backend.
#[async_trait::async_trait]
pub trait CourseSource: Send + Sync {
    fn name(&self) -> &str;
    /// Fetch the raw records matching an already-trimmed, non-empty query.
    async fn fetch(&self, query: &str) -> Result<Vec<Record>, SearchError>;
}

/// Run one search and return the rows in display order.
///
/// Blank queries resolve to an empty result without touching `source`. The
/// fetched records reach the tree builder exactly as the source returned them.
pub async fn search_tree(
    source: &dyn CourseSource,
    query: &str,
) -> Result<Vec<DisplayRecord>, SearchError> {
    let query = query.trim();
    if query.is_empty() {
        debug!("Blank query, skipping {}", source.name());
        return Ok(Vec::new());
    }

    let records = source.fetch(query).await?;
    let rows = build_tree(&records);
    info!(
        "Search {:?} via {}: {} records, {} displayed",
        query,
        source.name(),
        records.len(),
        rows.len()
    );
    Ok(rows)
}

/// Run [`search_tree`] on its own task.
///
/// The search is never cancelled by the caller going away: it completes even if
/// the awaiting future is dropped. A task that dies without returning maps to
/// [`SearchError::Unexpected`].
pub async fn spawn_search(
    source: Arc<dyn CourseSource>,
    query: String,
) -> Result<Vec<DisplayRecord>, SearchError> {
    let handle = tokio::spawn(async move { search_tree(source.as_ref(), &query).await });
    match handle.await {
        Ok(result) => result,
        Err(e) => {
            error!("Search task failed: {}", e);
            Err(SearchError::Unexpected)
        }
    }
}
