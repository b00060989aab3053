use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

use crate::core::{filter_by_location, select_featured, LocationFilter};
use crate::models::Business;

/// Errors that can occur while reading business records
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Document store returned error: {0}")]
    ApiError(String),

    #[error("Unauthorized: invalid API key or project")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Failed to read seed file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse records: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Where business records come from
///
/// Implementations return records already passed through
/// [`Business::normalized`], so province and city are lowercase.
#[async_trait]
pub trait BusinessSource: Send + Sync {
    /// All records in the filter's scope, at most `limit` of them
    async fn fetch_businesses(
        &self,
        filter: &LocationFilter,
        limit: Option<usize>,
    ) -> Result<Vec<Business>, SourceError>;

    /// The record to highlight: flagged featured, else best ranked
    async fn fetch_featured(&self) -> Result<Option<Business>, SourceError> {
        let all = self.fetch_businesses(&LocationFilter::default(), None).await?;
        Ok(select_featured(all))
    }

    /// Whether the source is reachable
    async fn health_check(&self) -> Result<bool, SourceError> {
        Ok(true)
    }
}

/// Fixed snapshot of records held in memory
///
/// Used for local development (seeded from a JSON file) and tests.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    records: Vec<Business>,
}

impl InMemorySource {
    pub fn new(records: Vec<Business>) -> Self {
        Self {
            records: records.into_iter().map(Business::normalized).collect(),
        }
    }

    /// Load a JSON array of records
    pub fn from_json(json: &str) -> Result<Self, SourceError> {
        let records: Vec<Business> = serde_json::from_str(json)?;
        Ok(Self::new(records))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let source = Self::from_json(&json)?;
        tracing::info!(
            "Loaded {} businesses from {}",
            source.len(),
            path.as_ref().display()
        );
        Ok(source)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl BusinessSource for InMemorySource {
    async fn fetch_businesses(
        &self,
        filter: &LocationFilter,
        limit: Option<usize>,
    ) -> Result<Vec<Business>, SourceError> {
        let mut records = filter_by_location(self.records.clone(), filter);
        if let Some(limit) = limit {
            records.truncate(limit);
        }
        Ok(records)
    }
}
