use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

use crate::core::{matches_location, select_featured, LocationFilter};
use crate::models::Business;
use crate::services::store::{BusinessSource, SourceError};

/// Largest page the document store hands out
pub const MAX_PAGE_SIZE: usize = 100;

/// Document store REST client
///
/// Reads the sauna collection page by page and normalizes every record.
/// Location filtering happens here rather than in the store query so that
/// stored values with stray casing or spacing still match.
pub struct AppwriteSource {
    base_url: String,
    api_key: String,
    project_id: String,
    database_id: String,
    collection_id: String,
    page_size: usize,
    client: Client,
}

impl AppwriteSource {
    /// Create a new document store client
    pub fn new(
        base_url: String,
        api_key: String,
        project_id: String,
        database_id: String,
        collection_id: String,
        timeout_secs: u64,
    ) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            base_url,
            api_key,
            project_id,
            database_id,
            collection_id,
            page_size: MAX_PAGE_SIZE,
            client,
        })
    }

    /// Override the page size (capped at [`MAX_PAGE_SIZE`])
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// Build the documents URL for a set of queries
    fn documents_url(&self, queries: &[String]) -> String {
        let mut url = format!(
            "{}/databases/{}/collections/{}/documents",
            self.base_url.trim_end_matches('/'),
            self.database_id,
            self.collection_id
        );

        for (i, query) in queries.iter().enumerate() {
            url.push(if i == 0 { '?' } else { '&' });
            url.push_str("queries[]=");
            url.push_str(&urlencoding::encode(query));
        }

        url
    }

    /// Fetch one page of documents, returning the decoded records and the
    /// number of raw documents on the page
    async fn fetch_page(
        &self,
        extra: &[String],
        offset: usize,
    ) -> Result<(Vec<Business>, usize, Option<u64>), SourceError> {
        let mut queries = extra.to_vec();
        queries.push(format!("limit({})", self.page_size));
        queries.push(format!("offset({})", offset));

        let url = self.documents_url(&queries);
        tracing::debug!("Fetching documents from: {}", url);

        let response = self
            .client
            .get(&url)
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(SourceError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Document store returned {}: {}", status, body);
            return Err(SourceError::ApiError(format!("Failed to fetch documents: {}", status)));
        }

        let json: Value = response.json().await?;

        let total = json.get("total").and_then(|t| t.as_u64());

        let documents = json
            .get("documents")
            .and_then(|d| d.as_array())
            .ok_or_else(|| SourceError::InvalidResponse("Missing documents array".into()))?;

        let records = documents
            .iter()
            .filter_map(|doc| {
                let data = doc.get("data").unwrap_or(doc);
                match serde_json::from_value::<Business>(data.clone()) {
                    Ok(business) => Some(business.normalized()),
                    Err(e) => {
                        let id = doc.get("$id").and_then(|v| v.as_str()).unwrap_or("?");
                        tracing::warn!("Skipping undecodable document {}: {}", id, e);
                        None
                    }
                }
            })
            .collect();

        Ok((records, documents.len(), total))
    }

    /// Page through the collection until `limit` matching records are found or
    /// the collection is exhausted
    async fn collect(
        &self,
        extra: &[String],
        filter: &LocationFilter,
        limit: Option<usize>,
    ) -> Result<Vec<Business>, SourceError> {
        let cap = limit.unwrap_or(usize::MAX);
        let mut businesses = Vec::new();
        let mut offset = 0usize;

        while businesses.len() < cap {
            let (page, raw_count, total) = self.fetch_page(extra, offset).await?;
            offset += raw_count;

            businesses.extend(page.into_iter().filter(|b| matches_location(b, filter)));

            let exhausted = raw_count < self.page_size
                || total.is_some_and(|total| offset as u64 >= total);
            if exhausted {
                break;
            }
        }

        businesses.truncate(cap);
        tracing::debug!("Fetched {} businesses (scanned {})", businesses.len(), offset);

        Ok(businesses)
    }
}

#[async_trait]
impl BusinessSource for AppwriteSource {
    async fn fetch_businesses(
        &self,
        filter: &LocationFilter,
        limit: Option<usize>,
    ) -> Result<Vec<Business>, SourceError> {
        self.collect(&[], filter, limit).await
    }

    async fn fetch_featured(&self) -> Result<Option<Business>, SourceError> {
        let flagged = self
            .collect(&[r#"equal("featured", ["Y"])"#.to_string()], &LocationFilter::default(), None)
            .await?;

        if let Some(featured) = select_featured(flagged) {
            return Ok(Some(featured));
        }

        tracing::info!("No featured sauna found, falling back to best ranked");
        let all = self.fetch_businesses(&LocationFilter::default(), None).await?;
        Ok(select_featured(all))
    }

    async fn health_check(&self) -> Result<bool, SourceError> {
        let url = self.documents_url(&["limit(1)".to_string()]);
        let response = self
            .client
            .get(&url)
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
            .send()
            .await?;

        Ok(response.status().is_success())
    }
}
