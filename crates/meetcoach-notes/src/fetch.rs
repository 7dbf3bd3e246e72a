//! Paginated meeting fetch.
//!
//! The document listing is not date-filtered on the server, so the scan
//! walks the whole history page by page and filters each document locally.
//! Matching documents get their transcript attached before they are
//! returned, in listing order.

use meetcoach_core::{DateRange, Document, Utterance};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::client::NotesClient;
use crate::error::{NotesError, NotesResult};
use crate::transport::HttpTransport;

/// Listing endpoint.
pub const DOCUMENTS_ENDPOINT: &str = "/v2/get-documents";

/// Transcript endpoint.
pub const TRANSCRIPT_ENDPOINT: &str = "/v1/get-document-transcript";

/// Documents requested per listing page.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Options for [`NotesClient::fetch_meetings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    /// Documents per page. A page shorter than this ends the scan.
    pub page_size: usize,
    /// Stop after this many pages. `None` scans until the listing ends.
    pub max_pages: Option<usize>,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: None,
        }
    }
}

impl FetchOptions {
    /// Builder method to cap the number of pages.
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: Option<usize>) -> Self {
        self.max_pages = max_pages;
        self
    }
}

impl<T: HttpTransport> NotesClient<T> {
    /// Lists one page of documents.
    ///
    /// Returns the raw entries so the caller can tell a short page from a
    /// full one even when some entries fail to parse.
    pub async fn get_documents(&mut self, limit: usize, offset: usize) -> NotesResult<Vec<Value>> {
        let payload = json!({
            "limit": limit,
            "offset": offset,
            "include_last_viewed_panel": true,
        });

        let body = self.request(DOCUMENTS_ENDPOINT, payload).await?;
        match body.get("docs") {
            Some(Value::Array(docs)) => Ok(docs.clone()),
            Some(Value::Null) | None => Ok(Vec::new()),
            Some(other) => Err(NotesError::invalid_response(format!(
                "expected 'docs' to be a list, got {}",
                json_kind(other)
            ))),
        }
    }

    /// Fetches the transcript for one document.
    ///
    /// The service answers with a bare list of utterances; any other shape
    /// is treated as an empty transcript.
    pub async fn get_document_transcript(
        &mut self,
        document_id: &str,
    ) -> NotesResult<Vec<Utterance>> {
        let body = self
            .request(TRANSCRIPT_ENDPOINT, json!({ "document_id": document_id }))
            .await?;

        match body {
            Value::Array(_) => serde_json::from_value(body).map_err(|e| {
                NotesError::invalid_response(format!(
                    "failed to parse transcript for {}: {}",
                    document_id, e
                ))
                .with_source(e)
            }),
            _ => {
                debug!(document_id, "transcript response is not a list, treating as empty");
                Ok(Vec::new())
            }
        }
    }

    /// Returns every document created within `range`, with transcripts.
    ///
    /// Paging stops at an empty page, a page shorter than
    /// `options.page_size`, or after `options.max_pages` pages. A failed
    /// listing page aborts the scan. A failed transcript skips only that
    /// document, unless the failure is fatal for the run (for example the
    /// service rejected our credentials even after a refresh).
    pub async fn fetch_meetings(
        &mut self,
        range: &DateRange,
        options: &FetchOptions,
    ) -> NotesResult<Vec<Document>> {
        let page_size = options.page_size.max(1);
        let mut meetings = Vec::new();
        let mut offset = 0;
        let mut pages = 0;
        let mut scanned = 0;

        info!(range = %range.label, "fetching meetings");

        loop {
            if options.max_pages.is_some_and(|max| pages >= max) {
                warn!(
                    offset,
                    max_pages = pages,
                    "page limit reached, older documents were not scanned"
                );
                break;
            }

            let page = self.get_documents(page_size, offset).await?;
            pages += 1;
            scanned += page.len();
            debug!(offset, count = page.len(), "fetched document page");

            if page.is_empty() {
                break;
            }
            let is_last = page.len() < page_size;

            for raw in page {
                let Some(mut document) = parse_document(raw) else {
                    continue;
                };

                let Some(created_at) = document.created_at_utc() else {
                    warn!(
                        document_id = %document.id,
                        created_at = ?document.created_at,
                        "skipping document with unparsable creation time"
                    );
                    continue;
                };
                if !range.contains(created_at) {
                    continue;
                }

                match self.get_document_transcript(&document.id).await {
                    Ok(transcript) => {
                        document.transcript = transcript;
                        meetings.push(document);
                    }
                    Err(e) if e.is_fatal_for_run() => return Err(e),
                    Err(e) => {
                        warn!(
                            document_id = %document.id,
                            error = %e,
                            "failed to fetch transcript, skipping document"
                        );
                    }
                }
            }

            if is_last {
                break;
            }
            offset += page_size;
        }

        info!(
            found = meetings.len(),
            scanned,
            pages,
            "finished fetching meetings"
        );
        Ok(meetings)
    }
}

fn parse_document(raw: Value) -> Option<Document> {
    match serde_json::from_value::<Document>(raw) {
        Ok(document) => Some(document),
        Err(e) => {
            warn!(error = %e, "skipping malformed document entry");
            None
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
