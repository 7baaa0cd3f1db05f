use std::time::Duration;

use reqwest::blocking::{Client as HttpClient, Response};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use crate::model::{EntryPage, RemoteEntry, DEFAULT_PAGE_SIZE, GENERIC_BINARY_MIME};
use crate::session::Session;

pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/drive/v3";

const LIST_FIELDS: &str = "nextPageToken, files(id, name, mimeType, fileExtension, size)";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{operation} request failed: {source}")]
    Transport {
        operation: &'static str,
        source: reqwest::Error,
    },
    #[error("{operation} returned {status}: {detail}")]
    Status {
        operation: &'static str,
        status: StatusCode,
        detail: String,
    },
    #[error("failed to decode {operation} response: {source}")]
    Decode {
        operation: &'static str,
        source: reqwest::Error,
    },
}

#[derive(Debug, Clone)]
pub struct ListQuery {
    pub filter: String,
    pub page_size: u32,
}

impl ListQuery {
    pub fn untyped_binaries(page_size: u32) -> Self {
        Self {
            filter: format!("trashed=false and mimeType='{GENERIC_BINARY_MIME}'"),
            page_size,
        }
    }
}

impl Default for ListQuery {
    fn default() -> Self {
        Self::untyped_binaries(DEFAULT_PAGE_SIZE)
    }
}

pub struct DriveClient {
    http: HttpClient,
    base_url: String,
    session: Session,
}

impl DriveClient {
    pub fn new(session: Session) -> ApiResult<Self> {
        Self::with_base_url(session, DEFAULT_API_BASE)
    }

    pub fn with_base_url(session: Session, base_url: impl Into<String>) -> ApiResult<Self> {
        let http = HttpClient::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|source| ApiError::Transport {
                operation: "client setup",
                source,
            })?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn list_page(&self, query: &ListQuery, page_token: Option<&str>) -> ApiResult<EntryPage> {
        let mut params = vec![
            ("q", query.filter.clone()),
            ("fields", LIST_FIELDS.to_string()),
            ("pageSize", query.page_size.to_string()),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token.to_string()));
        }

        debug!("listing catalog page (continuation: {})", page_token.is_some());
        let response = self
            .http
            .get(format!("{}/files", self.base_url))
            .bearer_auth(self.session.access_token())
            .query(&params)
            .send()
            .map_err(|source| ApiError::Transport {
                operation: "list",
                source,
            })?;
        decode("list", response)
    }

    pub fn copy_with_mime(&self, file_id: &str, mime_type: &str) -> ApiResult<RemoteEntry> {
        // Only the content-type delta is sent; name and parent folder are
        // inherited from the original.
        let response = self
            .http
            .post(format!("{}/files/{}/copy", self.base_url, file_id))
            .bearer_auth(self.session.access_token())
            .json(&json!({ "mimeType": mime_type }))
            .send()
            .map_err(|source| ApiError::Transport {
                operation: "copy",
                source,
            })?;
        decode("copy", response)
    }

    pub fn trash(&self, file_id: &str) -> ApiResult<()> {
        let response = self
            .http
            .patch(format!("{}/files/{}", self.base_url, file_id))
            .bearer_auth(self.session.access_token())
            .json(&json!({ "trashed": true }))
            .send()
            .map_err(|source| ApiError::Transport {
                operation: "trash",
                source,
            })?;
        check_status("trash", response)?;
        Ok(())
    }
}

fn check_status(operation: &'static str, response: Response) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let detail = response.text().unwrap_or_default();
        Err(ApiError::Status {
            operation,
            status,
            detail,
        })
    }
}

fn decode<T: DeserializeOwned>(operation: &'static str, response: Response) -> ApiResult<T> {
    let response = check_status(operation, response)?;
    response.json().map_err(|source| ApiError::Decode {
        operation,
        source,
    })
}
