use futures::Stream;
use futures::TryStreamExt;
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use super::models::{ApiConfig, ErrorResponse, InfoRequest, InfoResponse};
use crate::utils::content_disposition_filename;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Server rejected the request with status {status}")]
    Rejected {
        status: u16,
        message: Option<String>,
    },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// An opened download response whose body has not been read yet
pub struct DownloadResponse<S> {
    /// Filename suggested by the server, if any
    pub filename: Option<String>,
    pub total_size: Option<u64>,
    pub stream: S,
}

#[derive(Clone)]
pub struct ApiClient {
    config: ApiConfig,
    http: Client,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        let mut base = Url::parse(&self.config.base_url)?;
        // Without a trailing slash, join() would replace the last path segment
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }
        Ok(base.join(path.trim_start_matches('/'))?)
    }

    pub fn download_endpoint(&self) -> Result<Url> {
        self.endpoint(&self.config.download_path)
    }

    /// Resolve metadata for a media URL without downloading it
    pub async fn fetch_info(&self, media_url: &str) -> Result<InfoResponse> {
        let endpoint = self.endpoint(&self.config.info_path)?;
        debug!(%endpoint, media_url, "Requesting media info");

        let response = self
            .http
            .post(endpoint)
            .timeout(self.config.request_timeout)
            .json(&InfoRequest { url: media_url })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body: ErrorResponse = response.json().await.unwrap_or_else(|e| {
                warn!("Error response from info endpoint was not JSON: {}", e);
                ErrorResponse::default()
            });
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message: body.error,
            });
        }

        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("JSON decode error: {}", e)))
    }

    /// Fetch raw image bytes for a thumbnail
    pub async fn fetch_thumbnail(&self, thumbnail_url: &str) -> Result<bytes::Bytes> {
        let response = self
            .http
            .get(thumbnail_url)
            .timeout(self.config.request_timeout)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.bytes().await?)
    }

    /// Open the download endpoint and return the body as a byte stream.
    /// Returns the server-suggested filename alongside the stream.
    pub async fn open_download(
        &self,
        download_url: Url,
    ) -> Result<DownloadResponse<impl Stream<Item = Result<bytes::Bytes>>>> {
        let response = self.http.get(download_url).send().await?;

        let status = response.status();
        if !status.is_success() {
            // The download endpoint answers failures with plain text
            let message = response.text().await.ok().filter(|t| !t.trim().is_empty());
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let filename = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(content_disposition_filename);
        let total_size = response.content_length();
        let stream = response.bytes_stream().map_err(ApiError::RequestError);

        Ok(DownloadResponse {
            filename,
            total_size,
            stream,
        })
    }
}
