use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::ResolvedMedia;

/// Body of the metadata request
#[derive(Debug, Clone, Serialize)]
pub struct InfoRequest<'a> {
    pub url: &'a str,
}

/// Response from the /api/info endpoint
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InfoResponse {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub extractor: Option<String>,
}

impl InfoResponse {
    pub fn into_resolved(self) -> ResolvedMedia {
        let duration_seconds = self
            .duration
            .filter(|d| d.is_finite() && *d >= 0.0)
            .map(|d| d.floor() as u64);

        ResolvedMedia {
            title: self.title.unwrap_or_default(),
            thumbnail_url: self.thumbnail.filter(|t| !t.trim().is_empty()),
            duration_seconds,
            source_name: self
                .extractor
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| "unknown".to_string()),
        }
    }
}

/// Body of a non-success response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
}

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server root; may carry a path prefix such as `https://host/grabber/`
    pub base_url: String,
    /// Endpoint paths, relative to `base_url`
    pub info_path: String,
    pub download_path: String,
    pub placeholder_thumbnail: String,
    /// Applies to metadata and thumbnail requests, not to download streams
    pub request_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            info_path: "api/info".to_string(),
            download_path: "api/download".to_string(),
            placeholder_thumbnail: "https://via.placeholder.com/90?text=None".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}
