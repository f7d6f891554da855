use std::path::{Path, PathBuf};

use futures::{Stream, StreamExt};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::{
    api::ApiClient,
    domain::{AppError, DownloadRequest, MediaType, ResolvedMedia},
    utils::sanitize_filename,
};

/// Decoded RGBA thumbnail pixels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandoffOutcome {
    Saved { path: PathBuf, bytes: u64 },
    Cancelled,
}

/// A download response that is open and named, but not yet written
pub struct PreparedDownload<S> {
    pub filename: String,
    pub stream: S,
}

#[derive(Clone)]
pub struct DownloadCoordinator {
    api_client: ApiClient,
}

impl DownloadCoordinator {
    pub fn new(api_client: ApiClient) -> Self {
        Self { api_client }
    }

    /// Callers only pass URLs the selection machine accepted, so `media_url` is non-empty
    pub async fn resolve(&self, media_url: String) -> Result<ResolvedMedia, AppError> {
        let media_url = media_url.trim();
        let info = self.api_client.fetch_info(media_url).await.map_err(|e| {
            warn!("Resolving {} failed: {}", media_url, e);
            AppError::from(e)
        })?;

        Ok(info.into_resolved())
    }

    /// Fetch and decode a thumbnail, using the placeholder image when none is known
    pub async fn load_thumbnail(&self, thumbnail_url: Option<String>) -> Result<Thumbnail, AppError> {
        let thumbnail_url = thumbnail_url
            .unwrap_or_else(|| self.api_client.config().placeholder_thumbnail.clone());

        let bytes = self
            .api_client
            .fetch_thumbnail(&thumbnail_url)
            .await
            .map_err(AppError::from)?;

        decode_thumbnail(&bytes)
    }

    /// Open the download endpoint for `request` and settle on a filename
    pub async fn prepare_download(
        &self,
        request: &DownloadRequest,
        title: &str,
    ) -> Result<PreparedDownload<impl Stream<Item = crate::api::Result<bytes::Bytes>>>, AppError> {
        let endpoint = self.api_client.download_endpoint()?;
        let url = request.to_url(&endpoint);
        info!(%url, "Opening download");

        let response = self.api_client.open_download(url).await?;
        debug!(
            suggested = ?response.filename,
            total_size = ?response.total_size,
            "Download response opened"
        );
        let filename = response
            .filename
            .map(|name| sanitize_filename(&name))
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| suggested_filename(title, request.media_type));

        Ok(PreparedDownload {
            filename,
            stream: response.stream,
        })
    }

    pub async fn choose_save_path(&self, suggested_filename: String) -> Option<PathBuf> {
        rfd::AsyncFileDialog::new()
            .set_file_name(&suggested_filename)
            .save_file()
            .await
            .map(|handle| handle.path().to_path_buf())
    }

    /// Hand the download off to disk: open the stream, ask where to save, write it
    pub async fn hand_off(
        &self,
        request: DownloadRequest,
        title: String,
    ) -> Result<HandoffOutcome, AppError> {
        let prepared = self.prepare_download(&request, &title).await?;

        let Some(path) = self.choose_save_path(prepared.filename).await else {
            return Ok(HandoffOutcome::Cancelled);
        };

        let bytes = save_stream(prepared.stream, &path).await?;
        Ok(HandoffOutcome::Saved { path, bytes })
    }
}

/// `<title>.<ext>` with characters that are invalid in filenames replaced
pub fn suggested_filename(title: &str, media_type: MediaType) -> String {
    let stem = sanitize_filename(title);
    let stem = stem.trim_matches(|c| c == '.' || c == ' ');
    let stem = if stem.is_empty() { "download" } else { stem };
    format!("{}.{}", stem, media_type.extension())
}

pub fn decode_thumbnail(bytes: &[u8]) -> Result<Thumbnail, AppError> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| AppError::Image(e.to_string()))?
        .to_rgba8();
    let (width, height) = img.dimensions();

    Ok(Thumbnail {
        width,
        height,
        rgba: img.into_raw(),
    })
}

/// Write every chunk of `stream` to `path`, returning the byte count.
/// A partially written file is removed when the stream or a write fails.
pub async fn save_stream<S>(stream: S, path: &Path) -> Result<u64, AppError>
where
    S: Stream<Item = crate::api::Result<bytes::Bytes>>,
{
    let file = tokio::fs::File::create(path)
        .await
        .map_err(|e| AppError::Io(format!("Failed to create file: {}", e)))?;

    match write_stream(stream, file).await {
        Ok(written) => Ok(written),
        Err(e) => {
            if let Err(remove_err) = tokio::fs::remove_file(path).await {
                warn!(
                    "Failed to remove partial download {}: {}",
                    path.display(),
                    remove_err
                );
            }
            Err(e)
        }
    }
}

// Consumes the file so the handle is closed before any cleanup runs
async fn write_stream<S>(stream: S, mut file: tokio::fs::File) -> Result<u64, AppError>
where
    S: Stream<Item = crate::api::Result<bytes::Bytes>>,
{
    let mut stream = std::pin::pin!(stream);
    let mut written = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk)
            .await
            .map_err(|e| AppError::Io(format!("Write error: {}", e)))?;
        written += chunk.len() as u64;
    }

    file.sync_all()
        .await
        .map_err(|e| AppError::Io(format!("Failed to sync file: {}", e)))?;

    Ok(written)
}
