use std::fmt;

use url::Url;

use crate::utils::format_duration;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MediaType {
    #[default]
    Video,
    Audio,
}

impl MediaType {
    pub const ALL: [MediaType; 2] = [MediaType::Video, MediaType::Audio];

    /// Wire value sent as the `type` query parameter
    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::Video => "video",
            MediaType::Audio => "audio",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MediaType::Video => "Video",
            MediaType::Audio => "Audio",
        }
    }

    /// File extension the backend produces for this type
    pub fn extension(self) -> &'static str {
        match self {
            MediaType::Video => "mp4",
            MediaType::Audio => "mp3",
        }
    }

    /// Display metadata for every tier, in fixed option order
    pub fn tier_options(self) -> [TierInfo; 4] {
        QualityTier::ALL.map(|tier| tier.info(self))
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Quality level. The variant is the identity; labels depend on the media type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum QualityTier {
    VeryHigh,
    #[default]
    High,
    Medium,
    Low,
}

impl QualityTier {
    pub const ALL: [QualityTier; 4] = [
        QualityTier::VeryHigh,
        QualityTier::High,
        QualityTier::Medium,
        QualityTier::Low,
    ];

    /// Wire value sent as the `quality` query parameter
    pub fn as_str(self) -> &'static str {
        match self {
            QualityTier::VeryHigh => "very_high",
            QualityTier::High => "high",
            QualityTier::Medium => "medium",
            QualityTier::Low => "low",
        }
    }

    pub fn info(self, media_type: MediaType) -> TierInfo {
        let (label, description, badge) = match (media_type, self) {
            (MediaType::Video, QualityTier::VeryHigh) => (
                "Premium / Max",
                "Best resolution the source offers",
                "MAX",
            ),
            (MediaType::Video, QualityTier::High) => {
                ("High (1080p)", "Full HD, good for large screens", "HD")
            }
            (MediaType::Video, QualityTier::Medium) => {
                ("Standard (720p)", "Balanced size and sharpness", "SD")
            }
            (MediaType::Video, QualityTier::Low) => {
                ("Basic (480p)", "Smallest file, quick to fetch", "LOW")
            }
            (MediaType::Audio, QualityTier::VeryHigh) => (
                "Premium / Max (320kbps)",
                "Highest bitrate MP3",
                "320k",
            ),
            (MediaType::Audio, QualityTier::High) => {
                ("High (192kbps)", "Clear sound for most listening", "192k")
            }
            (MediaType::Audio, QualityTier::Medium) => {
                ("Standard (128kbps)", "Good enough for speech and podcasts", "128k")
            }
            (MediaType::Audio, QualityTier::Low) => {
                ("Basic (64kbps)", "Smallest file size", "64k")
            }
        };

        TierInfo {
            tier: self,
            label,
            description,
            badge,
        }
    }
}

impl fmt::Display for QualityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierInfo {
    pub tier: QualityTier,
    pub label: &'static str,
    pub description: &'static str,
    pub badge: &'static str,
}

/// Metadata returned by a successful resolution
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMedia {
    pub title: String,
    pub thumbnail_url: Option<String>,
    pub duration_seconds: Option<u64>,
    pub source_name: String,
}

impl ResolvedMedia {
    /// `None` when the duration is unknown, so the UI can hide it.
    pub fn duration_label(&self) -> Option<String> {
        self.duration_seconds.map(format_duration)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestState {
    #[default]
    Idle,
    Loading,
    Ready(ResolvedMedia),
    Failed(String),
}

/// Parameters of one download, built at the moment it is triggered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: String,
    pub media_type: MediaType,
    pub quality: QualityTier,
}

impl DownloadRequest {
    pub fn query_pairs(&self) -> [(&'static str, &str); 3] {
        [
            ("url", self.url.as_str()),
            ("type", self.media_type.as_str()),
            ("quality", self.quality.as_str()),
        ]
    }

    /// Endpoint URL with the request encoded as query parameters
    pub fn to_url(&self, endpoint: &Url) -> Url {
        let mut url = endpoint.clone();
        url.query_pairs_mut()
            .clear()
            .extend_pairs(self.query_pairs());
        url
    }
}
