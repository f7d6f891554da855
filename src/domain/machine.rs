//! Selection and request state for one page session.
//!
//! Every user action and every fetch completion goes through
//! [`SelectionMachine::apply`]. It mutates the machine and returns the single
//! side effect the caller must run. It performs no I/O, so everything here can
//! be tested without a window or a server.

use tracing::debug;

use super::error::AppError;
use super::model::{DownloadRequest, MediaType, QualityTier, RequestState, ResolvedMedia, TierInfo};

/// Identifies one metadata fetch. Only the latest token may complete.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

/// Identifies one download confirmation banner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ConfirmationToken(u64);

#[derive(Debug, Clone)]
pub enum Event {
    Submit(String),
    Resolved {
        token: RequestToken,
        outcome: Result<ResolvedMedia, AppError>,
    },
    TypeSelected(MediaType),
    TierSelected(QualityTier),
    DownloadTriggered,
    ConfirmationElapsed(ConfirmationToken),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    None,
    Resolve {
        token: RequestToken,
        url: String,
    },
    Download {
        request: DownloadRequest,
        confirmation: ConfirmationToken,
    },
}

#[derive(Debug, Clone)]
pub struct SelectionMachine {
    media_type: MediaType,
    quality: QualityTier,
    current_url: String,
    state: RequestState,
    latest_request: RequestToken,
    confirmation: Option<ConfirmationToken>,
    last_confirmation: ConfirmationToken,
    audio_marker: String,
}

impl Default for SelectionMachine {
    fn default() -> Self {
        Self::new("soundcloud")
    }
}

impl SelectionMachine {
    pub fn new(audio_marker: impl Into<String>) -> Self {
        Self {
            media_type: MediaType::default(),
            quality: QualityTier::default(),
            current_url: String::new(),
            state: RequestState::Idle,
            latest_request: RequestToken::default(),
            confirmation: None,
            last_confirmation: ConfirmationToken::default(),
            audio_marker: audio_marker.into().to_lowercase(),
        }
    }

    pub fn apply(&mut self, event: Event) -> Command {
        match event {
            Event::Submit(raw) => self.submit(&raw),
            Event::Resolved { token, outcome } => {
                self.resolved(token, outcome);
                Command::None
            }
            Event::TypeSelected(media_type) => {
                self.media_type = media_type;
                Command::None
            }
            Event::TierSelected(quality) => {
                self.quality = quality;
                Command::None
            }
            Event::DownloadTriggered => self.download(),
            Event::ConfirmationElapsed(token) => {
                if self.confirmation == Some(token) {
                    self.confirmation = None;
                }
                Command::None
            }
        }
    }

    fn submit(&mut self, raw: &str) -> Command {
        let url = raw.trim();
        if url.is_empty() {
            debug!("Ignoring submit with empty URL");
            return Command::None;
        }

        self.current_url = url.to_string();
        self.latest_request = RequestToken(self.latest_request.0 + 1);
        self.state = RequestState::Loading;
        self.confirmation = None;

        Command::Resolve {
            token: self.latest_request,
            url: self.current_url.clone(),
        }
    }

    fn resolved(&mut self, token: RequestToken, outcome: Result<ResolvedMedia, AppError>) {
        if token != self.latest_request || self.state != RequestState::Loading {
            debug!(?token, latest = ?self.latest_request, "Dropping stale resolution");
            return;
        }

        self.state = match outcome {
            Ok(media) => {
                self.media_type = self.infer_media_type(&media.source_name);
                RequestState::Ready(media)
            }
            Err(error) => RequestState::Failed(error.to_string()),
        };
    }

    fn download(&mut self) -> Command {
        if !self.can_download() {
            debug!(state = ?self.state, "Download requested without a resolved URL");
            return Command::None;
        }

        let confirmation = ConfirmationToken(self.last_confirmation.0 + 1);
        self.last_confirmation = confirmation;
        self.confirmation = Some(confirmation);

        Command::Download {
            request: DownloadRequest {
                url: self.current_url.clone(),
                media_type: self.media_type,
                quality: self.quality,
            },
            confirmation,
        }
    }

    /// Audio when the source name contains the audio marker, ignoring case
    pub fn infer_media_type(&self, source_name: &str) -> MediaType {
        if !self.audio_marker.is_empty() && source_name.to_lowercase().contains(&self.audio_marker) {
            MediaType::Audio
        } else {
            MediaType::Video
        }
    }

    pub fn media_type(&self) -> MediaType {
        self.media_type
    }

    pub fn quality(&self) -> QualityTier {
        self.quality
    }

    /// The selected tier, labelled for the active media type
    pub fn selected_tier(&self) -> TierInfo {
        self.quality.info(self.media_type)
    }

    pub fn quality_options(&self) -> [TierInfo; 4] {
        self.media_type.tier_options()
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    pub fn current_url(&self) -> &str {
        &self.current_url
    }

    pub fn latest_request(&self) -> RequestToken {
        self.latest_request
    }

    pub fn resolved_media(&self) -> Option<&ResolvedMedia> {
        match &self.state {
            RequestState::Ready(media) => Some(media),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            RequestState::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.state == RequestState::Loading
    }

    pub fn can_download(&self) -> bool {
        matches!(self.state, RequestState::Ready(_))
    }

    /// Token of the confirmation banner currently shown, if any
    pub fn confirmation(&self) -> Option<ConfirmationToken> {
        self.confirmation
    }

    pub fn confirmation_visible(&self) -> bool {
        self.confirmation.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn media(source: &str) -> ResolvedMedia {
        ResolvedMedia {
            title: "Some clip".to_string(),
            thumbnail_url: None,
            duration_seconds: Some(125),
            source_name: source.to_string(),
        }
    }

    fn submit(machine: &mut SelectionMachine, url: &str) -> RequestToken {
        match machine.apply(Event::Submit(url.to_string())) {
            Command::Resolve { token, .. } => token,
            other => panic!("expected resolve command, got {:?}", other),
        }
    }

    fn resolve_ready(machine: &mut SelectionMachine, url: &str, source: &str) {
        let token = submit(machine, url);
        machine.apply(Event::Resolved {
            token,
            outcome: Ok(media(source)),
        });
    }

    #[test]
    fn test_empty_submit_is_ignored() {
        let mut machine = SelectionMachine::default();
        for raw in ["", "   ", "\t\n"] {
            assert_eq!(machine.apply(Event::Submit(raw.to_string())), Command::None);
            assert_eq!(machine.state(), &RequestState::Idle);
        }
        assert_eq!(machine.latest_request(), RequestToken::default());

        resolve_ready(&mut machine, "https://a/b", "Youtube");
        machine.apply(Event::Submit("  ".to_string()));
        assert!(machine.can_download());
        assert_eq!(machine.current_url(), "https://a/b");
    }

    #[test]
    fn test_submit_trims_and_enters_loading() {
        let mut machine = SelectionMachine::default();
        let command = machine.apply(Event::Submit("  https://x/y  ".to_string()));
        assert_eq!(
            command,
            Command::Resolve {
                token: machine.latest_request(),
                url: "https://x/y".to_string(),
            }
        );
        assert!(machine.is_loading());
        assert_eq!(machine.current_url(), "https://x/y");
    }

    #[test]
    fn test_success_infers_media_type_from_source() {
        for (source, expected) in [
            ("SoundCloud", MediaType::Audio),
            ("soundcloud:set", MediaType::Audio),
            ("SOUNDCLOUDPlaylist", MediaType::Audio),
            ("Youtube", MediaType::Video),
            ("unknown", MediaType::Video),
            ("", MediaType::Video),
        ] {
            let mut machine = SelectionMachine::default();
            let manual = match expected {
                MediaType::Audio => MediaType::Video,
                MediaType::Video => MediaType::Audio,
            };
            machine.apply(Event::TypeSelected(manual));
            resolve_ready(&mut machine, "https://x/y", source);
            assert_eq!(machine.media_type(), expected, "source {:?}", source);
        }
    }

    #[test]
    fn test_empty_marker_never_matches() {
        let machine = SelectionMachine::new("");
        assert_eq!(machine.infer_media_type("SoundCloud"), MediaType::Video);
    }

    #[test]
    fn test_type_switch_preserves_tier_identity() {
        for tier in QualityTier::ALL {
            for from in MediaType::ALL {
                for to in MediaType::ALL {
                    let mut machine = SelectionMachine::default();
                    machine.apply(Event::TypeSelected(from));
                    machine.apply(Event::TierSelected(tier));
                    machine.apply(Event::TypeSelected(to));

                    assert_eq!(machine.quality(), tier);
                    assert_eq!(machine.selected_tier(), tier.info(to));
                    assert_eq!(machine.state(), &RequestState::Idle);
                }
            }
        }
    }

    #[test]
    fn test_auto_switch_keeps_selected_tier() {
        let mut machine = SelectionMachine::default();
        machine.apply(Event::TierSelected(QualityTier::Medium));
        resolve_ready(&mut machine, "https://soundcloud.com/a/b", "Soundcloud");

        assert_eq!(machine.media_type(), MediaType::Audio);
        assert_eq!(machine.quality(), QualityTier::Medium);
        assert_eq!(machine.selected_tier().label, "Standard (128kbps)");
        assert_eq!(machine.quality_options()[2].label, "Standard (128kbps)");
    }

    #[test]
    fn test_failure_keeps_selection_and_allows_retry() {
        let mut machine = SelectionMachine::default();
        machine.apply(Event::TypeSelected(MediaType::Audio));
        machine.apply(Event::TierSelected(QualityTier::Low));

        let token = submit(&mut machine, "https://x/y");
        machine.apply(Event::Resolved {
            token,
            outcome: Err(AppError::Server("Unsupported URL".to_string())),
        });

        assert_eq!(machine.error_message(), Some("Unsupported URL"));
        assert_eq!(machine.resolved_media(), None);
        assert_eq!(machine.media_type(), MediaType::Audio);
        assert_eq!(machine.quality(), QualityTier::Low);
        assert_eq!(machine.apply(Event::DownloadTriggered), Command::None);

        resolve_ready(&mut machine, "https://x/z", "Youtube");
        assert_eq!(machine.error_message(), None);
        assert!(machine.resolved_media().is_some());
    }

    #[test]
    fn test_resubmit_clears_previous_result_immediately() {
        let mut machine = SelectionMachine::default();
        resolve_ready(&mut machine, "https://x/y", "Youtube");
        machine.apply(Event::DownloadTriggered);
        assert!(machine.confirmation_visible());

        submit(&mut machine, "https://x/z");
        assert!(machine.is_loading());
        assert_eq!(machine.resolved_media(), None);
        assert_eq!(machine.error_message(), None);
        assert!(!machine.confirmation_visible());
    }

    #[test]
    fn test_stale_response_is_ignored() {
        let mut machine = SelectionMachine::default();
        let first = submit(&mut machine, "https://x/first");
        let second = submit(&mut machine, "https://x/second");
        assert!(second > first);

        machine.apply(Event::Resolved {
            token: second,
            outcome: Ok(media("Youtube")),
        });
        machine.apply(Event::Resolved {
            token: first,
            outcome: Err(AppError::Rejected),
        });

        assert_eq!(machine.resolved_media(), Some(&media("Youtube")));
        assert_eq!(machine.current_url(), "https://x/second");
    }

    #[test]
    fn test_stale_response_before_latest_is_ignored() {
        let mut machine = SelectionMachine::default();
        let first = submit(&mut machine, "https://x/first");
        let second = submit(&mut machine, "https://x/second");

        machine.apply(Event::Resolved {
            token: first,
            outcome: Ok(media("Soundcloud")),
        });
        assert!(machine.is_loading());
        assert_eq!(machine.media_type(), MediaType::Video);

        machine.apply(Event::Resolved {
            token: second,
            outcome: Err(AppError::Rejected),
        });
        assert_eq!(machine.error_message(), Some("Failed to fetch info"));
    }

    #[test]
    fn test_duplicate_completion_is_ignored() {
        let mut machine = SelectionMachine::default();
        let token = submit(&mut machine, "https://x/y");
        machine.apply(Event::Resolved {
            token,
            outcome: Ok(media("Youtube")),
        });
        machine.apply(Event::Resolved {
            token,
            outcome: Err(AppError::Rejected),
        });
        assert!(machine.can_download());
    }

    #[test]
    fn test_download_builds_request_from_submitted_url() {
        let mut machine = SelectionMachine::default();
        resolve_ready(&mut machine, "https://x/y", "Youtube");
        machine.apply(Event::TypeSelected(MediaType::Audio));
        machine.apply(Event::TierSelected(QualityTier::Medium));

        match machine.apply(Event::DownloadTriggered) {
            Command::Download { request, .. } => {
                assert_eq!(
                    request,
                    DownloadRequest {
                        url: "https://x/y".to_string(),
                        media_type: MediaType::Audio,
                        quality: QualityTier::Medium,
                    }
                );
            }
            other => panic!("expected download command, got {:?}", other),
        }
    }

    #[test]
    fn test_download_outside_ready_is_noop() {
        let mut machine = SelectionMachine::default();
        assert_eq!(machine.apply(Event::DownloadTriggered), Command::None);

        submit(&mut machine, "https://x/y");
        assert_eq!(machine.apply(Event::DownloadTriggered), Command::None);
        assert!(machine.is_loading());
        assert!(!machine.confirmation_visible());
    }

    #[test]
    fn test_confirmation_clears_after_its_own_timer() {
        let mut machine = SelectionMachine::default();
        resolve_ready(&mut machine, "https://x/y", "Youtube");

        let Command::Download { confirmation, .. } = machine.apply(Event::DownloadTriggered) else {
            panic!("expected download command");
        };
        assert!(machine.confirmation_visible());

        machine.apply(Event::ConfirmationElapsed(confirmation));
        assert!(!machine.confirmation_visible());
    }

    #[test]
    fn test_second_click_extends_confirmation() {
        let mut machine = SelectionMachine::default();
        resolve_ready(&mut machine, "https://x/y", "Youtube");

        let Command::Download { confirmation: first, .. } = machine.apply(Event::DownloadTriggered) else {
            panic!("expected download command");
        };
        let Command::Download { confirmation: second, .. } = machine.apply(Event::DownloadTriggered) else {
            panic!("expected download command");
        };
        assert_ne!(first, second);

        machine.apply(Event::ConfirmationElapsed(first));
        assert!(machine.confirmation_visible());

        machine.apply(Event::ConfirmationElapsed(second));
        assert!(!machine.confirmation_visible());
    }
}
