use std::time::Duration;

use iced::task;
use iced::widget::image;
use iced::Task;
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::application::{DownloadCoordinator, HandoffOutcome, Thumbnail};
use crate::config::AppConfig;
use crate::domain::{
    AppError, Command, ConfirmationToken, DownloadRequest, Event, RequestToken, ResolvedMedia,
    SelectionMachine,
};
use crate::ui::{DownloadMessage, DownloadView};

pub struct DownloadApp {
    view: DownloadView,
    machine: SelectionMachine,
    coordinator: DownloadCoordinator,
    confirmation_timeout: Duration,
    // Thumbnail for the request that produced the current result
    thumbnail: Option<(RequestToken, image::Handle)>,
    // The one metadata fetch allowed in flight
    in_flight: Option<(RequestToken, task::Handle)>,
}

impl Default for DownloadApp {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl DownloadApp {
    pub fn new(config: AppConfig) -> Self {
        let api_client = ApiClient::new(config.api);

        Self {
            view: DownloadView::default(),
            machine: SelectionMachine::new(config.audio_source_marker),
            coordinator: DownloadCoordinator::new(api_client),
            confirmation_timeout: config.confirmation_timeout,
            thumbnail: None,
            in_flight: None,
        }
    }

    pub fn machine(&self) -> &SelectionMachine {
        &self.machine
    }

    fn current_thumbnail(&self) -> Option<&image::Handle> {
        match &self.thumbnail {
            Some((token, handle)) if *token == self.machine.latest_request() => Some(handle),
            _ => None,
        }
    }

    /// Feed an event to the machine and turn its command into a task
    fn dispatch(&mut self, event: Event) -> Task<Message> {
        match self.machine.apply(event) {
            Command::None => Task::none(),
            Command::Resolve { token, url } => {
                info!(?token, url = %url, "Resolving media info");
                self.thumbnail = None;
                if let Some((previous, handle)) = self.in_flight.take() {
                    debug!(?previous, "Aborting superseded resolution");
                    handle.abort();
                }
                let coordinator = self.coordinator.clone();

                let (task, handle) = Task::perform(
                    async move { coordinator.resolve(url).await },
                    move |result| Message::InfoResolved(token, result),
                )
                .abortable();
                self.in_flight = Some((token, handle));
                task
            }
            Command::Download {
                request,
                confirmation,
            } => {
                let title = self
                    .machine
                    .resolved_media()
                    .map(|media| media.title.clone())
                    .unwrap_or_default();

                Task::batch(vec![
                    self.confirmation_timer(confirmation),
                    self.hand_off(request, title),
                ])
            }
        }
    }

    fn confirmation_timer(&self, confirmation: ConfirmationToken) -> Task<Message> {
        let timeout = self.confirmation_timeout;
        Task::perform(
            async move {
                tokio::time::sleep(timeout).await;
                confirmation
            },
            Message::ConfirmationElapsed,
        )
    }

    fn hand_off(&self, request: DownloadRequest, title: String) -> Task<Message> {
        info!(
            url = %request.url,
            media_type = %request.media_type,
            quality = %request.quality,
            "Starting download"
        );
        let coordinator = self.coordinator.clone();

        Task::perform(
            async move { coordinator.hand_off(request, title).await },
            Message::HandoffFinished,
        )
    }

    fn load_thumbnail(&self, token: RequestToken, media: &ResolvedMedia) -> Task<Message> {
        let coordinator = self.coordinator.clone();
        let thumbnail_url = media.thumbnail_url.clone();

        Task::perform(
            async move { coordinator.load_thumbnail(thumbnail_url).await },
            move |result| Message::ThumbnailLoaded(token, result),
        )
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    UiMessage(DownloadMessage),
    InfoResolved(RequestToken, Result<ResolvedMedia, AppError>),
    ThumbnailLoaded(RequestToken, Result<Thumbnail, AppError>),
    ConfirmationElapsed(ConfirmationToken),
    /// Outcome of writing a download to disk; not tracked by the machine
    HandoffFinished(Result<HandoffOutcome, AppError>),
}

pub fn update(app: &mut DownloadApp, message: Message) -> Task<Message> {
    match message {
        Message::UiMessage(ui_msg) => {
            app.view.update(ui_msg.clone());

            match ui_msg {
                DownloadMessage::SubmitPressed => {
                    let raw = app.view.url_input.clone();
                    return app.dispatch(Event::Submit(raw));
                }
                DownloadMessage::TypeSelected(media_type) => {
                    return app.dispatch(Event::TypeSelected(media_type));
                }
                DownloadMessage::TierSelected(quality) => {
                    return app.dispatch(Event::TierSelected(quality));
                }
                DownloadMessage::DownloadPressed => {
                    return app.dispatch(Event::DownloadTriggered);
                }
                DownloadMessage::UrlChanged(_) | DownloadMessage::DropdownToggled => {}
            }
        }
        Message::InfoResolved(token, outcome) => {
            if let Err(e) = &outcome {
                debug!(?token, "Resolution failed: {}", e);
            }

            if matches!(app.in_flight, Some((current, _)) if current == token) {
                app.in_flight = None;
            }
            let task = app.dispatch(Event::Resolved { token, outcome });

            if token == app.machine.latest_request() {
                if let Some(media) = app.machine.resolved_media() {
                    info!(title = %media.title, source = %media.source_name, "Media resolved");
                    return Task::batch(vec![task, app.load_thumbnail(token, media)]);
                }
            }
            return task;
        }
        Message::ThumbnailLoaded(token, result) => {
            if token != app.machine.latest_request() || !app.machine.can_download() {
                debug!(?token, "Dropping stale thumbnail");
                return Task::none();
            }

            match result {
                Ok(thumbnail) => {
                    let handle =
                        image::Handle::from_rgba(thumbnail.width, thumbnail.height, thumbnail.rgba);
                    app.thumbnail = Some((token, handle));
                }
                Err(e) => {
                    warn!("Failed to load thumbnail: {}", e);
                }
            }
        }
        Message::ConfirmationElapsed(confirmation) => {
            return app.dispatch(Event::ConfirmationElapsed(confirmation));
        }
        Message::HandoffFinished(result) => match result {
            Ok(HandoffOutcome::Saved { path, bytes }) => {
                info!("Saved {} bytes to {}", bytes, path.display());
            }
            Ok(HandoffOutcome::Cancelled) => {
                info!("Download cancelled");
            }
            Err(e) => {
                warn!("Download failed: {:?}", e);
            }
        },
    }
    Task::none()
}

pub fn view(app: &DownloadApp) -> iced::Element<'_, Message> {
    app.view
        .view(&app.machine, app.current_thumbnail())
        .map(Message::UiMessage)
}
