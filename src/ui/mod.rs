mod quality_dropdown;

use iced::{
    widget::{button, column, image, row, text, text_input, Column, Row, Space},
    Alignment, Element, Length, Theme,
};

use crate::domain::{MediaType, QualityTier, ResolvedMedia, SelectionMachine};
use quality_dropdown::quality_dropdown;

type ButtonStyle = fn(&Theme, button::Status) -> button::Style;

/// View-only state. Everything else is read from the [`SelectionMachine`].
#[derive(Debug, Default)]
pub struct DownloadView {
    pub url_input: String,
    pub dropdown_open: bool,
}

#[derive(Debug, Clone)]
pub enum DownloadMessage {
    UrlChanged(String),
    SubmitPressed,
    TypeSelected(MediaType),
    DropdownToggled,
    TierSelected(QualityTier),
    DownloadPressed,
}

impl DownloadView {
    pub fn update(&mut self, message: DownloadMessage) {
        match message {
            DownloadMessage::UrlChanged(url) => {
                self.url_input = url;
            }
            DownloadMessage::DropdownToggled => {
                self.dropdown_open = !self.dropdown_open;
            }
            DownloadMessage::TierSelected(_) | DownloadMessage::SubmitPressed => {
                self.dropdown_open = false;
            }
            DownloadMessage::TypeSelected(_) | DownloadMessage::DownloadPressed => {
                // Will be handled by the app
            }
        }
    }

    pub fn view<'a>(
        &'a self,
        machine: &'a SelectionMachine,
        thumbnail: Option<&'a image::Handle>,
    ) -> Element<'a, DownloadMessage> {
        let loading = machine.is_loading();

        let submit = button(text(if loading { "Resolving..." } else { "Proceed" }))
            .padding([10, 20])
            .on_press_maybe((!loading).then_some(DownloadMessage::SubmitPressed));

        let mut content = column![
            text("Media Grabber").size(32),
            Space::new().height(Length::Fixed(20.0)),
            text("Media URL:").size(16),
            row![
                text_input("Paste a video or audio link...", &self.url_input)
                    .on_input(DownloadMessage::UrlChanged)
                    .on_submit(DownloadMessage::SubmitPressed)
                    .padding(10),
                submit,
            ]
            .spacing(10)
            .align_y(Alignment::Center),
        ]
        .padding(20)
        .spacing(10);

        if let Some(message) = machine.error_message() {
            content = content.push(text(message).size(14).style(text::danger));
        }

        if let Some(media) = machine.resolved_media() {
            content = content.push(self.result_view(machine, media, thumbnail));
        }

        if machine.confirmation_visible() {
            content = content.push(
                text("Download started. Choose where to save the file when prompted.")
                    .size(14)
                    .style(text::success),
            );
        }

        content.into()
    }

    fn result_view<'a>(
        &'a self,
        machine: &'a SelectionMachine,
        media: &'a ResolvedMedia,
        thumbnail: Option<&'a image::Handle>,
    ) -> Element<'a, DownloadMessage> {
        let mut details = column![
            text(&media.title).size(18),
            text(&media.source_name).size(12),
        ]
        .spacing(4);
        if let Some(duration) = media.duration_label() {
            details = details.push(text(duration).size(12));
        }

        let mut summary = Row::new().spacing(12).align_y(Alignment::Center);
        if let Some(handle) = thumbnail {
            summary = summary.push(image(handle.clone()).width(Length::Fixed(90.0)));
        }
        summary = summary.push(details);

        let toggle = MediaType::ALL
            .into_iter()
            .fold(Row::new().spacing(4), |toggle, media_type| {
                let style: ButtonStyle = if media_type == machine.media_type() {
                    button::primary
                } else {
                    button::secondary
                };
                toggle.push(
                    button(text(media_type.label()))
                        .padding([8, 16])
                        .style(style)
                        .on_press(DownloadMessage::TypeSelected(media_type)),
                )
            });

        let download = button(text("Download"))
            .padding([10, 20])
            .style(button::success)
            .on_press_maybe(
                machine
                    .can_download()
                    .then_some(DownloadMessage::DownloadPressed),
            );

        Column::new()
            .push(summary)
            .push(Space::new().height(Length::Fixed(10.0)))
            .push(toggle)
            .push(text("Quality:").size(14))
            .push(quality_dropdown(
                machine.quality_options(),
                machine.selected_tier(),
                self.dropdown_open,
            ))
            .push(download)
            .spacing(10)
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dropdown_toggles_and_closes_on_selection() {
        let mut view = DownloadView::default();
        view.update(DownloadMessage::DropdownToggled);
        assert!(view.dropdown_open);

        view.update(DownloadMessage::TierSelected(QualityTier::Low));
        assert!(!view.dropdown_open);

        view.update(DownloadMessage::DropdownToggled);
        view.update(DownloadMessage::DropdownToggled);
        assert!(!view.dropdown_open);
    }

    #[test]
    fn test_url_edit_only_touches_input() {
        let mut view = DownloadView::default();
        view.update(DownloadMessage::UrlChanged("https://x/y".to_string()));
        assert_eq!(view.url_input, "https://x/y");
        assert!(!view.dropdown_open);
    }
}
