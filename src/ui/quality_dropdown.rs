use iced::{
    widget::{button, column, container, row, text, Column, Space},
    Alignment, Element, Length, Theme,
};

use super::DownloadMessage;
use crate::domain::TierInfo;

type ButtonStyle = fn(&Theme, button::Status) -> button::Style;

/// Custom dropdown listing every tier with its description and badge.
///
/// The header always shows `selected`; the option list is only rendered while
/// `open` is set.
pub fn quality_dropdown<'a>(
    options: [TierInfo; 4],
    selected: TierInfo,
    open: bool,
) -> Element<'a, DownloadMessage> {
    let header = button(
        row![
            text(selected.label).size(14),
            Space::new().width(Length::Fill),
            badge(selected.badge),
            text(if open { "▴" } else { "▾" }).size(14),
        ]
        .spacing(8)
        .align_y(Alignment::Center),
    )
    .width(Length::Fill)
    .padding([8, 12])
    .style(button::secondary)
    .on_press(DownloadMessage::DropdownToggled);

    let mut list = Column::new().push(header).spacing(2);

    if open {
        for option in options {
            let style: ButtonStyle = if option.tier == selected.tier {
                button::primary
            } else {
                button::text
            };

            list = list.push(
                button(
                    row![
                        column![
                            text(option.label).size(14),
                            text(option.description).size(11),
                        ]
                        .spacing(2),
                        Space::new().width(Length::Fill),
                        badge(option.badge),
                    ]
                    .align_y(Alignment::Center),
                )
                .width(Length::Fill)
                .padding([6, 12])
                .style(style)
                .on_press(DownloadMessage::TierSelected(option.tier)),
            );
        }
    }

    list.into()
}

fn badge<'a>(label: &'static str) -> Element<'a, DownloadMessage> {
    container(text(label).size(11))
        .padding([2, 6])
        .style(container::rounded_box)
        .into()
}
