mod api;
mod app;
mod application;
mod config;
mod domain;
mod ui;
mod utils;

use iced::window;
use tracing::info;

use crate::config::AppConfig;

fn main() -> iced::Result {
    let config = AppConfig::from_env();

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    info!(server = %config.api.base_url, "Starting Media Grabber");

    iced::application(
        move || app::DownloadApp::new(config.clone()),
        app::update,
        app::view,
    )
    .title("Media Grabber")
    .window(window::Settings {
        size: iced::Size::new(520.0, 640.0),
        ..Default::default()
    })
    .run()
}
