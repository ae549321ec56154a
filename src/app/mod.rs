// SPDX-License-Identifier: MPL-2.0
//! Application root state and orchestration of the kiosk stage.
//!
//! The `App` struct wires the stage, the video service, the six corner fan
//! buttons, and the sidebar together, and translates messages into side
//! effects like config persistence or full-screen playback choreography.
//! Policy decisions (window sizing, button visibility, sidebar coupling)
//! stay close to the update loop so user-facing behavior is easy to audit.

mod message;
mod subscription;
mod update;
mod view;

pub use message::{Flags, Message};

use crate::config::{self, Config};
use crate::fan::{FanButton, MaxItems};
use crate::i18n::fluent::I18n;
use crate::layout::anchor::CORNER_SPECS;
use crate::menu::{Menu, SideBar, VideoMenu};
use crate::stage::Stage;
use crate::video::{FfmpegBackend, MomentLength, SourceUri, VideoService};
use iced::{window, Size, Subscription, Task, Theme};
use std::fmt;

pub const WINDOW_DEFAULT_WIDTH: u32 = 1280;
pub const WINDOW_DEFAULT_HEIGHT: u32 = 800;
pub const MIN_WINDOW_WIDTH: u32 = 800;
pub const MIN_WINDOW_HEIGHT: u32 = 600;

/// Resting width of the sidebar panel.
pub const SIDEBAR_WIDTH: f32 = 300.0;

/// Root application state bridging the stage to the Iced runtime.
pub struct App {
    pub i18n: I18n,
    stage: Stage,
    service: VideoService,
    buttons: Vec<FanButton>,
    menu: Menu,
    video_menu: VideoMenu,
    sidebar: SideBar,
    /// Set during the first full-screen playback pass; keeps every button
    /// invisible until the intermission.
    buttons_hidden: bool,
    /// Which button (if any) the current pointer sequence is talking to.
    touch_target: Option<update::TouchTarget>,
    /// Localized message for the most recent playback failure, shown in
    /// the sidebar until the next load attempt.
    last_error: Option<String>,
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("buttons", &self.buttons.len())
            .field("sidebar_open", &self.sidebar.is_open())
            .finish()
    }
}

/// Builds the window settings.
pub fn window_settings() -> window::Settings {
    window::Settings {
        size: Size::new(WINDOW_DEFAULT_WIDTH as f32, WINDOW_DEFAULT_HEIGHT as f32),
        min_size: Some(Size::new(MIN_WINDOW_WIDTH as f32, MIN_WINDOW_HEIGHT as f32)),
        ..window::Settings::default()
    }
}

/// Entry point used by `main.rs` to launch the Iced application loop.
pub fn run(flags: Flags) -> iced::Result {
    use std::cell::RefCell;

    // Wrap flags in RefCell<Option<_>> to satisfy the Fn trait requirement
    // while only consuming flags once (iced 0.14 requires Fn, not FnOnce).
    let boot_state = RefCell::new(Some(flags));
    let boot = move || {
        let flags = boot_state
            .borrow_mut()
            .take()
            .expect("Boot function called more than once");
        App::new(flags)
    };

    iced::application(boot, App::update, App::view)
        .title(App::title)
        .theme(App::theme)
        .window(window_settings())
        .subscription(App::subscription)
        .run()
}

impl App {
    /// Initializes all components and optionally queues a startup video
    /// from the launcher flags or the config file.
    fn new(flags: Flags) -> (Self, Task<Message>) {
        let config = config::load().unwrap_or_else(|error| {
            log::warn!("could not load config: {error}");
            Config::default()
        });
        let i18n = I18n::new(flags.lang.clone(), &config);

        let max_items = MaxItems::new(config.max_items.unwrap_or(MaxItems::DEFAULT));
        let moment_length = MomentLength::new(config.moment_secs.unwrap_or(MomentLength::DEFAULT));

        let mut stage = Stage::new(Size::new(
            WINDOW_DEFAULT_WIDTH as f32,
            WINDOW_DEFAULT_HEIGHT as f32,
        ));
        let mut service = VideoService::new(Box::new(FfmpegBackend::new()), &mut stage);
        let buttons: Vec<FanButton> = CORNER_SPECS
            .iter()
            .map(|&spec| FanButton::new(spec, max_items, &mut stage))
            .collect();
        let mut video_menu = VideoMenu::new(&mut stage);

        let startup = flags
            .video
            .or_else(|| config.video.as_ref().map(std::path::PathBuf::from));
        if let Some(path) = startup {
            let label = path
                .file_name()
                .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
            let source = SourceUri::from(path.to_string_lossy().as_ref());
            video_menu.begin_add(source, label, &mut stage, &mut service);
        }

        let mut app = App {
            i18n,
            stage,
            service,
            buttons,
            menu: Menu::new(max_items, moment_length),
            video_menu,
            sidebar: SideBar::new(SIDEBAR_WIDTH),
            buttons_hidden: false,
            touch_target: None,
            last_error: None,
        };
        app.apply_button_visibility();
        (app, Task::none())
    }

    fn title(&self) -> String {
        self.i18n.tr("app-title")
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }

    fn subscription(&self) -> Subscription<Message> {
        subscription::create(self)
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        update::update(self, message)
    }

    fn view(&self) -> iced::Element<'_, Message> {
        view::view(self)
    }

    /// Buttons hide during full-screen playback, show fully while the
    /// sidebar is open, and otherwise only as capture targets.
    fn apply_button_visibility(&mut self) {
        let sidebar_open = self.sidebar.is_open();
        for button in &mut self.buttons {
            let visible = !self.buttons_hidden
                && (sidebar_open || button.state() != crate::fan::ButtonState::Collapsed);
            let node = button.node();
            self.stage.set_opacity(node, if visible { 1.0 } else { 0.0 });
        }
    }
}
