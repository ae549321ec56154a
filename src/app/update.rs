// SPDX-License-Identifier: MPL-2.0
//! Message handling for the application.
//!
//! Pointer sequences are resolved once, when they begin: the node hit at
//! that moment decides whether the sequence talks to a fan item, a corner
//! button, or the sidebar grab handle, and every later event of the
//! sequence goes to the same target.

use super::{App, Message};
use crate::config;
use crate::fan::{ButtonState, FanButtonEvent};
use crate::gesture::{TouchInput, TouchPhase};
use crate::menu::{EntryId, MenuEvent, VideoMenuEvent};
use crate::stage::NodeId;
use crate::video::{SourceUri, VideoEvent};
use iced::Task;
use std::path::PathBuf;
use std::time::Instant;

/// Width of the strip along the left edge that grabs the sidebar.
const SIDEBAR_GRAB_WIDTH: f32 = 32.0;

/// What a pointer sequence is bound to for its lifetime.
#[derive(Debug, Clone, Copy)]
pub(super) enum TouchTarget {
    /// A fan item; all events go through its gesture recognizers.
    Item { button: usize, node: NodeId },
    /// A corner button; a completed tap triggers it.
    Button(usize),
    /// The sidebar grab handle; horizontal drag follows the pointer.
    SideBar,
}

pub fn update(app: &mut App, message: Message) -> Task<Message> {
    match message {
        Message::Tick(now) => on_tick(app, now),
        Message::Touch(touch) => on_touch(app, touch),
        Message::WindowResized(size) => {
            let now = Instant::now();
            app.stage.resize(size);
            for button in &mut app.buttons {
                button.place(&mut app.stage, now);
            }
            Task::none()
        }
        Message::ToggleSideBar => {
            let now = Instant::now();
            if app.sidebar.is_open() {
                app.sidebar.close(now);
            } else {
                app.sidebar.open(now);
            }
            app.apply_button_visibility();
            Task::none()
        }
        Message::MaxItemsChanged(value) => {
            let now = Instant::now();
            let MenuEvent::MaxItemsChanged(max_items) = app.menu.set_max_items(value as usize)
            else {
                return Task::none();
            };
            for index in 0..app.buttons.len() {
                let events = app.buttons[index].set_max_items(
                    max_items,
                    &mut app.stage,
                    &mut app.service,
                    now,
                );
                notify_menu(app, &events);
            }
            persist_config(app);
            Task::none()
        }
        Message::MomentSecsChanged(value) => {
            app.menu.set_moment_secs(u64::from(value));
            persist_config(app);
            Task::none()
        }
        Message::ResetPressed => {
            let now = Instant::now();
            app.menu.request_reset();
            for button in &mut app.buttons {
                button.reset(&mut app.stage, &mut app.service, now);
            }
            app.apply_button_visibility();
            Task::none()
        }
        Message::AddVideoPressed => Task::perform(
            async move {
                rfd::AsyncFileDialog::new()
                    .add_filter("video", &["mp4", "webm", "mkv", "avi", "mov"])
                    .pick_file()
                    .await
                    .map(|h| h.path().to_path_buf())
            },
            Message::AddVideoDialogResult,
        ),
        Message::AddVideoDialogResult(path) => {
            if let Some(path) = path {
                begin_add_video(app, path);
            }
            Task::none()
        }
        Message::EntryTapped(id) => on_entry_tapped(app, id),
        Message::EntryRemovePressed(id) => {
            let events = app
                .video_menu
                .remove_entry(id, &mut app.stage, &mut app.service);
            apply_video_menu_events(app, &events);
            Task::none()
        }
    }
}

fn on_tick(app: &mut App, now: Instant) -> Task<Message> {
    app.sidebar.tick(now);

    let video_events = app.service.tick(now, &mut app.stage);
    for event in &video_events {
        let menu_events =
            app.video_menu
                .handle_video_event(event, &mut app.stage, &mut app.service);
        apply_video_menu_events(app, &menu_events);
        if let VideoEvent::ActivationFailed { error, .. } = event {
            log::warn!("activation failed: {error}");
            app.last_error = Some(app.i18n.tr(error.i18n_key()));
        }
    }

    let probe_events = app.video_menu.tick(&mut app.stage, &mut app.service);
    apply_video_menu_events(app, &probe_events);

    for index in 0..app.buttons.len() {
        let events = app.buttons[index].tick(now, &mut app.stage);
        notify_menu(app, &events);
    }
    Task::none()
}

fn on_touch(app: &mut App, touch: TouchInput) -> Task<Message> {
    let now = Instant::now();

    if touch.phase == TouchPhase::Began {
        app.touch_target = resolve_target(app, touch);
    }
    let Some(target) = app.touch_target else {
        return Task::none();
    };

    match target {
        TouchTarget::Item { button, node } => {
            if let Some((id, gesture)) = app.buttons[button].handle_touch(node, touch, now) {
                let events = app.buttons[button].on_gesture(
                    id,
                    gesture,
                    &mut app.stage,
                    &mut app.service,
                    now,
                );
                notify_menu(app, &events);
            }
        }
        TouchTarget::Button(index) => {
            if touch.phase == TouchPhase::Ended {
                on_button_tapped(app, index, now);
            }
        }
        TouchTarget::SideBar => match touch.phase {
            TouchPhase::Began => app.sidebar.begin_drag(touch.position.x),
            TouchPhase::Moved => app.sidebar.drag_to(touch.position.x),
            TouchPhase::Ended | TouchPhase::Cancelled => {
                app.sidebar.end_drag(now);
                app.apply_button_visibility();
            }
        },
    }

    if matches!(touch.phase, TouchPhase::Ended | TouchPhase::Cancelled) {
        app.touch_target = None;
    }
    Task::none()
}

fn resolve_target(app: &App, touch: TouchInput) -> Option<TouchTarget> {
    if let Some(node) = app.stage.node_at(touch.position) {
        for (index, button) in app.buttons.iter().enumerate() {
            if button.node() == node {
                return Some(TouchTarget::Button(index));
            }
            if button.fan().item_at(node).is_some() {
                return Some(TouchTarget::Item {
                    button: index,
                    node,
                });
            }
        }
    }
    let grab_edge = app.sidebar.offset() + SIDEBAR_GRAB_WIDTH;
    if touch.position.x <= grab_edge.max(SIDEBAR_GRAB_WIDTH) {
        return Some(TouchTarget::SideBar);
    }
    None
}

/// While the sidebar is open an inactive button becomes the capture target
/// and an active one resets; while it is closed an active button captures
/// a moment.
fn on_button_tapped(app: &mut App, index: usize, now: Instant) {
    if app.sidebar.is_open() {
        match app.buttons[index].state() {
            ButtonState::Collapsed => {
                app.buttons[index].activate();
            }
            ButtonState::Active | ButtonState::Expanded => {
                app.buttons[index].reset(&mut app.stage, &mut app.service, now);
            }
        }
        app.apply_button_visibility();
        return;
    }

    if app.buttons[index].state() == ButtonState::Active {
        let moment_length = app.menu.moment_length();
        match app.buttons[index].capture(&mut app.stage, &mut app.service, moment_length, now) {
            Ok(events) => notify_menu(app, &events),
            Err(error) => log::debug!("capture skipped: {error}"),
        }
    }
}

fn on_entry_tapped(app: &mut App, id: EntryId) -> Task<Message> {
    let now = Instant::now();
    app.last_error = None;
    let events = app
        .video_menu
        .tap_entry(id, now, &mut app.stage, &mut app.service);
    apply_video_menu_events(app, &events);
    Task::none()
}

fn begin_add_video(app: &mut App, path: PathBuf) {
    app.last_error = None;
    let label = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    let source = SourceUri::from(path.to_string_lossy().as_ref());
    let events = app
        .video_menu
        .begin_add(source, label, &mut app.stage, &mut app.service);
    apply_video_menu_events(app, &events);
}

fn apply_video_menu_events(app: &mut App, events: &[VideoMenuEvent]) {
    let now = Instant::now();
    for event in events {
        match event {
            VideoMenuEvent::PlaybackStarted => {
                app.buttons_hidden = true;
                app.sidebar.close(now);
                for button in &mut app.buttons {
                    button.reset(&mut app.stage, &mut app.service, now);
                }
                app.apply_button_visibility();
            }
            VideoMenuEvent::Intermission => {
                app.buttons_hidden = false;
                app.apply_button_visibility();
            }
            VideoMenuEvent::PlaybackFinished => {
                app.buttons_hidden = false;
                for button in &mut app.buttons {
                    button.expand(&mut app.stage, now);
                }
                app.apply_button_visibility();
            }
            VideoMenuEvent::ProbeFailed { source, error } => {
                log::warn!("could not add {source}: {error}");
                app.last_error = Some(app.i18n.tr(error.i18n_key()));
            }
            VideoMenuEvent::ItemAdded(_) | VideoMenuEvent::ItemRemoved(_) => {}
        }
    }
}

fn notify_menu(app: &mut App, events: &[FanButtonEvent]) {
    for event in events {
        if let FanButtonEvent::Fan(fan_event) = event {
            app.menu.notify(*fan_event);
        }
    }
}

fn persist_config(app: &App) {
    let config = config::Config {
        max_items: Some(app.menu.max_items().get()),
        moment_secs: Some(app.menu.moment_length().secs()),
        ..config::load().unwrap_or_default()
    };
    if let Err(error) = config::save(&config) {
        log::warn!("could not save config: {error}");
    }
}
