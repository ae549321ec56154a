// SPDX-License-Identifier: MPL-2.0
//! Event subscriptions for the application.
//!
//! A fixed-rate tick drives every animation and the playback backend;
//! window resizes keep the stage in sync; any key press toggles the
//! sidebar so an operator can reach the settings without a pointer.

use super::{App, Message};
use iced::{event, time, Subscription};
use std::time::Duration;

/// Cadence of the animation tick.
const TICK_INTERVAL: Duration = Duration::from_millis(16);

pub fn create(_app: &App) -> Subscription<Message> {
    let ticks = time::every(TICK_INTERVAL).map(Message::Tick);

    let events = event::listen_with(|event, _status, _window| match event {
        iced::Event::Window(iced::window::Event::Resized(size)) => {
            Some(Message::WindowResized(size))
        }
        iced::Event::Keyboard(iced::keyboard::Event::KeyPressed { .. }) => {
            Some(Message::ToggleSideBar)
        }
        _ => None,
    });

    Subscription::batch([ticks, events])
}
