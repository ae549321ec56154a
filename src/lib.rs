// SPDX-License-Identifier: MPL-2.0
//! `iced_kiosk` is a gesture-driven touch kiosk built with the Iced GUI
//! framework.
//!
//! Visitors capture moments from a playing video into fans of thumbnails
//! anchored at the screen corners, replay them with a tap, and rearrange
//! them with pinch and drag gestures. The crate demonstrates a headless
//! scene graph, a shared video playback surface multiplexed across logical
//! players, internationalization with Fluent, and modular UI design.

#![doc(html_root_url = "https://docs.rs/iced_kiosk/0.2.0")]

pub mod animation;
pub mod app;
pub mod config;
pub mod error;
pub mod fan;
pub mod gesture;
pub mod i18n;
pub mod layout;
pub mod menu;
pub mod stage;
pub mod video;

#[cfg(test)]
pub mod test_utils;
