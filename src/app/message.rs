// SPDX-License-Identifier: MPL-2.0
//! Top-level messages and runtime flags for the application.

use crate::gesture::TouchInput;
use crate::menu::EntryId;
use std::path::PathBuf;
use std::time::Instant;

/// Launch parameters from `main.rs`.
#[derive(Debug, Clone, Default)]
pub struct Flags {
    /// Language override (`--lang`), e.g. `nl`.
    pub lang: Option<String>,
    /// Video to add to the library at startup.
    pub video: Option<PathBuf>,
}

/// Top-level messages consumed by `App::update`. The variants forward
/// lower-level component messages while keeping a single update entrypoint.
#[derive(Debug, Clone)]
pub enum Message {
    /// Periodic tick driving every animation and the playback backend.
    Tick(Instant),
    /// Raw pointer event mapped onto the stage canvas.
    Touch(TouchInput),
    /// The window was resized; the stage follows it.
    WindowResized(iced::Size),
    ToggleSideBar,
    /// Capacity slider moved.
    MaxItemsChanged(u32),
    /// Moment length slider moved.
    MomentSecsChanged(u32),
    /// Reset button: empty every fan.
    ResetPressed,
    /// "Add video" entry tapped; opens the file dialog.
    AddVideoPressed,
    /// Result from the add-video file dialog.
    AddVideoDialogResult(Option<PathBuf>),
    /// A library entry was tapped; starts full-screen playback.
    EntryTapped(EntryId),
    /// Remove control on a library entry.
    EntryRemovePressed(EntryId),
}
