// SPDX-License-Identifier: MPL-2.0
//! Playback backend port definition.
//!
//! [`VideoBackend`] is the seam between the kiosk's player multiplexing and
//! the actual decoding machinery. The FFmpeg adapter implements it for
//! production; tests drive the [`crate::video::VideoService`] with a
//! scripted implementation.
//!
//! # Design Notes
//!
//! - The backend is **stateful**: one source loaded at a time, a current
//!   position, a current frame.
//! - Loading is split into [`LoadStart::Ready`] (metadata available
//!   immediately) and [`LoadStart::Pending`] (metadata arrives later as a
//!   [`MediaEvent::MetadataLoaded`]). Both paths converge on the same
//!   activation continuation in the service.
//! - Methods are not `async`; waiting is expressed through events drained
//!   by the application tick.

use crate::error::VideoError;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Identifies a playable source (a file path or URL).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceUri(String);

impl SourceUri {
    #[must_use]
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceUri {
    fn from(uri: &str) -> Self {
        Self::new(uri)
    }
}

/// Metadata of a loaded source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceMetadata {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Duration in seconds.
    pub duration_secs: f64,
    /// Frames per second.
    pub fps: f64,
}

/// A decoded frame of the currently loaded source.
///
/// Pixel data is shared to avoid cloning a full frame on every handoff.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFrame {
    /// RGBA pixel data (width × height × 4 bytes).
    pub rgba: Arc<Vec<u8>>,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
}

impl RawFrame {
    #[must_use]
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Self {
        debug_assert_eq!(rgba.len(), (width * height * 4) as usize);
        Self {
            rgba: Arc::new(rgba),
            width,
            height,
        }
    }

    /// Returns the total size in bytes.
    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.rgba.len()
    }
}

/// Outcome of starting to load a source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoadStart {
    /// Metadata was available immediately; the source is ready to seek.
    Ready(SourceMetadata),
    /// Metadata is still being probed; a [`MediaEvent::MetadataLoaded`] or
    /// [`MediaEvent::LoadFailed`] follows.
    Pending,
}

/// Events surfaced by the backend, drained on the application tick.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// A pending load finished probing its metadata.
    MetadataLoaded(SourceMetadata),
    /// A pending load failed; no source is loaded afterwards.
    LoadFailed(VideoError),
    /// Playback reached the end of the loaded source.
    Ended,
}

/// Port for the single shared playback surface.
///
/// Exactly one implementation instance exists per kiosk and it is owned by
/// the [`crate::video::VideoService`]; nothing else touches the loaded
/// source, position, or playback state.
pub trait VideoBackend: Send {
    /// Starts loading a source, replacing whatever was loaded before.
    ///
    /// # Errors
    ///
    /// Returns a [`VideoError`] if loading cannot even start (for example,
    /// the file does not exist).
    fn load(&mut self, source: &SourceUri) -> Result<LoadStart, VideoError>;

    /// Seeks the loaded source.
    ///
    /// # Errors
    ///
    /// Returns a [`VideoError`] if nothing is loaded or the seek fails.
    fn seek(&mut self, position: Duration) -> Result<(), VideoError>;

    /// Starts playback of the loaded source.
    fn play(&mut self);

    /// Pauses playback, keeping the position.
    fn pause(&mut self);

    /// Whether playback is currently running.
    fn is_playing(&self) -> bool;

    /// The current playback position of the loaded source.
    fn position(&self) -> Duration;

    /// The most recently decoded frame, if any.
    fn current_frame(&self) -> Option<RawFrame>;

    /// Advances playback and drains pending events.
    fn tick(&mut self, now: Instant) -> Vec<MediaEvent>;
}
