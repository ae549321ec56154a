// SPDX-License-Identifier: MPL-2.0
//! Moment playback windows.
//!
//! A "moment" is a short clip centered on the position at which a frame was
//! captured. Replaying an item plays its moment window instead of the whole
//! source.

use std::fmt;
use std::time::Duration;

/// Length of a moment window in whole seconds.
///
/// Clamped to `1..=30`; the menu slider adjusts it at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MomentLength(u64);

impl MomentLength {
    /// Minimum length in seconds.
    pub const MIN: u64 = 1;
    /// Maximum length in seconds.
    pub const MAX: u64 = 30;
    /// Default length in seconds.
    pub const DEFAULT: u64 = 5;

    /// Creates a length, clamping to the valid range.
    #[must_use]
    pub fn new(secs: u64) -> Self {
        Self(secs.clamp(Self::MIN, Self::MAX))
    }

    #[must_use]
    pub fn secs(self) -> u64 {
        self.0
    }

    #[must_use]
    pub fn as_duration(self) -> Duration {
        Duration::from_secs(self.0)
    }
}

impl Default for MomentLength {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl fmt::Display for MomentLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} s", self.0)
    }
}

/// A playback window around a captured position.
///
/// The window starts half the moment length before the capture position,
/// clamped to the start of the source, and runs for the full length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MomentWindow {
    start: Duration,
    length: Duration,
}

impl MomentWindow {
    /// Builds the window around `captured_at` with the given length.
    #[must_use]
    pub fn around(captured_at: Duration, length: MomentLength) -> Self {
        let half = length.as_duration() / 2;
        Self {
            start: captured_at.saturating_sub(half),
            length: length.as_duration(),
        }
    }

    /// Where replay of this window begins.
    #[must_use]
    pub fn start(&self) -> Duration {
        self.start
    }

    /// Where replay of this window ends.
    #[must_use]
    pub fn end(&self) -> Duration {
        self.start + self.length
    }

    /// Whether `position` has reached or passed the end of the window.
    #[must_use]
    pub fn is_elapsed(&self, position: Duration) -> bool {
        position >= self.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_is_clamped() {
        assert_eq!(MomentLength::new(0).secs(), 1);
        assert_eq!(MomentLength::new(31).secs(), 30);
        assert_eq!(MomentLength::new(7).secs(), 7);
        assert_eq!(MomentLength::default().secs(), 5);
    }

    #[test]
    fn window_starts_half_length_before_capture() {
        let window = MomentWindow::around(Duration::from_secs(20), MomentLength::new(6));
        assert_eq!(window.start(), Duration::from_secs(17));
        assert_eq!(window.end(), Duration::from_secs(23));
    }

    #[test]
    fn window_clamps_to_source_start() {
        let window = MomentWindow::around(Duration::from_secs(1), MomentLength::new(10));
        assert_eq!(window.start(), Duration::ZERO);
        assert_eq!(window.end(), Duration::from_secs(10));
    }

    #[test]
    fn elapsed_at_window_end() {
        let window = MomentWindow::around(Duration::from_secs(10), MomentLength::new(4));
        assert!(!window.is_elapsed(Duration::from_secs(11)));
        assert!(window.is_elapsed(Duration::from_secs(12)));
        assert!(window.is_elapsed(Duration::from_secs(30)));
    }
}
