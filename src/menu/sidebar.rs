// SPDX-License-Identifier: MPL-2.0
//! Drag-out settings panel.
//!
//! The sidebar slides in from the stage edge. It can be dragged by its
//! handle; on release it snaps open or closed depending on how far it was
//! pulled. While a video plays full-screen the sidebar hides entirely.

use crate::animation::Fade;
use std::time::{Duration, Instant};

/// Share of the panel width the handle can travel.
const DRAG_RATIO: f32 = 0.9;
/// Past this openness, a released drag snaps open.
const SNAP_THRESHOLD: f32 = 0.5;
const SLIDE_STEPS: u32 = 8;
const SLIDE_INTERVAL: Duration = Duration::from_millis(20);

/// Notifications the sidebar emits when it settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideBarEvent {
    Opened,
    Closed,
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    start_x: f32,
    start_openness: f32,
}

/// Slide-out panel state. Openness runs from 0 (closed) to 1 (open); the
/// rendered offset is `openness * width * DRAG_RATIO`.
#[derive(Debug)]
pub struct SideBar {
    width: f32,
    slide: Fade,
    drag: Option<Drag>,
    hidden: bool,
}

impl SideBar {
    #[must_use]
    pub fn new(width: f32) -> Self {
        Self {
            width,
            slide: Fade::new(0.0),
            drag: None,
            hidden: false,
        }
    }

    /// How far the panel sticks out, in pixels.
    #[must_use]
    pub fn offset(&self) -> f32 {
        if self.hidden {
            return 0.0;
        }
        self.slide.current() * self.width * DRAG_RATIO
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        !self.hidden && self.slide.current() >= SNAP_THRESHOLD
    }

    /// Hidden during full-screen playback; dragging is disabled too.
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn hide(&mut self) {
        self.hidden = true;
        self.drag = None;
    }

    pub fn show(&mut self) {
        self.hidden = false;
    }

    pub fn open(&mut self, now: Instant) {
        self.slide.fade_to(1.0, SLIDE_STEPS, SLIDE_INTERVAL, now);
    }

    pub fn close(&mut self, now: Instant) {
        self.slide.fade_to(0.0, SLIDE_STEPS, SLIDE_INTERVAL, now);
    }

    /// Grabs the handle at `x`.
    pub fn begin_drag(&mut self, x: f32) {
        if self.hidden {
            return;
        }
        self.drag = Some(Drag {
            start_x: x,
            start_openness: self.slide.current(),
        });
    }

    /// Follows the finger while dragging.
    pub fn drag_to(&mut self, x: f32) {
        let Some(drag) = self.drag else {
            return;
        };
        let travel = self.width * DRAG_RATIO;
        let openness = drag.start_openness + (x - drag.start_x) / travel;
        self.slide.set(openness.clamp(0.0, 1.0));
    }

    /// Releases the handle; the panel snaps to whichever side is closer.
    pub fn end_drag(&mut self, now: Instant) -> Option<SideBarEvent> {
        self.drag.take()?;
        if self.slide.current() >= SNAP_THRESHOLD {
            self.open(now);
            Some(SideBarEvent::Opened)
        } else {
            self.close(now);
            Some(SideBarEvent::Closed)
        }
    }

    /// Advances the snap animation.
    pub fn tick(&mut self, now: Instant) {
        if self.drag.is_none() {
            self.slide.tick(now);
        }
    }
}
