// SPDX-License-Identifier: MPL-2.0
//! Touch gesture recognition.
//!
//! Raw touch events arrive from the windowing layer; the recognizers here
//! turn them into the kiosk's vocabulary: taps (debounced), single-finger
//! drags, and two-finger pinch/rotate manipulation. Which of these an item
//! responds to is decided by its capability set, not by the recognizer.

use iced::{Point, Vector};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Movement below this distance still counts as a tap.
const TAP_SLOP: f32 = 10.0;

/// Phase of a single touch point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Began,
    Moved,
    Ended,
    Cancelled,
}

/// One touch point update from the windowing layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchInput {
    /// Stable identifier of the finger across its began/moved/ended arc.
    pub id: u64,
    pub phase: TouchPhase,
    pub position: Point,
}

/// Debounces taps: a tap within the cooldown of the previous accepted tap
/// is swallowed. Guards against double-fires on jittery touch hardware.
#[derive(Debug, Clone)]
pub struct TapGuard {
    cooldown: Duration,
    last_accepted: Option<Instant>,
}

impl TapGuard {
    /// The cooldown used by kiosk controls.
    pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(500);

    #[must_use]
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_accepted: None,
        }
    }

    /// Accepts or swallows a tap at `now`.
    pub fn try_tap(&mut self, now: Instant) -> bool {
        if let Some(last) = self.last_accepted {
            if now.duration_since(last) < self.cooldown {
                return false;
            }
        }
        self.last_accepted = Some(now);
        true
    }
}

impl Default for TapGuard {
    fn default() -> Self {
        Self::new(Self::DEFAULT_COOLDOWN)
    }
}

/// Recognized gesture, expressed incrementally.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    /// A debounced single tap.
    Tap(Point),
    /// Single-finger movement: `delta` since the last event, `total`
    /// displacement from the drag's start.
    Drag { delta: Vector, total: Vector },
    /// Single-finger drag lifted; total displacement from its start.
    DragEnd { total: Vector },
    /// Two-finger manipulation since the last event.
    Manipulate {
        pan: Vector,
        rotate_deg: f32,
        scale: f32,
    },
    /// Two-finger manipulation ended.
    ManipulateEnd,
}

/// What an item is allowed to do with incoming touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// Single-finger drag moves the item and can fling it off the fan.
    pub drag_to_remove: bool,
    /// Two-finger pinch and rotate reshape the item.
    pub pinch_rotate: bool,
    /// Tapping previews the item's captured moment.
    pub tap_to_preview: bool,
}

#[derive(Debug, Clone, Copy)]
struct TwoFingerState {
    midpoint: Point,
    angle_deg: f32,
    distance: f32,
}

/// Per-item gesture state machine.
///
/// Feed it every touch update hitting the item; it emits at most one
/// [`GestureEvent`] per update. One finger drags, two fingers manipulate;
/// lifting back to one finger resumes the drag from the survivor.
#[derive(Debug)]
pub struct ItemGestures {
    capabilities: Capabilities,
    tap_guard: TapGuard,
    // Ordered by finger id so two-finger angle and distance always pair
    // the same way between updates.
    pointers: BTreeMap<u64, Point>,
    drag_start: Option<Point>,
    drag_moved: bool,
    two_finger: Option<TwoFingerState>,
}

impl ItemGestures {
    #[must_use]
    pub fn new(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            tap_guard: TapGuard::default(),
            pointers: BTreeMap::new(),
            drag_start: None,
            drag_moved: false,
            two_finger: None,
        }
    }

    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Processes one touch update.
    pub fn handle(&mut self, touch: TouchInput, now: Instant) -> Option<GestureEvent> {
        match touch.phase {
            TouchPhase::Began => self.on_began(touch),
            TouchPhase::Moved => self.on_moved(touch),
            TouchPhase::Ended => self.on_ended(touch, now),
            TouchPhase::Cancelled => self.on_cancelled(touch),
        }
    }

    fn on_began(&mut self, touch: TouchInput) -> Option<GestureEvent> {
        self.pointers.insert(touch.id, touch.position);
        match self.pointers.len() {
            1 => {
                self.drag_start = Some(touch.position);
                self.drag_moved = false;
                None
            }
            2 if self.capabilities.pinch_rotate => {
                self.drag_start = None;
                self.two_finger = self.two_finger_state();
                None
            }
            _ => None,
        }
    }

    fn on_moved(&mut self, touch: TouchInput) -> Option<GestureEvent> {
        let previous = self.pointers.insert(touch.id, touch.position)?;

        if self.two_finger.is_some() {
            let before = self.two_finger?;
            let after = self.two_finger_state()?;
            self.two_finger = Some(after);
            return Some(GestureEvent::Manipulate {
                pan: after.midpoint - before.midpoint,
                rotate_deg: after.angle_deg - before.angle_deg,
                scale: if before.distance > f32::EPSILON {
                    after.distance / before.distance
                } else {
                    1.0
                },
            });
        }

        let start = self.drag_start?;
        let from_start = touch.position - start;
        if from_start.x.hypot(from_start.y) > TAP_SLOP {
            self.drag_moved = true;
        }
        if !self.drag_moved || !self.capabilities.drag_to_remove {
            return None;
        }
        Some(GestureEvent::Drag {
            delta: touch.position - previous,
            total: from_start,
        })
    }

    fn on_ended(&mut self, touch: TouchInput, now: Instant) -> Option<GestureEvent> {
        let position = self.pointers.remove(&touch.id)?;

        if self.two_finger.take().is_some() {
            // The survivor becomes a fresh drag origin.
            if let Some(&remaining) = self.pointers.values().next() {
                self.drag_start = Some(remaining);
                self.drag_moved = false;
            }
            return Some(GestureEvent::ManipulateEnd);
        }

        let start = self.drag_start.take()?;
        if self.drag_moved {
            self.drag_moved = false;
            if self.capabilities.drag_to_remove {
                return Some(GestureEvent::DragEnd {
                    total: position - start,
                });
            }
            return None;
        }
        if self.capabilities.tap_to_preview && self.tap_guard.try_tap(now) {
            return Some(GestureEvent::Tap(position));
        }
        None
    }

    fn on_cancelled(&mut self, touch: TouchInput) -> Option<GestureEvent> {
        self.pointers.remove(&touch.id);
        self.drag_start = None;
        self.drag_moved = false;
        if self.two_finger.take().is_some() {
            return Some(GestureEvent::ManipulateEnd);
        }
        None
    }

    fn two_finger_state(&self) -> Option<TwoFingerState> {
        let mut points = self.pointers.values();
        let a = *points.next()?;
        let b = *points.next()?;
        let dx = b.x - a.x;
        let dy = b.y - a.y;
        Some(TwoFingerState {
            midpoint: Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0),
            angle_deg: dy.atan2(dx).to_degrees(),
            distance: dx.hypot(dy),
        })
    }
}
