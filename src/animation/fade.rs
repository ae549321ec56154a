// SPDX-License-Identifier: MPL-2.0
//! Stepped opacity interpolation.
//!
//! Same tick-driven model as [`super::animator::Animator`], for the scalar
//! fades the kiosk uses when items appear (fade from 0 to 1 on insertion)
//! and when playback controls hide.

use std::time::{Duration, Instant};

/// Scalar interpolator for node opacity, clamped to `0.0..=1.0`.
#[derive(Debug, Clone)]
pub struct Fade {
    current: f32,
    flight: Option<FadeFlight>,
}

#[derive(Debug, Clone)]
struct FadeFlight {
    start: f32,
    target: f32,
    total_steps: u32,
    taken: u32,
    interval: Duration,
    next_due: Instant,
}

impl Fade {
    /// Creates a fade resting at the given opacity.
    #[must_use]
    pub fn new(opacity: f32) -> Self {
        Self {
            current: opacity.clamp(0.0, 1.0),
            flight: None,
        }
    }

    /// The opacity as of the latest applied step.
    #[must_use]
    pub fn current(&self) -> f32 {
        self.current
    }

    /// Whether a fade is still in flight.
    #[must_use]
    pub fn is_fading(&self) -> bool {
        self.flight.is_some()
    }

    /// Immediately sets the opacity, abandoning any in-flight fade.
    pub fn set(&mut self, opacity: f32) {
        self.current = opacity.clamp(0.0, 1.0);
        self.flight = None;
    }

    /// Starts fading toward `target` in `steps` moves at `interval` cadence.
    /// A previous fade is silently abandoned.
    pub fn fade_to(&mut self, target: f32, steps: u32, interval: Duration, now: Instant) {
        self.flight = Some(FadeFlight {
            start: self.current,
            target: target.clamp(0.0, 1.0),
            total_steps: steps.max(1),
            taken: 0,
            interval,
            next_due: now + interval,
        });
    }

    /// Applies every step that has come due by `now`. Returns `true` when
    /// the fade completed on this tick.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(flight) = self.flight.as_mut() else {
            return false;
        };
        while flight.next_due <= now {
            flight.taken += 1;
            if flight.taken >= flight.total_steps {
                self.current = flight.target;
                self.flight = None;
                return true;
            }
            let t = flight.taken as f32 / flight.total_steps as f32;
            self.current = flight.start + (flight.target - flight.start) * t;
            flight.next_due += flight.interval;
        }
        false
    }
}

impl Default for Fade {
    fn default() -> Self {
        Self::new(1.0)
    }
}
