// SPDX-License-Identifier: MPL-2.0
//! Stepped transform animation with last-writer-wins cancellation.
//!
//! An [`Animator`] interpolates its current [`Transform`] toward a target
//! over a fixed number of discrete steps at a fixed cadence. It is advanced
//! cooperatively by [`Animator::tick`] from the application's periodic tick;
//! there are no timers or threads of its own.
//!
//! Starting a new animation increments a monotonic generation counter and
//! replaces the in-flight trajectory wholesale: any step belonging to a
//! stale generation is a no-op, so at most one animation per animator is
//! ever visible and re-invoking `animate` is the only (soft) cancellation
//! primitive.

use super::transform::Transform;
use std::time::{Duration, Instant};

/// What a single [`Animator::tick`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// No step was due (or nothing is in flight).
    Idle,
    /// One or more intermediate steps were applied.
    Stepped,
    /// The final step was applied; `current` now equals the target verbatim.
    ///
    /// Reported exactly once per completed trajectory. A superseded
    /// trajectory never reports it.
    Finished,
}

#[derive(Debug, Clone)]
struct Flight {
    generation: u64,
    start: Transform,
    target: Transform,
    total_steps: u32,
    taken: u32,
    interval: Duration,
    next_due: Instant,
}

/// Interpolates a scene node's transform toward a target over discrete steps.
#[derive(Debug, Clone)]
pub struct Animator {
    current: Transform,
    target: Transform,
    generation: u64,
    flight: Option<Flight>,
}

impl Animator {
    /// Creates an animator resting at the given transform.
    #[must_use]
    pub fn new(current: Transform) -> Self {
        Self {
            current,
            target: current,
            generation: 0,
            flight: None,
        }
    }

    /// The transform as of the latest applied step.
    #[must_use]
    pub fn current(&self) -> Transform {
        self.current
    }

    /// The destination of the most recent `animate` (or the resting
    /// transform if none was ever started).
    #[must_use]
    pub fn target(&self) -> Transform {
        self.target
    }

    /// Whether a trajectory is still in flight.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.flight.is_some()
    }

    /// Immediately sets the transform, without animation.
    ///
    /// This is the primitive underlying each interpolation step. It does not
    /// cancel an in-flight trajectory; the next due step overwrites it.
    pub fn translate(&mut self, target: Transform) {
        self.current = target;
    }

    /// Starts animating toward `target` in `steps` discrete moves at
    /// `interval` cadence, beginning from whatever the current (possibly
    /// mid-flight) transform is.
    ///
    /// A previous trajectory is silently abandoned; its completion never
    /// fires. `steps` is clamped to at least 1. The first step becomes due
    /// one `interval` after `now`.
    pub fn animate(&mut self, target: Transform, steps: u32, interval: Duration, now: Instant) {
        self.generation += 1;
        self.target = target;
        self.flight = Some(Flight {
            generation: self.generation,
            start: self.current,
            target,
            total_steps: steps.max(1),
            taken: 0,
            interval,
            next_due: now + interval,
        });
    }

    /// Applies every step that has come due by `now`.
    ///
    /// Returns [`StepOutcome::Finished`] on the tick that applies the final
    /// step, which sets the transform to the target verbatim.
    pub fn tick(&mut self, now: Instant) -> StepOutcome {
        let Some(flight) = self.flight.as_mut() else {
            return StepOutcome::Idle;
        };
        // Stale flights were replaced wholesale; the epoch check still
        // guards against one ever being observed.
        if flight.generation != self.generation {
            self.flight = None;
            return StepOutcome::Idle;
        }

        let mut outcome = StepOutcome::Idle;
        while flight.next_due <= now {
            flight.taken += 1;
            self.current = flight
                .start
                .step_toward(flight.target, flight.taken, flight.total_steps);
            if flight.taken >= flight.total_steps {
                self.flight = None;
                return StepOutcome::Finished;
            }
            flight.next_due += flight.interval;
            outcome = StepOutcome::Stepped;
        }
        outcome
    }
}

impl Default for Animator {
    fn default() -> Self {
        Self::new(Transform::IDENTITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_millis(20);

    fn run_to_completion(animator: &mut Animator, mut now: Instant) -> (u32, u32) {
        let mut finishes = 0;
        let mut steps = 0;
        for _ in 0..1000 {
            now += INTERVAL;
            match animator.tick(now) {
                StepOutcome::Finished => finishes += 1,
                StepOutcome::Stepped => steps += 1,
                StepOutcome::Idle => break,
            }
        }
        (steps, finishes)
    }

    #[test]
    fn idle_animator_reports_idle() {
        let mut animator = Animator::default();
        assert_eq!(animator.tick(Instant::now()), StepOutcome::Idle);
        assert!(!animator.is_animating());
    }

    #[test]
    fn animation_ends_exactly_on_target() {
        // Components chosen so n uneven steps accumulate rounding error.
        let target = Transform::new(0.1, 0.2, 33.3, 0.7, 0.9);
        for steps in [1, 3, 7, 20] {
            let now = Instant::now();
            let mut animator = Animator::default();
            animator.animate(target, steps, INTERVAL, now);
            let (_, finishes) = run_to_completion(&mut animator, now);
            assert_eq!(finishes, 1);
            assert_eq!(animator.current(), target, "steps = {steps}");
        }
    }

    #[test]
    fn steps_are_applied_at_interval_cadence() {
        let now = Instant::now();
        let mut animator = Animator::default();
        animator.animate(Transform::translation(100.0, 0.0), 4, INTERVAL, now);

        // Nothing due before the first interval elapses.
        assert_eq!(animator.tick(now), StepOutcome::Idle);
        assert_eq!(animator.tick(now + INTERVAL), StepOutcome::Stepped);
        assert_eq!(animator.current().x, 25.0);
        assert_eq!(animator.tick(now + 2 * INTERVAL), StepOutcome::Stepped);
        assert_eq!(animator.current().x, 50.0);
    }

    #[test]
    fn late_tick_catches_up_multiple_steps() {
        let now = Instant::now();
        let mut animator = Animator::default();
        animator.animate(Transform::translation(100.0, 0.0), 4, INTERVAL, now);
        // Three intervals late: applies three steps in one tick.
        assert_eq!(animator.tick(now + 3 * INTERVAL), StepOutcome::Stepped);
        assert_eq!(animator.current().x, 75.0);
    }

    #[test]
    fn superseding_animation_finishes_exactly_once() {
        let now = Instant::now();
        let mut animator = Animator::default();
        let first = Transform::translation(100.0, 0.0);
        let second = Transform::translation(0.0, 50.0);

        animator.animate(first, 10, INTERVAL, now);
        // Let the first trajectory advance partway.
        assert_eq!(animator.tick(now + 2 * INTERVAL), StepOutcome::Stepped);
        let mid_flight = animator.current();
        assert!(mid_flight.x > 0.0 && mid_flight.x < 100.0);

        // Supersede; the new trajectory starts from the mid-flight transform.
        let restart = now + 2 * INTERVAL;
        animator.animate(second, 5, INTERVAL, restart);
        let (_, finishes) = run_to_completion(&mut animator, restart);
        assert_eq!(finishes, 1);
        assert_eq!(animator.current(), second);
    }

    #[test]
    fn superseding_starts_from_current_not_rewound() {
        let now = Instant::now();
        let mut animator = Animator::default();
        animator.animate(Transform::translation(100.0, 0.0), 4, INTERVAL, now);
        animator.tick(now + INTERVAL);
        assert_eq!(animator.current().x, 25.0);

        let restart = now + INTERVAL;
        animator.animate(Transform::translation(125.0, 0.0), 2, INTERVAL, restart);
        // First step of the new trajectory interpolates from x = 25.
        animator.tick(restart + INTERVAL);
        assert_eq!(animator.current().x, 75.0);
    }

    #[test]
    fn translate_is_immediate_and_does_not_touch_target() {
        let mut animator = Animator::default();
        let t = Transform::new(7.0, 8.0, 9.0, 1.0, 1.0);
        animator.translate(t);
        assert_eq!(animator.current(), t);
        assert_eq!(animator.target(), Transform::IDENTITY);
    }

    #[test]
    fn target_tracks_latest_animate() {
        let now = Instant::now();
        let mut animator = Animator::default();
        let t = Transform::translation(10.0, 10.0);
        animator.animate(t, 5, INTERVAL, now);
        assert_eq!(animator.target(), t);
        assert!(animator.is_animating());
    }
}
