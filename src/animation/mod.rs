// SPDX-License-Identifier: MPL-2.0
//! Incremental animation engine.
//!
//! The kiosk animates by discrete, cooperative steps: every animated value
//! carries its own trajectory and is advanced by the application's periodic
//! tick. See [`animator::Animator`] for the cancellation model.

pub mod animator;
pub mod fade;
pub mod transform;

pub use animator::{Animator, StepOutcome};
pub use fade::Fade;
pub use transform::Transform;
