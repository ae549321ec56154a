// SPDX-License-Identifier: MPL-2.0
//! Pure layout functions for fan arrangements.
//!
//! A layout function maps an item count to that many target [`Transform`]s.
//! Layouts are pure: re-invoking one with the same count yields the same
//! placements, so a fan can re-run its layout whenever membership changes.

pub mod anchor;

use crate::animation::Transform;
use std::f32::consts::PI;

pub use anchor::{Anchor, AnchorSpec, CORNER_SPECS};

/// Maps an item count to one target transform per item.
pub type LayoutFn = Box<dyn Fn(usize) -> Vec<Transform>>;

/// Circular arrangement: item `i` sits at `start_angle + i * (360 /
/// items_per_circle)` degrees around `radius`, rotated to face outward.
///
/// The angular origin is offset by -90 degrees so a start angle of zero
/// points straight up; every layout variant shares this convention.
#[must_use]
pub fn circle_layout(
    radius: f32,
    items_per_circle: f32,
    start_angle_deg: f32,
) -> impl Fn(usize) -> Vec<Transform> {
    move |count| {
        let step = (PI * 2.0) / items_per_circle;
        let base = (PI * 4.0) + (start_angle_deg - 90.0) * (PI / 180.0);
        (0..count)
            .map(|i| {
                let angle = step * i as f32 + base;
                Transform::new(
                    angle.cos() * radius,
                    angle.sin() * radius,
                    step * i as f32 * (180.0 / PI),
                    1.0,
                    1.0,
                )
            })
            .collect()
    }
}

/// Evenly spaced horizontal line across `width`, no rotation.
#[must_use]
pub fn line_layout(width: f32) -> impl Fn(usize) -> Vec<Transform> {
    move |count| {
        (0..count)
            .map(|i| Transform::translation((width / count as f32) * i as f32, 0.0))
            .collect()
    }
}

/// Wraps a layout so every placement is translated by `anchor`, keeping the
/// original rotation and unit scale.
///
/// This is how a fan's circle follows its corner button: the pure circle is
/// computed around the origin and shifted by the button's own placement.
#[must_use]
pub fn anchored(
    layout: impl Fn(usize) -> Vec<Transform>,
    anchor: Transform,
) -> impl Fn(usize) -> Vec<Transform> {
    move |count| {
        layout(count)
            .into_iter()
            .map(|t| Transform::new(t.x + anchor.x, t.y + anchor.y, t.angle_deg, 1.0, 1.0))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{assert_abs_diff_eq, F32_EPSILON};

    #[test]
    fn circle_layout_returns_one_transform_per_item() {
        let layout = circle_layout(100.0, 8.0, 0.0);
        for count in [0, 1, 5, 12] {
            assert_eq!(layout(count).len(), count);
        }
    }

    #[test]
    fn circle_layout_first_item_points_up() {
        // Start angle zero with the -90 degree origin puts item 0 at the top.
        let layout = circle_layout(100.0, 8.0, 0.0);
        let placed = layout(1);
        assert_abs_diff_eq!(placed[0].x, 0.0, epsilon = 1e-3);
        assert_abs_diff_eq!(placed[0].y, -100.0, epsilon = 1e-3);
        assert_eq!(placed[0].angle_deg, 0.0);
    }

    #[test]
    fn circle_layout_items_sit_on_the_radius() {
        let layout = circle_layout(50.0, 10.0, 33.0);
        for t in layout(10) {
            let r = (t.x * t.x + t.y * t.y).sqrt();
            assert_abs_diff_eq!(r, 50.0, epsilon = 1e-2);
        }
    }

    #[test]
    fn circle_layout_rotation_tracks_angular_step() {
        let layout = circle_layout(100.0, 4.0, 0.0);
        let placed = layout(3);
        assert_abs_diff_eq!(placed[0].angle_deg, 0.0, epsilon = F32_EPSILON);
        assert_abs_diff_eq!(placed[1].angle_deg, 90.0, epsilon = 1e-3);
        assert_abs_diff_eq!(placed[2].angle_deg, 180.0, epsilon = 1e-3);
    }

    #[test]
    fn circle_layout_is_pure() {
        let layout = circle_layout(75.0, 6.0, 45.0);
        assert_eq!(layout(4), layout(4));
    }

    #[test]
    fn line_layout_spaces_evenly() {
        let layout = line_layout(120.0);
        let placed = layout(4);
        assert_eq!(placed[0].x, 0.0);
        assert_eq!(placed[1].x, 30.0);
        assert_eq!(placed[2].x, 60.0);
        assert_eq!(placed[3].x, 90.0);
        assert!(placed.iter().all(|t| t.y == 0.0 && t.scale_x == 1.0));
    }

    #[test]
    fn anchored_translates_and_normalizes_scale() {
        let anchor = Transform::translation(200.0, 300.0);
        let layout = anchored(circle_layout(100.0, 8.0, 0.0), anchor);
        let placed = layout(1);
        assert_abs_diff_eq!(placed[0].x, 200.0, epsilon = 1e-3);
        assert_abs_diff_eq!(placed[0].y, 200.0, epsilon = 1e-3);
        assert_eq!(placed[0].scale_x, 1.0);
        assert_eq!(placed[0].scale_y, 1.0);
    }
}
