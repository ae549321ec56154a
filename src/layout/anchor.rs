// SPDX-License-Identifier: MPL-2.0
//! Corner anchor placements for fan buttons.
//!
//! Each kiosk corner (and edge midpoint) hosts one fan button. An
//! [`Anchor`] computes the button's placement from its own size and the
//! stage size; [`CORNER_SPECS`] pairs every anchor with the opening angle
//! of its fan so captures spread into the stage instead of off-screen.

use crate::animation::Transform;
use iced::Size;

/// A corner or edge-midpoint placement on the stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    TopLeft,
    TopCenter,
    TopRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl Anchor {
    /// The placement transform for an element of `el` size in a `parent` of
    /// the given size.
    #[must_use]
    pub fn placement(self, el: Size, parent: Size) -> Transform {
        let centered_x = (parent.width / 2.0) - (el.width / 2.0);
        let right_x = parent.width - el.width;
        let bottom_y = parent.height - el.height;
        match self {
            Anchor::TopLeft => Transform::translation(0.0, 0.0),
            Anchor::TopCenter => Transform::translation(centered_x, 0.0),
            Anchor::TopRight => Transform::translation(right_x, 0.0),
            Anchor::BottomLeft => Transform::translation(0.0, bottom_y),
            Anchor::BottomCenter => Transform::translation(centered_x, bottom_y),
            Anchor::BottomRight => Transform::translation(right_x, bottom_y),
        }
    }

    /// Stable identifier used for styling and logging.
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Anchor::TopLeft => "topLeft",
            Anchor::TopCenter => "topCenter",
            Anchor::TopRight => "topRight",
            Anchor::BottomLeft => "bottomLeft",
            Anchor::BottomCenter => "bottomCenter",
            Anchor::BottomRight => "bottomRight",
        }
    }
}

/// An anchor paired with the fan opening it serves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorSpec {
    pub anchor: Anchor,
    /// Angle (degrees) at which the fan arc starts.
    pub from_angle: f32,
    /// Arc length (degrees) the fan opens across.
    pub angle_length: f32,
}

/// The six stage corners with their fan openings.
pub const CORNER_SPECS: [AnchorSpec; 6] = [
    AnchorSpec {
        anchor: Anchor::TopLeft,
        from_angle: 70.0,
        angle_length: 110.0,
    },
    AnchorSpec {
        anchor: Anchor::TopCenter,
        from_angle: 110.0,
        angle_length: 110.0,
    },
    AnchorSpec {
        anchor: Anchor::TopRight,
        from_angle: 190.0,
        angle_length: 110.0,
    },
    AnchorSpec {
        anchor: Anchor::BottomLeft,
        from_angle: 10.0,
        angle_length: 110.0,
    },
    AnchorSpec {
        anchor: Anchor::BottomCenter,
        from_angle: 310.0,
        angle_length: 110.0,
    },
    AnchorSpec {
        anchor: Anchor::BottomRight,
        from_angle: 250.0,
        angle_length: 110.0,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    const EL: Size = Size::new(80.0, 80.0);
    const PARENT: Size = Size::new(1920.0, 1080.0);

    #[test]
    fn top_left_is_origin() {
        assert_eq!(
            Anchor::TopLeft.placement(EL, PARENT),
            Transform::translation(0.0, 0.0)
        );
    }

    #[test]
    fn top_center_centers_horizontally() {
        let t = Anchor::TopCenter.placement(EL, PARENT);
        assert_eq!(t.x, 920.0);
        assert_eq!(t.y, 0.0);
    }

    #[test]
    fn bottom_right_hugs_both_edges() {
        let t = Anchor::BottomRight.placement(EL, PARENT);
        assert_eq!(t.x, 1840.0);
        assert_eq!(t.y, 1000.0);
    }

    #[test]
    fn placements_are_unit_scale() {
        for spec in CORNER_SPECS {
            let t = spec.anchor.placement(EL, PARENT);
            assert_eq!(t.scale_x, 1.0);
            assert_eq!(t.scale_y, 1.0);
            assert_eq!(t.angle_deg, 0.0);
        }
    }

    #[test]
    fn corner_specs_cover_all_anchors_once() {
        let mut ids: Vec<&str> = CORNER_SPECS.iter().map(|s| s.anchor.id()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 6);
    }
}
