// SPDX-License-Identifier: MPL-2.0
//! 2D affine transform value type.
//!
//! [`Transform`] describes position, rotation, and scale as a plain value.
//! Composition is additive component-wise, which makes it cheap to express
//! "this delta on top of that base" the way gesture handlers need to
//! (a pan delta carries zero scale so adding it leaves the base scale alone).

use std::fmt;
use std::str::FromStr;

/// Immutable 2D affine descriptor: position, rotation, scale.
///
/// `add` is commutative and associative component-wise. The `Display`
/// rendering is a deterministic CSS-transform-equivalent encoding with
/// `translate`, `rotate`, `scale` composed in that fixed order, and
/// [`Transform::from_str`] parses it back within floating tolerance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Horizontal position in pixels.
    pub x: f32,
    /// Vertical position in pixels.
    pub y: f32,
    /// Rotation in degrees.
    pub angle_deg: f32,
    /// Horizontal scale factor.
    pub scale_x: f32,
    /// Vertical scale factor.
    pub scale_y: f32,
}

impl Transform {
    /// The neutral placement: origin, no rotation, unit scale.
    pub const IDENTITY: Transform = Transform {
        x: 0.0,
        y: 0.0,
        angle_deg: 0.0,
        scale_x: 1.0,
        scale_y: 1.0,
    };

    /// Creates a transform from all five components.
    #[must_use]
    pub const fn new(x: f32, y: f32, angle_deg: f32, scale_x: f32, scale_y: f32) -> Self {
        Self {
            x,
            y,
            angle_deg,
            scale_x,
            scale_y,
        }
    }

    /// Creates a pure translation at unit scale.
    #[must_use]
    pub const fn translation(x: f32, y: f32) -> Self {
        Self::new(x, y, 0.0, 1.0, 1.0)
    }

    /// Creates a positional delta carrying zero rotation and zero scale.
    ///
    /// Adding an offset to a base transform moves the base without touching
    /// its rotation or scale, which is what pan handlers want.
    #[must_use]
    pub const fn offset(x: f32, y: f32) -> Self {
        Self::new(x, y, 0.0, 0.0, 0.0)
    }

    /// Component-wise additive composition.
    #[must_use]
    pub fn add(self, other: Transform) -> Transform {
        Transform {
            x: self.x + other.x,
            y: self.y + other.y,
            angle_deg: self.angle_deg + other.angle_deg,
            scale_x: self.scale_x + other.scale_x,
            scale_y: self.scale_y + other.scale_y,
        }
    }

    /// Linear interpolation step `taken` of `total` from `self` toward
    /// `target`.
    ///
    /// The final step (`taken == total`) returns `target` verbatim so a
    /// completed animation lands exactly on its destination with no
    /// floating-point drift.
    #[must_use]
    pub fn step_toward(self, target: Transform, taken: u32, total: u32) -> Transform {
        debug_assert!(total > 0 && taken <= total);
        if taken >= total {
            return target;
        }
        let t = taken as f32 / total as f32;
        Transform {
            x: self.x + (target.x - self.x) * t,
            y: self.y + (target.y - self.y) * t,
            angle_deg: self.angle_deg + (target.angle_deg - self.angle_deg) * t,
            scale_x: self.scale_x + (target.scale_x - self.scale_x) * t,
            scale_y: self.scale_y + (target.scale_y - self.scale_y) * t,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "translate({}px, {}px) rotate({}deg) scale({}, {})",
            self.x, self.y, self.angle_deg, self.scale_x, self.scale_y
        )
    }
}

/// Error returned when parsing a transform string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTransformError(String);

impl fmt::Display for ParseTransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid transform string: {}", self.0)
    }
}

impl std::error::Error for ParseTransformError {}

impl FromStr for Transform {
    type Err = ParseTransformError;

    /// Parses the `Display` encoding back into its numeric components.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fail = || ParseTransformError(s.to_string());

        let rest = s.strip_prefix("translate(").ok_or_else(fail)?;
        let (args, rest) = rest.split_once(')').ok_or_else(fail)?;
        let (x, y) = parse_pair(args, Some("px")).ok_or_else(fail)?;

        let rest = rest.trim_start().strip_prefix("rotate(").ok_or_else(fail)?;
        let (args, rest) = rest.split_once(')').ok_or_else(fail)?;
        let angle_deg = args
            .trim()
            .strip_suffix("deg")
            .and_then(|v| v.trim().parse::<f32>().ok())
            .ok_or_else(fail)?;

        let rest = rest.trim_start().strip_prefix("scale(").ok_or_else(fail)?;
        let (args, rest) = rest.split_once(')').ok_or_else(fail)?;
        let (scale_x, scale_y) = parse_pair(args, None).ok_or_else(fail)?;

        if !rest.trim().is_empty() {
            return Err(fail());
        }

        Ok(Transform::new(x, y, angle_deg, scale_x, scale_y))
    }
}

fn parse_pair(args: &str, unit: Option<&str>) -> Option<(f32, f32)> {
    let (a, b) = args.split_once(',')?;
    let strip = |v: &str| -> Option<f32> {
        let v = v.trim();
        let v = match unit {
            Some(u) => v.strip_suffix(u)?,
            None => v,
        };
        v.trim().parse::<f32>().ok()
    };
    Some((strip(a)?, strip(b)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{assert_abs_diff_eq, F32_EPSILON};

    #[test]
    fn identity_has_unit_scale() {
        let t = Transform::IDENTITY;
        assert_eq!(t.x, 0.0);
        assert_eq!(t.y, 0.0);
        assert_eq!(t.angle_deg, 0.0);
        assert_eq!(t.scale_x, 1.0);
        assert_eq!(t.scale_y, 1.0);
    }

    #[test]
    fn add_is_commutative() {
        let a = Transform::new(1.0, 2.0, 30.0, 1.5, 0.5);
        let b = Transform::new(-4.0, 8.0, -10.0, 0.25, 2.0);
        assert_eq!(a.add(b), b.add(a));
    }

    #[test]
    fn add_is_associative() {
        let a = Transform::new(1.0, 2.0, 30.0, 1.5, 0.5);
        let b = Transform::new(-4.0, 8.0, -10.0, 0.25, 2.0);
        let c = Transform::new(0.5, -1.5, 90.0, 1.0, 1.0);
        let left = a.add(b).add(c);
        let right = a.add(b.add(c));
        assert_abs_diff_eq!(left.x, right.x, epsilon = F32_EPSILON);
        assert_abs_diff_eq!(left.y, right.y, epsilon = F32_EPSILON);
        assert_abs_diff_eq!(left.angle_deg, right.angle_deg, epsilon = F32_EPSILON);
        assert_abs_diff_eq!(left.scale_x, right.scale_x, epsilon = F32_EPSILON);
        assert_abs_diff_eq!(left.scale_y, right.scale_y, epsilon = F32_EPSILON);
    }

    #[test]
    fn offset_add_preserves_base_scale_and_rotation() {
        let base = Transform::new(10.0, 20.0, 45.0, 2.0, 2.0);
        let moved = Transform::offset(5.0, -5.0).add(base);
        assert_eq!(moved.x, 15.0);
        assert_eq!(moved.y, 15.0);
        assert_eq!(moved.angle_deg, 45.0);
        assert_eq!(moved.scale_x, 2.0);
        assert_eq!(moved.scale_y, 2.0);
    }

    #[test]
    fn display_renders_fixed_order() {
        let t = Transform::new(12.5, -3.0, 90.0, 1.0, 0.5);
        assert_eq!(
            t.to_string(),
            "translate(12.5px, -3px) rotate(90deg) scale(1, 0.5)"
        );
    }

    #[test]
    fn string_round_trip_recovers_components() {
        let original = Transform::new(12.345, -67.5, 123.75, 0.875, 1.25);
        let parsed: Transform = original.to_string().parse().unwrap();
        assert_abs_diff_eq!(parsed.x, original.x, epsilon = F32_EPSILON);
        assert_abs_diff_eq!(parsed.y, original.y, epsilon = F32_EPSILON);
        assert_abs_diff_eq!(parsed.angle_deg, original.angle_deg, epsilon = F32_EPSILON);
        assert_abs_diff_eq!(parsed.scale_x, original.scale_x, epsilon = F32_EPSILON);
        assert_abs_diff_eq!(parsed.scale_y, original.scale_y, epsilon = F32_EPSILON);
    }

    #[test]
    fn parse_rejects_reordered_encoding() {
        let err = "rotate(90deg) translate(0px, 0px) scale(1, 1)".parse::<Transform>();
        assert!(err.is_err());
    }

    #[test]
    fn parse_rejects_trailing_garbage() {
        let err = "translate(0px, 0px) rotate(0deg) scale(1, 1) skew(2)".parse::<Transform>();
        assert!(err.is_err());
    }

    #[test]
    fn final_interpolation_step_is_exact() {
        let start = Transform::new(0.0, 0.0, 0.0, 1.0, 1.0);
        let target = Transform::new(0.1, 0.2, 0.3, 0.7, 0.9);
        // A third of the way is approximate, the last step is verbatim.
        let last = start.step_toward(target, 3, 3);
        assert_eq!(last, target);
    }
}
