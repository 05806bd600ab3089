/// Rotation state and the fixed-order rotation pipeline
use nalgebra::{Point3, Rotation3, Vector3};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Rotation state around three axes (in degrees).
///
/// Angles are unbounded; a full turn is 360.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RotationState {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        }
    }

    /// Advance every axis by the same amount (one spinning tick)
    #[must_use]
    pub fn spun(self, speed: f32) -> Self {
        Self {
            x: self.x + speed,
            y: self.y + speed,
            z: self.z + speed,
        }
    }

    /// Rotate a single axis by a delta (in degrees)
    #[must_use]
    pub fn adjusted(self, axis: Axis, delta: f32) -> Self {
        let mut next = self;
        match axis {
            Axis::X => next.x += delta,
            Axis::Y => next.y += delta,
            Axis::Z => next.z += delta,
        }
        next
    }
}

impl Default for RotationState {
    fn default() -> Self {
        Self::zero()
    }
}

/// Rotation helpers for the per-vertex transform
pub struct Transform;

impl Transform {
    /// Rotation about one axis, angle in degrees
    pub fn axis_rotation(axis: Axis, degrees: f32) -> Rotation3<f32> {
        let unit = match axis {
            Axis::X => Vector3::x_axis(),
            Axis::Y => Vector3::y_axis(),
            Axis::Z => Vector3::z_axis(),
        };
        Rotation3::from_axis_angle(&unit, degrees.to_radians())
    }

    /// Rotate a point about X, then Y, then Z.
    pub fn apply_rotation(point: &Point3<f32>, rotation: &RotationState) -> Point3<f32> {
        let rotated = Self::axis_rotation(Axis::X, rotation.x) * point;
        let rotated = Self::axis_rotation(Axis::Y, rotation.y) * rotated;
        Self::axis_rotation(Axis::Z, rotation.z) * rotated
    }

    /// One tick of automatic spin
    pub fn update_rotation(rotation: RotationState, speed: f32) -> RotationState {
        rotation.spun(speed)
    }
}
