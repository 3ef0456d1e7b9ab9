//! Fundamental planar types and the frame rotation shared by loads and supports.

use nalgebra::{Matrix2, Vector2};
use serde::{Deserialize, Serialize};

/// Position in the plane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Distance along the global X axis.
    pub x: f64,
    /// Distance along the global Y axis.
    pub y: f64,
}

impl Point {
    /// Create a [`Point`] with explicit coordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Convert the point into an algebraic vector.
    #[must_use]
    pub fn to_vector(self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }
}

impl From<Vector2<f64>> for Point {
    fn from(value: Vector2<f64>) -> Self {
        Self::new(value.x, value.y)
    }
}

/// Pair of components along the two axes of some frame.
///
/// Used for forces and displacements alike; the frame is implied by the
/// context (a support or load carries its own [`FrameAngle`]).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Components {
    /// Component along the first axis of the frame.
    pub x: f64,
    /// Component along the second axis of the frame.
    pub y: f64,
}

impl Components {
    /// Create a [`Components`] pair.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Convert the components into an algebraic vector.
    #[must_use]
    pub fn to_vector(self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }
}

impl From<Vector2<f64>> for Components {
    fn from(value: Vector2<f64>) -> Self {
        Self::new(value.x, value.y)
    }
}

/// Orientation of a local frame, in degrees, measured counter-clockwise from
/// the global X axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrameAngle(pub f64);

impl FrameAngle {
    /// The global frame.
    pub const GLOBAL: FrameAngle = FrameAngle(0.0);

    /// Angle in degrees.
    #[must_use]
    pub const fn degrees(self) -> f64 {
        self.0
    }

    /// Rotation taking global components into this frame.
    ///
    /// `T = [[cos θ, sin θ], [-sin θ, cos θ]]`; its transpose maps local
    /// components back to the global frame.
    #[must_use]
    pub fn rotation(self) -> Matrix2<f64> {
        let (s, c) = self.0.to_radians().sin_cos();
        Matrix2::new(c, s, -s, c)
    }

    /// Express local components in the global frame (`Tᵀ · local`).
    ///
    /// A zero angle passes the components through untouched.
    #[must_use]
    pub fn to_global(self, local: Components) -> Components {
        if self.0 == 0.0 {
            return local;
        }
        Components::from(self.rotation().transpose() * local.to_vector())
    }
}

/// Convenience helper for creating [`Point`] instances.
///
/// # Examples
/// ```
/// use trussfem::point;
///
/// let origin = point(0.0, 0.0);
/// assert_eq!(origin.x, 0.0);
/// ```
#[must_use]
pub const fn point(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

/// Convenience helper for creating [`Components`] instances.
///
/// # Examples
/// ```
/// use trussfem::components;
///
/// let load = components(10.0, -5.0);
/// assert_eq!(load.y, -5.0);
/// ```
#[must_use]
pub const fn components(x: f64, y: f64) -> Components {
    Components::new(x, y)
}
