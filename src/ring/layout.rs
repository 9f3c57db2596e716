use crate::ring::{FULL_TURN, LARGE_CYLINDER_WIDTH, SMALL_CYLINDER_WIDTH};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Cylinder widths for the two sides of the breakpoint.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct LayoutMetrics {
    #[serde(default = "default_small_width")]
    pub small_width: f64,
    #[serde(default = "default_large_width")]
    pub large_width: f64,
}

fn default_small_width() -> f64 {
    SMALL_CYLINDER_WIDTH
}

fn default_large_width() -> f64 {
    LARGE_CYLINDER_WIDTH
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            small_width: SMALL_CYLINDER_WIDTH,
            large_width: LARGE_CYLINDER_WIDTH,
        }
    }
}

impl LayoutMetrics {
    pub fn cylinder_width(&self, is_small: bool) -> f64 {
        if is_small {
            self.small_width
        } else {
            self.large_width
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FacePlacement {
    pub index: usize,
    /// Rotation around the ring axis, in degrees.
    pub angle: f64,
}

/// Placement of every face around the cylinder.
///
/// Derived state: always rebuilt from `(count, width)` and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct RingLayout {
    pub width: f64,
    pub radius: f64,
    pub face_width: f64,
    pub faces: Vec<FacePlacement>,
}

impl RingLayout {
    /// Spreads `count` faces evenly over a cylinder whose circumference is `width`.
    ///
    /// # Panics
    ///
    /// Panics if `count` is zero.
    pub fn compute(count: usize, width: f64) -> Self {
        assert!(count >= 1, "ring layout needs at least one item");

        let step = Self::angle_step(count);
        let faces = (0..count)
            .map(|index| FacePlacement {
                index,
                angle: index as f64 * step,
            })
            .collect();

        Self {
            width,
            radius: width / (2.0 * PI),
            face_width: width / count as f64,
            faces,
        }
    }

    pub fn angle_step(count: usize) -> f64 {
        FULL_TURN / count as f64
    }

    pub fn count(&self) -> usize {
        self.faces.len()
    }

    pub fn angle(&self, index: usize) -> Option<f64> {
        self.faces.get(index).map(|f| f.angle)
    }

    /// Index of the face turned closest to the viewer for a given ring rotation.
    pub fn front_face(&self, rotation: f64) -> usize {
        let step = Self::angle_step(self.count());
        // a face at angle a sits in front when rotation + a == 0 (mod 360)
        let facing = (-rotation).rem_euclid(FULL_TURN);
        ((facing / step).round() as usize) % self.count()
    }
}
