use crate::ring::{
    MAX_FRAME_DT, REST_DELTA, REST_SPEED, SPRING_DAMPING, SPRING_MASS, SPRING_STIFFNESS,
    SPRING_SUBSTEP,
};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SpringConfig {
    #[serde(default = "default_stiffness")]
    pub stiffness: f64,
    #[serde(default = "default_damping")]
    pub damping: f64,
    #[serde(default = "default_mass")]
    pub mass: f64,
    #[serde(default = "default_rest_delta")]
    pub rest_delta: f64,
    #[serde(default = "default_rest_speed")]
    pub rest_speed: f64,
}

fn default_stiffness() -> f64 {
    SPRING_STIFFNESS
}
fn default_damping() -> f64 {
    SPRING_DAMPING
}
fn default_mass() -> f64 {
    SPRING_MASS
}
fn default_rest_delta() -> f64 {
    REST_DELTA
}
fn default_rest_speed() -> f64 {
    REST_SPEED
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            stiffness: SPRING_STIFFNESS,
            damping: SPRING_DAMPING,
            mass: SPRING_MASS,
            rest_delta: REST_DELTA,
            rest_speed: REST_SPEED,
        }
    }
}

/// Damped spring pulling `position` toward `target`.
#[derive(Debug, Clone, PartialEq)]
pub struct Spring {
    pub position: f64,
    pub velocity: f64,
    pub target: f64,
    config: SpringConfig,
}

impl Spring {
    pub fn new(position: f64, velocity: f64, target: f64, config: SpringConfig) -> Self {
        Self {
            position,
            velocity,
            target,
            config,
        }
    }

    pub fn is_at_rest(&self) -> bool {
        (self.position - self.target).abs() < self.config.rest_delta
            && self.velocity.abs() < self.config.rest_speed
    }

    /// Advances the spring by `dt` seconds; returns true while it is still moving.
    ///
    /// Integrates in fixed sub-steps so stiff configurations stay stable at
    /// low frame rates. Once at rest the position snaps onto the target.
    pub fn step(&mut self, dt: f64) -> bool {
        if self.is_at_rest() {
            self.settle();
            return false;
        }

        let dt = if dt.is_finite() {
            dt.clamp(0.0, MAX_FRAME_DT)
        } else {
            0.0
        };
        let steps = (dt / SPRING_SUBSTEP).ceil().max(1.0) as usize;
        let h = dt / steps as f64;

        let SpringConfig {
            stiffness,
            damping,
            mass,
            ..
        } = self.config;

        for _ in 0..steps {
            let spring_force = -stiffness * (self.position - self.target);
            let damping_force = -damping * self.velocity;
            self.velocity += (spring_force + damping_force) / mass * h;
            self.position += self.velocity * h;
        }

        if !self.position.is_finite() || !self.velocity.is_finite() || self.is_at_rest() {
            self.settle();
            return false;
        }
        true
    }

    fn settle(&mut self) {
        self.position = self.target;
        self.velocity = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_to_rest(spring: &mut Spring, frame: f64) -> usize {
        let mut frames = 0;
        while spring.step(frame) {
            frames += 1;
            assert!(frames < 10_000, "spring never settled");
        }
        frames
    }

    #[test]
    fn test_settles_exactly_on_target() {
        let mut spring = Spring::new(10.0, 2.0, 12.0, SpringConfig::default());
        let frames = run_to_rest(&mut spring, 1.0 / 60.0);
        assert!(frames > 1);
        assert_eq!(spring.position, 12.0);
        assert_eq!(spring.velocity, 0.0);
    }

    #[test]
    fn test_moves_toward_target_without_jumping() {
        let mut spring = Spring::new(0.0, 0.0, 90.0, SpringConfig::default());
        let mut last = spring.position;
        for _ in 0..5 {
            spring.step(1.0 / 60.0);
            assert!(spring.position > last);
            assert!(spring.position < 90.0);
            last = spring.position;
        }
    }

    #[test]
    fn test_long_frames_stay_stable() {
        let mut spring = Spring::new(0.0, 500.0, -45.0, SpringConfig::default());
        run_to_rest(&mut spring, 0.25);
        assert_eq!(spring.position, -45.0);
    }

    #[test]
    fn test_zero_distance_is_immediately_at_rest() {
        let mut spring = Spring::new(3.0, 0.0, 3.0, SpringConfig::default());
        assert!(!spring.step(1.0 / 60.0));
    }

    #[test]
    fn test_non_finite_dt_holds_position() {
        let mut spring = Spring::new(0.0, 40.0, 30.0, SpringConfig::default());
        spring.step(1.0 / 60.0);
        let before = spring.clone();

        for dt in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(spring.step(dt));
            assert_eq!(spring, before);
        }
    }

    #[test]
    fn test_deserializes_partial_config() {
        let config: SpringConfig = serde_json::from_str(r#"{"stiffness": 250.0}"#).unwrap();
        assert_eq!(config.stiffness, 250.0);
        assert_eq!(config.damping, SPRING_DAMPING);
        assert_eq!(config.mass, SPRING_MASS);
    }
}
