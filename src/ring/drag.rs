use crate::ring::spring::{Spring, SpringConfig};
use log::debug;

/// Turns horizontal drag input into a continuous ring rotation.
///
/// The angle is in degrees and is never normalized, so a long drag can wind
/// the ring several turns in either direction.
#[derive(Debug, Clone)]
pub struct DragController {
    rotation: f64,
    sensitivity: f64,
    enabled: bool,
    spring: SpringConfig,
    settle: Option<Spring>,
}

impl DragController {
    pub fn new(sensitivity: f64, spring: SpringConfig) -> Self {
        Self {
            rotation: 0.0,
            sensitivity,
            enabled: true,
            spring,
            settle: None,
        }
    }

    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn sensitivity(&self) -> f64 {
        self.sensitivity
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_settling(&self) -> bool {
        self.settle.is_some()
    }

    /// Target of the in-flight settle, if any.
    pub fn settle_target(&self) -> Option<f64> {
        self.settle.as_ref().map(|s| s.target)
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn retune(&mut self, sensitivity: f64, spring: SpringConfig) {
        self.sensitivity = sensitivity;
        self.spring = spring;
    }

    /// Pointer down on the ring. Grabs the ring where it currently is.
    pub fn on_drag_start(&mut self) -> bool {
        self.enabled && self.halt()
    }

    pub fn on_drag_move(&mut self, delta_x: f64) -> bool {
        if !self.enabled {
            return false;
        }
        if !delta_x.is_finite() {
            debug!("Ignoring non-finite drag delta {}", delta_x);
            return false;
        }
        self.halt();
        self.rotation += delta_x * self.sensitivity;
        true
    }

    /// Releases the ring and lets it coast toward a velocity-derived target.
    pub fn on_drag_end(&mut self, velocity_x: f64) -> bool {
        if !self.enabled {
            return false;
        }
        if !velocity_x.is_finite() {
            debug!("Ignoring non-finite release velocity {}", velocity_x);
            return false;
        }
        let angular_velocity = velocity_x * self.sensitivity;
        let target = self.rotation + angular_velocity;
        debug!("Settling from {:.2} to {:.2} deg", self.rotation, target);
        self.settle = Some(Spring::new(
            self.rotation,
            angular_velocity,
            target,
            self.spring,
        ));
        true
    }

    /// Stops any settle where it is. Returns whether one was running.
    pub fn halt(&mut self) -> bool {
        self.settle.take().is_some()
    }

    /// Advances the settle by one frame; returns true while it is still moving.
    pub fn tick(&mut self, dt: f64) -> bool {
        let Some(spring) = self.settle.as_mut() else {
            return false;
        };

        let moving = spring.step(dt);
        self.rotation = spring.position;
        if !moving {
            self.settle = None;
        }
        moving
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ring::DRAG_SENSITIVITY;

    const FRAME: f64 = 1.0 / 60.0;

    fn controller() -> DragController {
        DragController::new(DRAG_SENSITIVITY, SpringConfig::default())
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_split_drags_equal_one_drag() {
        let mut split = controller();
        split.on_drag_move(37.0);
        split.on_drag_move(-12.5);

        let mut whole = controller();
        whole.on_drag_move(24.5);

        assert!(close(split.rotation(), whole.rotation()));
    }

    #[test]
    fn test_release_targets_velocity_offset() {
        let mut drag = controller();
        drag.on_drag_move(100.0);
        let after_moves = drag.rotation();
        assert!(close(after_moves, 5.0));

        assert!(drag.on_drag_end(40.0));
        assert!(close(drag.settle_target().unwrap(), after_moves + 2.0));
    }

    #[test]
    fn test_settle_converges_on_target() {
        let mut drag = controller();
        drag.on_drag_move(100.0);
        drag.on_drag_end(40.0);

        let mut frames = 0;
        while drag.tick(FRAME) {
            frames += 1;
            assert!(frames < 10_000);
        }
        assert!(!drag.is_settling());
        assert!(close(drag.rotation(), 7.0));
    }

    #[test]
    fn test_drag_preempts_settle_without_jumping() {
        let mut drag = controller();
        drag.on_drag_end(2000.0);
        drag.tick(FRAME);
        drag.tick(FRAME);
        let mid_flight = drag.rotation();
        assert!(mid_flight > 0.0 && mid_flight < 100.0);

        drag.on_drag_move(20.0);
        assert!(!drag.is_settling());
        assert!(close(drag.rotation(), mid_flight + 1.0));

        assert!(!drag.tick(FRAME));
        assert!(close(drag.rotation(), mid_flight + 1.0));
    }

    #[test]
    fn test_disabled_controller_ignores_input() {
        let mut drag = controller();
        drag.set_enabled(false);
        assert!(!drag.on_drag_move(50.0));
        assert!(!drag.on_drag_end(50.0));
        assert_eq!(drag.rotation(), 0.0);
        assert!(!drag.is_settling());
    }

    #[test]
    fn test_non_finite_input_is_ignored() {
        let mut drag = controller();
        assert!(!drag.on_drag_move(f64::NAN));
        assert!(!drag.on_drag_end(f64::INFINITY));
        assert_eq!(drag.rotation(), 0.0);
    }

    #[test]
    fn test_rotation_is_not_wrapped() {
        let mut drag = controller();
        drag.on_drag_move(-20_000.0);
        assert!(close(drag.rotation(), -1000.0));
    }

    #[test]
    fn test_drag_start_grabs_ring_in_place() {
        let mut drag = controller();
        drag.on_drag_end(400.0);
        drag.tick(FRAME);
        let grabbed = drag.rotation();
        assert!(drag.on_drag_start());
        assert!(!drag.is_settling());
        assert_eq!(drag.rotation(), grabbed);
        assert!(!drag.on_drag_start());
    }
}
