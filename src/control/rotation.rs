//! Absolute-heading feedback loop.

use crate::config::RotationConfig;
use crate::control::pid::{Pid, SettlingDetector};
use crate::control::LifecycleState;
use crate::geometry::{normalize_angle_deg, ControlSample};

/// Drives the absolute heading toward a target heading. The output is applied
/// as a pure rotation, `{left: c, right: -c}`: positive output spins the
/// robot clockwise.
pub struct RotationController {
    target_heading_deg_ccw: f64,
    pid: Pid,
    settling: SettlingDetector,
    state: LifecycleState,
}

impl RotationController {
    pub fn new(config: &RotationConfig, target_heading_deg_ccw: f64) -> Self {
        Self {
            target_heading_deg_ccw,
            pid: Pid::new(config.kp, config.ki, config.kd, 1.0),
            settling: SettlingDetector::new(config.tolerance_deg, config.settling_sec),
            state: LifecycleState::Idle,
        }
    }

    pub fn target_heading_deg_ccw(&self) -> f64 {
        self.target_heading_deg_ccw
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Begin a control session.
    ///
    /// # Panics
    ///
    /// Panics unless the controller is idle.
    pub fn start(&mut self, sample: &ControlSample) {
        assert_eq!(
            self.state,
            LifecycleState::Idle,
            "RotationController started while active"
        );
        self.pid.reset();
        self.settling.reset();
        self.state = LifecycleState::Running;
        tracing::debug!(
            "rotation loop started: {:.1}° toward {:.1}°",
            sample.orientation_deg_ccw,
            self.target_heading_deg_ccw
        );
    }

    /// One control step toward the target heading. The error is the shortest
    /// angular path, clockwise-positive.
    ///
    /// # Panics
    ///
    /// Panics unless the controller is running.
    pub fn update(&mut self, sample: &ControlSample) -> f64 {
        assert_eq!(
            self.state,
            LifecycleState::Running,
            "RotationController updated while not running"
        );
        let error_deg_cw =
            normalize_angle_deg(sample.orientation_deg_ccw - self.target_heading_deg_ccw);
        self.settling.observe(error_deg_cw, sample.elapsed_sec);
        self.pid.update(error_deg_cw, sample.elapsed_sec)
    }

    /// True once the heading error has stayed inside the tolerance band for
    /// the settling period.
    pub fn is_finished(&mut self) -> bool {
        if self.state == LifecycleState::Running && self.settling.is_settled() {
            self.state = LifecycleState::Finished;
        }
        self.state == LifecycleState::Finished
    }

    /// Return to idle and release loop state. Safe in any state, any number
    /// of times.
    pub fn stop(&mut self) {
        self.pid.reset();
        self.settling.reset();
        self.state = LifecycleState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RotationConfig;

    fn sample(orientation_deg_ccw: f64) -> ControlSample {
        ControlSample {
            distance_ft: 0.0,
            bearing_deg_cw: 0.0,
            orientation_deg_ccw,
            elapsed_sec: 0.05,
        }
    }

    fn controller(target: f64) -> RotationController {
        RotationController::new(&RotationConfig::default(), target)
    }

    #[test]
    fn test_rotates_toward_target() {
        // At 0° with the target at 90° CCW the robot must spin
        // counter-clockwise: negative output.
        let mut ctrl = controller(90.0);
        ctrl.start(&sample(0.0));
        assert!(ctrl.update(&sample(0.0)) < 0.0);
    }

    #[test]
    fn test_takes_shortest_path_across_wrap() {
        // 170° to -170° is 20° counter-clockwise through the wrap, not 340°
        // back the other way: expect a small counter-clockwise output.
        let mut ctrl = controller(-170.0);
        ctrl.start(&sample(170.0));
        let out = ctrl.update(&sample(170.0));
        assert!(out < 0.0);
        assert!(out.abs() < 0.5, "output {} should reflect a 20° error", out);
    }

    #[test]
    fn test_finishes_when_heading_settles() {
        let mut ctrl = controller(45.0);
        ctrl.start(&sample(44.0));
        for _ in 0..10 {
            ctrl.update(&sample(44.5));
        }
        assert!(ctrl.is_finished());
    }

    #[test]
    #[should_panic(expected = "updated while not running")]
    fn test_update_after_stop_panics() {
        let mut ctrl = controller(0.0);
        ctrl.start(&sample(10.0));
        ctrl.stop();
        ctrl.update(&sample(10.0));
    }

    #[test]
    fn test_stop_twice_is_safe() {
        let mut ctrl = controller(0.0);
        ctrl.stop();
        ctrl.stop();
        assert_eq!(ctrl.state(), LifecycleState::Idle);
    }
}
