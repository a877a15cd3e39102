//! Bearing-to-target feedback loop.

use crate::config::BearingConfig;
use crate::control::pid::{Pid, SettlingDetector};
use crate::control::LifecycleState;
use crate::geometry::ControlSample;

/// Drives the bearing to the target toward zero. Positive output turns the
/// robot clockwise (fed additively to the left wheel, subtractively to the
/// right).
pub struct BearingController {
    hold_radius_ft: f64,
    pid: Pid,
    settling: SettlingDetector,
    state: LifecycleState,
}

impl BearingController {
    pub fn new(config: &BearingConfig) -> Self {
        Self {
            hold_radius_ft: config.hold_radius_ft,
            pid: Pid::new(config.kp, config.ki, config.kd, 1.0),
            settling: SettlingDetector::new(config.tolerance_deg, config.settling_sec),
            state: LifecycleState::Idle,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Begin a control session from the first resolved sample.
    ///
    /// # Panics
    ///
    /// Panics unless the controller is idle.
    pub fn start(&mut self, sample: &ControlSample) {
        assert_eq!(
            self.state,
            LifecycleState::Idle,
            "BearingController started while active"
        );
        self.pid.reset();
        self.settling.reset();
        self.state = LifecycleState::Running;
        tracing::debug!("bearing loop started at {:.1}°", sample.bearing_deg_cw);
    }

    /// One control step toward zero bearing.
    ///
    /// Inside the hold radius the output is pinned to zero: bearing
    /// degenerates as the range collapses and chasing it would spin the robot
    /// around a point it has already reached.
    ///
    /// # Panics
    ///
    /// Panics unless the controller is running.
    pub fn update(&mut self, sample: &ControlSample) -> f64 {
        assert_eq!(
            self.state,
            LifecycleState::Running,
            "BearingController updated while not running"
        );
        if sample.distance_ft <= self.hold_radius_ft {
            self.settling.observe(0.0, sample.elapsed_sec);
            return 0.0;
        }
        let error_deg = sample.bearing_deg_cw;
        self.settling.observe(error_deg, sample.elapsed_sec);
        self.pid.update(error_deg, sample.elapsed_sec)
    }

    /// True once the bearing error has stayed inside the tolerance band for
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
