//! Distance-to-target feedback loop.

use crate::config::DistanceConfig;
use crate::control::pid::{Pid, SettlingDetector};
use crate::control::LifecycleState;
use crate::geometry::{ControlSample, Standoff};

/// Drives the range to the target toward the standoff range. Positive output
/// is forward drive.
pub struct DistanceController {
    setpoint_ft: f64,
    pid: Pid,
    settling: SettlingDetector,
    state: LifecycleState,
}

impl DistanceController {
    pub fn new(config: &DistanceConfig, standoff: Standoff) -> Self {
        Self {
            setpoint_ft: standoff.range_ft(),
            pid: Pid::new(config.kp, config.ki, config.kd, 1.0),
            settling: SettlingDetector::new(config.tolerance_ft, config.settling_sec),
            state: LifecycleState::Idle,
        }
    }

    /// Range the controller holds from the target.
    pub fn setpoint_ft(&self) -> f64 {
        self.setpoint_ft
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
            "DistanceController started while active"
        );
        self.pid.reset();
        self.settling.reset();
        self.state = LifecycleState::Running;
        tracing::debug!(
            "distance loop started: {:.2}ft to go, holding {:.2}ft",
            sample.distance_ft,
            self.setpoint_ft
        );
    }

    /// One control step toward the standoff range.
    ///
    /// # Panics
    ///
    /// Panics unless the controller is running: updating before `start` or
    /// after `stop` is a sequencing bug in the caller.
    pub fn update(&mut self, sample: &ControlSample) -> f64 {
        assert_eq!(
            self.state,
            LifecycleState::Running,
            "DistanceController updated while not running"
        );
        let error_ft = sample.distance_ft - self.setpoint_ft;
        self.settling.observe(error_ft, sample.elapsed_sec);
        self.pid.update(error_ft, sample.elapsed_sec)
    }

    /// True once the range error has stayed inside the tolerance band for the
    /// settling period.
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
