//! Test doubles for guidance sequences.
//!
//! Provides a kinematic differential-drive robot, a fixed-pose drivetrain for
//! pinning loop behavior, a scriptable vision sensor, and a recording
//! telemetry sink.

#![allow(dead_code)]

use std::cell::Cell;

use lakshya_nav::geometry::normalize_angle_deg;
use lakshya_nav::{Drivetrain, LakshyaConfig, Pose, TelemetrySink, VisionSensor, ZoneRecord};

/// Kinematic differential-drive robot. Commands are normalized [-1, 1];
/// `step` integrates the most recent command over a time slice.
pub struct SimRobot {
    pub x_ft: f64,
    pub y_ft: f64,
    pub orientation_deg_ccw: f64,
    pub max_speed_fps: f64,
    pub wheelbase_ft: f64,
    pub last_command: (f64, f64),
}

impl SimRobot {
    pub fn new() -> Self {
        Self {
            x_ft: 0.0,
            y_ft: 0.0,
            orientation_deg_ccw: 0.0,
            max_speed_fps: 5.0,
            wheelbase_ft: 2.0,
            last_command: (0.0, 0.0),
        }
    }

    pub fn pose(&self) -> Pose {
        Pose::new(self.x_ft, self.y_ft, self.orientation_deg_ccw)
    }

    /// Integrate the last wheel command over `dt_sec` using midpoint
    /// integration.
    pub fn step(&mut self, dt_sec: f64) {
        let left_fps = self.last_command.0 * self.max_speed_fps;
        let right_fps = self.last_command.1 * self.max_speed_fps;
        let v_fps = (left_fps + right_fps) / 2.0;
        let omega_rad = (right_fps - left_fps) / self.wheelbase_ft;

        let theta_rad = self.orientation_deg_ccw.to_radians();
        let mid_theta = theta_rad + omega_rad * dt_sec / 2.0;
        self.x_ft += v_fps * dt_sec * mid_theta.cos();
        self.y_ft += v_fps * dt_sec * mid_theta.sin();
        self.orientation_deg_ccw =
            normalize_angle_deg(self.orientation_deg_ccw + (omega_rad * dt_sec).to_degrees());
    }

    pub fn distance_to(&self, x_ft: f64, y_ft: f64) -> f64 {
        (x_ft - self.x_ft).hypot(y_ft - self.y_ft)
    }
}

impl Drivetrain for SimRobot {
    fn position_ft(&self) -> (f64, f64) {
        (self.x_ft, self.y_ft)
    }

    fn orientation_deg_ccw(&self) -> f64 {
        self.orientation_deg_ccw
    }

    fn reset_gyro(&mut self) {
        self.orientation_deg_ccw = 0.0;
    }

    fn reset_encoders(&mut self) {}

    fn reset_position(&mut self) {
        self.x_ft = 0.0;
        self.y_ft = 0.0;
    }

    fn set_initial_orientation_deg_ccw(&mut self, orientation_deg_ccw: f64) {
        self.orientation_deg_ccw = orientation_deg_ccw;
    }

    fn drive(&mut self, left: f64, right: f64) {
        assert!((-1.0..=1.0).contains(&left), "left command {} out of range", left);
        assert!(
            (-1.0..=1.0).contains(&right),
            "right command {} out of range",
            right
        );
        self.last_command = (left, right);
    }
}

/// Drivetrain pinned to one pose; commands are recorded and ignored.
pub struct FixedPoseDrivetrain {
    pub x_ft: f64,
    pub y_ft: f64,
    pub orientation_deg_ccw: f64,
    pub last_command: (f64, f64),
}

impl FixedPoseDrivetrain {
    pub fn at(x_ft: f64, y_ft: f64, orientation_deg_ccw: f64) -> Self {
        Self {
            x_ft,
            y_ft,
            orientation_deg_ccw,
            last_command: (0.0, 0.0),
        }
    }
}

impl Drivetrain for FixedPoseDrivetrain {
    fn position_ft(&self) -> (f64, f64) {
        (self.x_ft, self.y_ft)
    }

    fn orientation_deg_ccw(&self) -> f64 {
        self.orientation_deg_ccw
    }

    fn reset_gyro(&mut self) {}

    fn reset_encoders(&mut self) {}

    fn reset_position(&mut self) {}

    fn set_initial_orientation_deg_ccw(&mut self, _orientation_deg_ccw: f64) {}

    fn drive(&mut self, left: f64, right: f64) {
        self.last_command = (left, right);
    }
}

/// Vision sensor whose readings the test scripts between ticks. NaN (the
/// cleared state) means no detection.
pub struct ScriptedVision {
    distance_ft: Cell<f64>,
    bearing_deg_cw: Cell<f64>,
}

impl ScriptedVision {
    pub fn cleared() -> Self {
        Self {
            distance_ft: Cell::new(f64::NAN),
            bearing_deg_cw: Cell::new(f64::NAN),
        }
    }

    pub fn set(&self, distance_ft: f64, bearing_deg_cw: f64) {
        self.distance_ft.set(distance_ft);
        self.bearing_deg_cw.set(bearing_deg_cw);
    }

    pub fn clear(&self) {
        self.distance_ft.set(f64::NAN);
        self.bearing_deg_cw.set(f64::NAN);
    }
}

impl VisionSensor for ScriptedVision {
    fn distance_ft(&self) -> f64 {
        self.distance_ft.get()
    }

    fn bearing_deg_cw(&self) -> f64 {
        self.bearing_deg_cw.get()
    }
}

/// Telemetry sink that remembers everything it is given.
#[derive(Default)]
pub struct RecordingTelemetry {
    pub logs: Vec<String>,
    pub zones: Vec<ZoneRecord>,
    pub recording: bool,
}

impl TelemetrySink for RecordingTelemetry {
    fn append_log(&mut self, message: &str) {
        self.logs.push(message.to_string());
    }

    fn record_zone(&mut self, record: &ZoneRecord) {
        self.zones.push(*record);
    }

    fn set_recording(&mut self, on: bool) {
        self.recording = on;
    }
}

/// Default config with the sequence timeout overridden.
pub fn config_with_timeout(timeout_sec: f64) -> LakshyaConfig {
    let mut config = LakshyaConfig::default();
    config.sequence.timeout_sec = timeout_sec;
    config
}
