//! Capability traits the host robot platform implements.
//!
//! The guidance core never reaches for hardware on its own: the scheduler
//! hands it these interfaces on every lifecycle call through [`GuidanceIo`].

use crate::geometry::Pose;

/// Pose tracking and tank-drive output. One subsystem on the host, one trait
/// here.
pub trait Drivetrain {
    /// Current field position in feet.
    fn position_ft(&self) -> (f64, f64);

    /// Current absolute orientation, degrees counter-clockwise.
    fn orientation_deg_ccw(&self) -> f64;

    /// Zero the gyro.
    fn reset_gyro(&mut self);

    /// Zero the wheel encoders.
    fn reset_encoders(&mut self);

    /// Zero the position tracker.
    fn reset_position(&mut self);

    /// Seed the pose tracker with the robot's known field orientation.
    fn set_initial_orientation_deg_ccw(&mut self, orientation_deg_ccw: f64);

    /// Tank drive. Both inputs are normalized to [-1, 1] before this is
    /// called.
    fn drive(&mut self, left: f64, right: f64);
}

/// Target geometry reported by the vision pipeline. Non-finite values (NaN)
/// signal that nothing is currently acquired.
pub trait VisionSensor {
    /// Distance to the acquired target in feet, or NaN.
    fn distance_ft(&self) -> f64;

    /// Bearing to the acquired target in degrees clockwise, or NaN.
    fn bearing_deg_cw(&self) -> f64;
}

/// One tick of control telemetry for the data recorder.
#[derive(Clone, Copy, Debug)]
pub struct ZoneRecord {
    /// Which control segment produced the record
    pub zone_id: u8,
    /// Resolved range to the target (feet)
    pub distance_ft: f64,
    /// Distance loop output
    pub distance_control: f64,
    /// Resolved bearing to the target (degrees clockwise)
    pub bearing_deg_cw: f64,
    /// Bearing loop output
    pub bearing_control: f64,
}

/// Diagnostics sink. Implementations must never block and never fail; every
/// method defaults to a no-op so hosts opt into exactly what they record.
pub trait TelemetrySink {
    /// Append one line to the persistent event log.
    fn append_log(&mut self, _message: &str) {}

    /// Record one tick of control telemetry.
    fn record_zone(&mut self, _record: &ZoneRecord) {}

    /// Toggle per-tick recording around a command's lifetime.
    fn set_recording(&mut self, _on: bool) {}
}

/// Telemetry sink that discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullTelemetry;

impl TelemetrySink for NullTelemetry {}

/// Capability bundle handed to the coordinator on each lifecycle call.
pub struct GuidanceIo<'a> {
    pub drivetrain: &'a mut dyn Drivetrain,
    /// Required only for vision-sourced goals.
    pub vision: Option<&'a dyn VisionSensor>,
    pub telemetry: &'a mut dyn TelemetrySink,
}

impl GuidanceIo<'_> {
    /// Snapshot the drivetrain's pose estimate.
    pub fn pose(&self) -> Pose {
        let (x_ft, y_ft) = self.drivetrain.position_ft();
        Pose::new(x_ft, y_ft, self.drivetrain.orientation_deg_ccw())
    }
}
