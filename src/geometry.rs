//! Field geometry: poses, targets, and distance/bearing resolution.
//!
//! Conventions: field coordinates in feet, +X forward at zero orientation.
//! Robot orientation is degrees counter-clockwise from +X. Bearing to a
//! target is degrees clockwise from the robot's heading, so a positive
//! bearing means the target sits to the robot's right.

use std::time::Duration;

use crate::platform::VisionSensor;

/// Normalize angle to [-180°, 180°]
#[inline]
pub fn normalize_angle_deg(angle_deg: f64) -> f64 {
    let mut a = angle_deg;
    while a > 180.0 {
        a -= 360.0;
    }
    while a < -180.0 {
        a += 360.0;
    }
    a
}

/// Absolute robot pose as reported by the pose tracker.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub x_ft: f64,
    pub y_ft: f64,
    pub orientation_deg_ccw: f64,
}

impl Pose {
    pub fn new(x_ft: f64, y_ft: f64, orientation_deg_ccw: f64) -> Self {
        Self {
            x_ft,
            y_ft,
            orientation_deg_ccw,
        }
    }
}

/// Absolute field coordinate to drive to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetPoint {
    pub x_ft: f64,
    pub y_ft: f64,
}

impl TargetPoint {
    pub fn new(x_ft: f64, y_ft: f64) -> Self {
        Self { x_ft, y_ft }
    }
}

/// Offset to maintain from the target instead of closing to zero range.
/// Immutable once handed to the controllers; its magnitude becomes the
/// distance setpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Standoff {
    pub x_ft: f64,
    pub y_ft: f64,
}

impl Standoff {
    pub const ZERO: Standoff = Standoff { x_ft: 0.0, y_ft: 0.0 };

    pub fn new(x_ft: f64, y_ft: f64) -> Self {
        Self { x_ft, y_ft }
    }

    /// Range the robot should hold from the target.
    pub fn range_ft(&self) -> f64 {
        self.x_ft.hypot(self.y_ft)
    }
}

/// One target fix reported by the vision sensor. `timestamp` is the injected
/// clock time the values were read.
#[derive(Clone, Copy, Debug)]
pub struct VisionObservation {
    pub distance_ft: f64,
    pub bearing_deg_cw: f64,
    pub timestamp: Duration,
}

/// One tick's controller inputs. `elapsed_sec` is the true clock delta since
/// the previous tick, not an assumed fixed period.
#[derive(Clone, Copy, Debug)]
pub struct ControlSample {
    pub distance_ft: f64,
    pub bearing_deg_cw: f64,
    pub orientation_deg_ccw: f64,
    pub elapsed_sec: f64,
}

/// Distance and 4-quadrant bearing from `pose` to `target`.
///
/// Returns `None` when the displacement is exactly zero: the bearing is
/// undefined there and the caller treats zero range as converged.
pub fn distance_and_bearing(pose: &Pose, target: TargetPoint) -> Option<(f64, f64)> {
    let dx = target.x_ft - pose.x_ft;
    let dy = target.y_ft - pose.y_ft;
    let distance = dx.hypot(dy);
    if distance == 0.0 {
        return None;
    }
    // atan2, never atan(dy/dx): the single-argument form collapses the left
    // half-plane and blows up near dx == 0.
    let psi_deg_ccw = dy.atan2(dx).to_degrees();
    let bearing = normalize_angle_deg(pose.orientation_deg_ccw - psi_deg_ccw);
    Some((distance, bearing))
}

/// Geometry against a fixed field coordinate, resolved from odometry.
///
/// Carries the previous bearing so that a degenerate sample (robot exactly at
/// the target) repeats it instead of inventing one.
#[derive(Clone, Debug)]
pub struct OdometryGeometry {
    target: TargetPoint,
    last_bearing_deg_cw: f64,
}

impl OdometryGeometry {
    pub fn new(target: TargetPoint) -> Self {
        Self {
            target,
            last_bearing_deg_cw: 0.0,
        }
    }

    pub fn target(&self) -> TargetPoint {
        self.target
    }

    /// Resolve (distance, bearing) for the current pose.
    pub fn resolve(&mut self, pose: &Pose) -> (f64, f64) {
        match distance_and_bearing(pose, self.target) {
            Some((distance, bearing)) => {
                self.last_bearing_deg_cw = bearing;
                (distance, bearing)
            }
            None => (0.0, self.last_bearing_deg_cw),
        }
    }
}

/// Geometry reported by the vision sensor, with an odometry fallback for
/// dropouts.
///
/// Every fresh observation caches the implied absolute target (current pose
/// plus the observed range along the observed direction). While the sensor
/// reports nothing, geometry is derived from odometry against that cached
/// point, so the robot keeps driving through short dropouts. A cached fix older
/// than the staleness window is discarded; with no usable fix `resolve`
/// yields nothing and the caller holds position.
///
/// Standoff compensation is NOT applied here: the controllers carry the
/// standoff as their distance setpoint, so both resolvers return raw
/// target-relative geometry.
#[derive(Clone, Debug)]
pub struct VisionGeometry {
    staleness_sec: f64,
    implied_target: Option<TargetPoint>,
    last_fix_at: Option<Duration>,
    last_bearing_deg_cw: f64,
}

impl VisionGeometry {
    pub fn new(staleness_sec: f64) -> Self {
        Self {
            staleness_sec,
            implied_target: None,
            last_fix_at: None,
            last_bearing_deg_cw: 0.0,
        }
    }

    /// Resolve (distance, bearing) from a fresh observation, or from odometry
    /// against the cached implied target during a dropout.
    pub fn resolve(
        &mut self,
        pose: &Pose,
        observation: Option<VisionObservation>,
        now: Duration,
    ) -> Option<(f64, f64)> {
        if let Some(obs) = observation {
            if self.last_fix_at.is_none() {
                tracing::debug!(
                    "vision fix acquired: {:.2}ft at {:.1}°",
                    obs.distance_ft,
                    obs.bearing_deg_cw
                );
            }
            let psi_rad = (pose.orientation_deg_ccw - obs.bearing_deg_cw).to_radians();
            self.implied_target = Some(TargetPoint::new(
                pose.x_ft + obs.distance_ft * psi_rad.cos(),
                pose.y_ft + obs.distance_ft * psi_rad.sin(),
            ));
            self.last_fix_at = Some(obs.timestamp);
            self.last_bearing_deg_cw = obs.bearing_deg_cw;
            return Some((obs.distance_ft, obs.bearing_deg_cw));
        }

        let fix_at = self.last_fix_at?;
        let age_sec = now.saturating_sub(fix_at).as_secs_f64();
        if age_sec > self.staleness_sec {
            if self.implied_target.take().is_some() {
                tracing::warn!(
                    "vision fix {:.2}s old (limit {:.2}s), discarding",
                    age_sec,
                    self.staleness_sec
                );
            }
            return None;
        }

        let target = self.implied_target?;
        match distance_and_bearing(pose, target) {
            Some((distance, bearing)) => {
                self.last_bearing_deg_cw = bearing;
                Some((distance, bearing))
            }
            None => Some((0.0, self.last_bearing_deg_cw)),
        }
    }
}

/// The geometry source feeding a go-to phase. Exactly one per command
/// instance.
#[derive(Clone, Debug)]
pub enum GeometrySource {
    Odometry(OdometryGeometry),
    Vision(VisionGeometry),
}

impl GeometrySource {
    /// Resolve (distance, bearing) for this tick. The odometry source always
    /// resolves; the vision source may have nothing usable.
    pub fn resolve(
        &mut self,
        pose: &Pose,
        observation: Option<VisionObservation>,
        now: Duration,
    ) -> Option<(f64, f64)> {
        match self {
            GeometrySource::Odometry(odometry) => Some(odometry.resolve(pose)),
            GeometrySource::Vision(vision) => vision.resolve(pose, observation, now),
        }
    }
}

/// Read the vision sensor into an observation. Non-finite values mean no
/// current detection.
pub fn read_vision(
    vision: Option<&dyn VisionSensor>,
    now: Duration,
) -> Option<VisionObservation> {
    let sensor = vision?;
    let distance_ft = sensor.distance_ft();
    let bearing_deg_cw = sensor.bearing_deg_cw();
    if distance_ft.is_finite() && bearing_deg_cw.is_finite() {
        Some(VisionObservation {
            distance_ft,
            bearing_deg_cw,
            timestamp: now,
        })
    } else {
        None
    }
}
