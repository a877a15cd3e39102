//! Sequencing state machine: go to the target, then optionally rotate to a
//! final heading.
//!
//! The external scheduler owns the loop: it calls [`SequenceCoordinator::activate`]
//! once, then [`SequenceCoordinator::tick`] every period until
//! [`SequenceCoordinator::is_complete`], invoking
//! [`SequenceCoordinator::on_interrupt`] if it preempts the sequence. Within a
//! tick the order is fixed: geometry resolution, then controller updates, then
//! fusion, then the motor command. Reusing a stale geometry sample anywhere in
//! that chain is a correctness bug.
//!
//! Phase transitions:
//!
//! ```text
//! GoToTarget ── distance loop finished ──> FinalRotation ── rotation finished ──> Done
//!      │              (requested)                │
//!      └── distance loop finished, ─────────────┼──────> Done
//!          no final heading                     │
//!      timeout / interrupt (any phase) ─────────┴──────> Done
//! ```
//!
//! The go-to phase ends on distance convergence alone; bearing convergence is
//! deliberately not required, which can leave residual bearing error for the
//! rotation phase (or the caller) to absorb.

use std::time::Duration;

use crate::clock::{Clock, MonotonicClock};
use crate::config::LakshyaConfig;
use crate::control::{
    fuse, BearingController, DistanceController, LifecycleState, MotorCommand,
    RotationController,
};
use crate::geometry::{
    read_vision, ControlSample, GeometrySource, OdometryGeometry, Standoff, TargetPoint,
    VisionGeometry,
};
use crate::platform::{GuidanceIo, ZoneRecord};

/// Telemetry zone for the go-to phase.
const GO_TO_ZONE_ID: u8 = 11;

/// Where the go-to phase gets its geometry.
#[derive(Clone, Copy, Debug)]
pub enum GuidanceTarget {
    /// Absolute field coordinate, resolved against odometry.
    Coordinate(TargetPoint),
    /// Whatever the vision sensor has acquired.
    Vision,
}

/// What a guidance sequence should accomplish.
#[derive(Clone, Copy, Debug)]
pub enum GuidanceMode {
    /// Drive to a target, then optionally correct the final heading.
    GoTo {
        target: GuidanceTarget,
        standoff: Standoff,
        /// `None` means the final heading is not cared about and the
        /// rotation phase never runs.
        final_orientation_deg_ccw: Option<f64>,
    },
    /// Rotate in place to a heading, no translation phase.
    RotateInPlace {
        final_orientation_deg_ccw: f64,
        /// Also zero the encoders and position tracker at activation.
        reset_pose: bool,
    },
}

/// Sequence phases. `Done` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SequencePhase {
    GoToTarget,
    FinalRotation,
    Done,
}

/// Runs one guidance sequence against the platform capabilities handed in on
/// each call. Construct one instance per sequence.
pub struct SequenceCoordinator {
    config: LakshyaConfig,
    mode: GuidanceMode,
    initial_orientation_deg_ccw: f64,
    clock: Box<dyn Clock>,
    phase: SequencePhase,
    geometry: Option<GeometrySource>,
    distance: Option<DistanceController>,
    bearing: Option<BearingController>,
    rotation: Option<RotationController>,
    activated_at: Option<Duration>,
    prev_tick_at: Option<Duration>,
    completed_by_timeout: bool,
}

impl SequenceCoordinator {
    /// Create a sequence with the default monotonic clock.
    pub fn new(
        config: LakshyaConfig,
        mode: GuidanceMode,
        initial_orientation_deg_ccw: f64,
    ) -> Self {
        Self::with_clock(
            config,
            mode,
            initial_orientation_deg_ccw,
            Box::new(MonotonicClock::new()),
        )
    }

    /// Create a sequence with an injected clock.
    pub fn with_clock(
        config: LakshyaConfig,
        mode: GuidanceMode,
        initial_orientation_deg_ccw: f64,
        clock: Box<dyn Clock>,
    ) -> Self {
        let phase = match mode {
            GuidanceMode::GoTo { .. } => SequencePhase::GoToTarget,
            GuidanceMode::RotateInPlace { .. } => SequencePhase::FinalRotation,
        };
        Self {
            config,
            mode,
            initial_orientation_deg_ccw,
            clock,
            phase,
            geometry: None,
            distance: None,
            bearing: None,
            rotation: None,
            activated_at: None,
            prev_tick_at: None,
            completed_by_timeout: false,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> SequencePhase {
        self.phase
    }

    /// True once the sequence has reached its terminal state.
    pub fn is_complete(&self) -> bool {
        self.phase == SequencePhase::Done
    }

    /// Whether completion was forced by the wall-clock timeout rather than
    /// loop convergence. Timeout is a graceful end, not a failure.
    pub fn completed_by_timeout(&self) -> bool {
        self.completed_by_timeout
    }

    /// Begin the sequence: seed the pose tracker, build the geometry source
    /// and controllers, and enter the first phase.
    pub fn activate(&mut self, io: &mut GuidanceIo<'_>) {
        let now = self.clock.now();
        self.activated_at = Some(now);
        self.prev_tick_at = Some(now);
        self.completed_by_timeout = false;

        io.telemetry.set_recording(true);

        match self.mode {
            GuidanceMode::GoTo {
                target, standoff, ..
            } => {
                io.drivetrain.reset_gyro();
                io.drivetrain.reset_encoders();
                io.drivetrain.reset_position();
                io.drivetrain
                    .set_initial_orientation_deg_ccw(self.initial_orientation_deg_ccw);

                let mut geometry = match target {
                    GuidanceTarget::Coordinate(point) => {
                        GeometrySource::Odometry(OdometryGeometry::new(point))
                    }
                    GuidanceTarget::Vision => GeometrySource::Vision(VisionGeometry::new(
                        self.config.sequence.vision_staleness_sec,
                    )),
                };
                let mut distance = DistanceController::new(&self.config.distance, standoff);
                let mut bearing = BearingController::new(&self.config.bearing);

                // Start both loops from the first resolved sample. A vision
                // goal with nothing acquired yet defers the start to the
                // first tick that resolves.
                let pose = io.pose();
                let observation = read_vision(io.vision, now);
                if let Some((distance_ft, bearing_deg_cw)) =
                    geometry.resolve(&pose, observation, now)
                {
                    let sample = ControlSample {
                        distance_ft,
                        bearing_deg_cw,
                        orientation_deg_ccw: pose.orientation_deg_ccw,
                        elapsed_sec: 0.0,
                    };
                    distance.start(&sample);
                    bearing.start(&sample);
                }

                self.geometry = Some(geometry);
                self.distance = Some(distance);
                self.bearing = Some(bearing);
                self.phase = SequencePhase::GoToTarget;

                tracing::info!(
                    "guidance activated: go-to {:?}, standoff {:.2}ft",
                    target,
                    standoff.range_ft()
                );
                io.telemetry.append_log("guidance: go-to activated");
            }
            GuidanceMode::RotateInPlace {
                final_orientation_deg_ccw,
                reset_pose,
            } => {
                if reset_pose {
                    io.drivetrain.reset_encoders();
                    io.drivetrain.reset_position();
                }
                io.drivetrain
                    .set_initial_orientation_deg_ccw(self.initial_orientation_deg_ccw);

                tracing::info!(
                    "guidance activated: rotate in place to {:.1}°",
                    final_orientation_deg_ccw
                );
                io.telemetry.append_log("guidance: rotation activated");
                self.enter_final_rotation(io, final_orientation_deg_ccw);
            }
        }
    }

    /// One control period. Call at the scheduler rate while the sequence is
    /// incomplete; calling after `Done` is a no-op.
    ///
    /// # Panics
    ///
    /// Panics if called before `activate`.
    pub fn tick(&mut self, io: &mut GuidanceIo<'_>) {
        if self.phase == SequencePhase::Done {
            return;
        }

        let activated_at = self.activated_at.expect("tick called before activate");
        let now = self.clock.now();
        let elapsed_sec = self
            .prev_tick_at
            .map(|prev| now.saturating_sub(prev).as_secs_f64())
            .unwrap_or(0.0);
        self.prev_tick_at = Some(now);

        // Timeout overrides everything, including an in-flight rotation.
        let running_sec = now.saturating_sub(activated_at).as_secs_f64();
        if running_sec >= self.config.sequence.timeout_sec {
            tracing::warn!(
                "guidance timed out after {:.1}s in {:?}",
                running_sec,
                self.phase
            );
            io.telemetry.append_log("guidance: timed out");
            self.completed_by_timeout = true;
            self.finish(io);
            return;
        }

        match self.phase {
            SequencePhase::GoToTarget => self.tick_go_to(io, now, elapsed_sec),
            SequencePhase::FinalRotation => self.tick_rotation(io, elapsed_sec),
            SequencePhase::Done => {}
        }
    }

    /// Interruption callback. Behaves exactly like reaching `Done`: all
    /// controllers stopped (whatever their state), motors zeroed, phase
    /// terminal. Safe to call at any point, including before `activate`.
    pub fn on_interrupt(&mut self, io: &mut GuidanceIo<'_>) {
        if self.phase != SequencePhase::Done {
            tracing::info!("guidance interrupted in {:?}", self.phase);
            io.telemetry.append_log("guidance: interrupted");
        }
        self.finish(io);
    }

    fn tick_go_to(&mut self, io: &mut GuidanceIo<'_>, now: Duration, elapsed_sec: f64) {
        let pose = io.pose();
        let observation = read_vision(io.vision, now);

        let resolved = self
            .geometry
            .as_mut()
            .expect("go-to phase without geometry source")
            .resolve(&pose, observation, now);

        let Some((distance_ft, bearing_deg_cw)) = resolved else {
            // No usable fix: hold position and wait for reacquisition. The
            // sequence timeout bounds the wait.
            io.drivetrain.drive(0.0, 0.0);
            return;
        };

        let sample = ControlSample {
            distance_ft,
            bearing_deg_cw,
            orientation_deg_ccw: pose.orientation_deg_ccw,
            elapsed_sec,
        };

        let distance = self
            .distance
            .as_mut()
            .expect("go-to phase without distance controller");
        let bearing = self
            .bearing
            .as_mut()
            .expect("go-to phase without bearing controller");

        if distance.state() == LifecycleState::Idle {
            distance.start(&sample);
            bearing.start(&sample);
        }

        // Exactly at the target: the bearing is undefined, a bearing fix is
        // neither possible nor needed. Converged.
        if distance_ft == 0.0 {
            tracing::info!("go-to degenerate geometry, treating as converged");
            self.complete_go_to(io);
            return;
        }

        let distance_control = distance.update(&sample);
        let bearing_control = bearing.update(&sample);
        let command = fuse(distance_control, bearing_control);
        io.drivetrain.drive(command.left, command.right);
        io.telemetry.record_zone(&ZoneRecord {
            zone_id: GO_TO_ZONE_ID,
            distance_ft,
            distance_control,
            bearing_deg_cw,
            bearing_control,
        });
        tracing::debug!(
            "go-to: dist={:.2}ft bearing={:.1}° cmd=({:.2},{:.2})",
            distance_ft,
            bearing_deg_cw,
            command.left,
            command.right
        );

        // Distance is the authoritative completion signal; residual bearing
        // error does not hold the phase open.
        if distance.is_finished() {
            tracing::info!("distance loop finished at {:.2}ft", distance_ft);
            self.complete_go_to(io);
        }
    }

    fn complete_go_to(&mut self, io: &mut GuidanceIo<'_>) {
        io.drivetrain.drive(0.0, 0.0);
        if let Some(distance) = self.distance.as_mut() {
            distance.stop();
        }
        if let Some(bearing) = self.bearing.as_mut() {
            bearing.stop();
        }
        io.telemetry.append_log("guidance: go-to finished");

        match self.mode {
            GuidanceMode::GoTo {
                final_orientation_deg_ccw: Some(heading),
                ..
            } => self.enter_final_rotation(io, heading),
            _ => self.finish(io),
        }
    }

    fn enter_final_rotation(&mut self, io: &mut GuidanceIo<'_>, target_heading_deg_ccw: f64) {
        let orientation_deg_ccw = io.drivetrain.orientation_deg_ccw();
        let sample = ControlSample {
            distance_ft: 0.0,
            bearing_deg_cw: 0.0,
            orientation_deg_ccw,
            elapsed_sec: 0.0,
        };
        let mut rotation = RotationController::new(&self.config.rotation, target_heading_deg_ccw);
        rotation.start(&sample);
        self.rotation = Some(rotation);
        self.phase = SequencePhase::FinalRotation;
        tracing::info!(
            "final rotation: {:.1}° toward {:.1}°",
            orientation_deg_ccw,
            target_heading_deg_ccw
        );
    }

    fn tick_rotation(&mut self, io: &mut GuidanceIo<'_>, elapsed_sec: f64) {
        let orientation_deg_ccw = io.drivetrain.orientation_deg_ccw();
        let sample = ControlSample {
            distance_ft: 0.0,
            bearing_deg_cw: 0.0,
            orientation_deg_ccw,
            elapsed_sec,
        };
        let rotation = self
            .rotation
            .as_mut()
            .expect("rotation phase without rotation controller");

        let control = rotation.update(&sample);
        let command = MotorCommand::rotation(control);
        io.drivetrain.drive(command.left, command.right);
        tracing::debug!(
            "rotation: {:.1}° cmd=({:.2},{:.2})",
            orientation_deg_ccw,
            command.left,
            command.right
        );

        if rotation.is_finished() {
            tracing::info!("rotation loop finished at {:.1}°", orientation_deg_ccw);
            self.finish(io);
        }
    }

    /// Terminal transition, shared by normal completion, timeout, and
    /// interruption: stop every controller, zero the motors, end recording.
    fn finish(&mut self, io: &mut GuidanceIo<'_>) {
        if let Some(distance) = self.distance.as_mut() {
            distance.stop();
        }
        if let Some(bearing) = self.bearing.as_mut() {
            bearing.stop();
        }
        if let Some(rotation) = self.rotation.as_mut() {
            rotation.stop();
        }
        io.drivetrain.drive(0.0, 0.0);
        if self.phase != SequencePhase::Done {
            tracing::info!("guidance sequence done");
            io.telemetry.append_log("guidance: done");
        }
        io.telemetry.set_recording(false);
        self.phase = SequencePhase::Done;
    }
}
