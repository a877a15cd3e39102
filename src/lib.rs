//! LakshyaNav - target-seeking guidance for differential-drive robots.
//!
//! Given a goal - an absolute field coordinate, or whatever the vision sensor
//! has acquired - the coordinator closes two feedback loops every scheduler
//! tick, distance-to-target and bearing-to-target, fuses their outputs into
//! tank-drive wheel commands, and optionally finishes with a third loop that
//! rotates the robot to a requested final heading.
//!
//! ## Per-tick data flow
//!
//! pose/vision sample → geometry resolution → distance + bearing loops →
//! fusion → [`platform::Drivetrain::drive`]. The host scheduler owns the
//! loop and calls [`guidance::SequenceCoordinator::tick`] once per period
//! (20-50 ms in practice); everything here completes within the tick, with
//! no threads and no blocking.
//!
//! ## Modules
//!
//! - [`geometry`] - poses, targets, distance/bearing resolution
//! - [`control`] - the three feedback loops and command fusion
//! - [`guidance`] - the phase state machine
//! - [`platform`] - capability traits the host implements
//! - [`clock`] - injected time source
//! - [`config`] - gains, tolerances, and sequencing parameters

pub mod clock;
pub mod config;
pub mod control;
pub mod error;
pub mod geometry;
pub mod guidance;
pub mod platform;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::LakshyaConfig;
pub use control::{
    fuse, BearingController, DistanceController, LifecycleState, MotorCommand,
    RotationController,
};
pub use error::{LakshyaError, Result};
pub use geometry::{ControlSample, Pose, Standoff, TargetPoint, VisionObservation};
pub use guidance::{GuidanceMode, GuidanceTarget, SequenceCoordinator, SequencePhase};
pub use platform::{Drivetrain, GuidanceIo, NullTelemetry, TelemetrySink, VisionSensor, ZoneRecord};
