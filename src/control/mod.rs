//! Feedback controllers closing the distance, bearing, and heading loops,
//! and the fusion of their outputs into wheel commands.

mod bearing;
mod distance;
mod fusion;
mod pid;
mod rotation;

pub use bearing::BearingController;
pub use distance::DistanceController;
pub use fusion::{fuse, MotorCommand};
pub use rotation::RotationController;

/// Lifecycle of a feedback controller.
///
/// `start` moves Idle to Running; `update` is valid only while Running;
/// `is_finished` may move Running to Finished; `stop` returns to Idle from
/// any state and is idempotent. Updating outside Running is a sequencing bug
/// in the caller and panics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleState {
    Idle,
    Running,
    Finished,
}
