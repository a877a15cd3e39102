//! Go-to-target sequencing.

mod coordinator;

pub use coordinator::{GuidanceMode, GuidanceTarget, SequenceCoordinator, SequencePhase};
