//! Configuration loading for LakshyaNav

use crate::error::{LakshyaError, Result};
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Clone, Debug, Deserialize)]
pub struct LakshyaConfig {
    #[serde(default)]
    pub distance: DistanceConfig,
    #[serde(default)]
    pub bearing: BearingConfig,
    #[serde(default)]
    pub rotation: RotationConfig,
    #[serde(default)]
    pub sequence: SequenceConfig,
}

/// Distance loop: drives the range to the target toward the standoff range.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct DistanceConfig {
    /// Proportional gain, output per foot of range error
    #[serde(default = "default_distance_kp")]
    pub kp: f64,

    /// Integral gain
    #[serde(default)]
    pub ki: f64,

    /// Derivative gain
    #[serde(default = "default_distance_kd")]
    pub kd: f64,

    /// Range error band considered on-target (feet)
    #[serde(default = "default_distance_tolerance")]
    pub tolerance_ft: f64,

    /// Time the error must stay inside the band to finish (seconds)
    #[serde(default = "default_settling_sec")]
    pub settling_sec: f64,
}

/// Bearing loop: drives the bearing to the target toward zero.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct BearingConfig {
    /// Proportional gain, output per degree of bearing error
    #[serde(default = "default_bearing_kp")]
    pub kp: f64,

    /// Integral gain
    #[serde(default)]
    pub ki: f64,

    /// Derivative gain
    #[serde(default = "default_bearing_kd")]
    pub kd: f64,

    /// Bearing error band considered on-target (degrees)
    #[serde(default = "default_bearing_tolerance")]
    pub tolerance_deg: f64,

    /// Time the error must stay inside the band to finish (seconds)
    #[serde(default = "default_settling_sec")]
    pub settling_sec: f64,

    /// Range below which the bearing output is held at zero (feet).
    /// Bearing degenerates close to the target and must not be chased.
    #[serde(default = "default_hold_radius")]
    pub hold_radius_ft: f64,
}

/// Rotation loop: drives the absolute heading toward a target heading.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct RotationConfig {
    /// Proportional gain, output per degree of heading error
    #[serde(default = "default_rotation_kp")]
    pub kp: f64,

    /// Integral gain
    #[serde(default)]
    pub ki: f64,

    /// Derivative gain
    #[serde(default = "default_rotation_kd")]
    pub kd: f64,

    /// Heading error band considered on-target (degrees)
    #[serde(default = "default_rotation_tolerance")]
    pub tolerance_deg: f64,

    /// Time the error must stay inside the band to finish (seconds)
    #[serde(default = "default_rotation_settling_sec")]
    pub settling_sec: f64,
}

/// Sequencing parameters
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct SequenceConfig {
    /// Wall-clock budget for the whole sequence (seconds). Reaching it forces
    /// a graceful end with motors zeroed, regardless of loop convergence.
    #[serde(default = "default_timeout_sec")]
    pub timeout_sec: f64,

    /// Age beyond which a cached vision fix is discarded (seconds)
    #[serde(default = "default_vision_staleness")]
    pub vision_staleness_sec: f64,
}

// Default value functions
fn default_distance_kp() -> f64 {
    0.20
}
fn default_distance_kd() -> f64 {
    0.02
}
fn default_distance_tolerance() -> f64 {
    0.25
}
fn default_bearing_kp() -> f64 {
    0.02
}
fn default_bearing_kd() -> f64 {
    0.002
}
fn default_bearing_tolerance() -> f64 {
    3.0
}
fn default_hold_radius() -> f64 {
    0.5
}
fn default_rotation_kp() -> f64 {
    0.015
}
fn default_rotation_kd() -> f64 {
    0.001
}
fn default_rotation_tolerance() -> f64 {
    2.0
}
fn default_settling_sec() -> f64 {
    0.3
}
fn default_rotation_settling_sec() -> f64 {
    0.4
}
fn default_timeout_sec() -> f64 {
    15.0
}
fn default_vision_staleness() -> f64 {
    2.0
}

impl Default for DistanceConfig {
    fn default() -> Self {
        Self {
            kp: default_distance_kp(),
            ki: 0.0,
            kd: default_distance_kd(),
            tolerance_ft: default_distance_tolerance(),
            settling_sec: default_settling_sec(),
        }
    }
}

impl Default for BearingConfig {
    fn default() -> Self {
        Self {
            kp: default_bearing_kp(),
            ki: 0.0,
            kd: default_bearing_kd(),
            tolerance_deg: default_bearing_tolerance(),
            settling_sec: default_settling_sec(),
            hold_radius_ft: default_hold_radius(),
        }
    }
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            kp: default_rotation_kp(),
            ki: 0.0,
            kd: default_rotation_kd(),
            tolerance_deg: default_rotation_tolerance(),
            settling_sec: default_rotation_settling_sec(),
        }
    }
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            timeout_sec: default_timeout_sec(),
            vision_staleness_sec: default_vision_staleness(),
        }
    }
}

impl Default for LakshyaConfig {
    fn default() -> Self {
        Self {
            distance: DistanceConfig::default(),
            bearing: BearingConfig::default(),
            rotation: RotationConfig::default(),
            sequence: SequenceConfig::default(),
        }
    }
}

impl LakshyaConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| LakshyaError::Config(format!("Failed to read config file: {}", e)))?;
        let config: LakshyaConfig = toml::from_str(&content)?;
        Ok(config)
    }
}
