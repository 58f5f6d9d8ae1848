//! Session configuration, loadable from JSON
//!
//! Every field has a default, so `{}` is a valid configuration.

use serde::{Deserialize, Serialize};

use crate::error::{TrackingError, TrackingResult};
use crate::face::{BlinkConfig, MeshConfig};
use crate::geometry::{CoordinateConvention, DepthSign};
use crate::gesture::FingerReference;
use crate::rig::WeaponConfig;
use crate::smoothing::OneEuroParams;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FingerConfig {
    pub reference: FingerReference,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoseConfig {
    /// Scene units per normalized landmark unit (X and Y)
    pub scale: f32,
    /// Depth scale relative to `scale`
    pub depth_scale: f32,
    pub depth: DepthSign,
    /// One Euro smoothing of hand landmarks before mapping; off when `None`
    pub smoothing: Option<OneEuroParams>,
}

impl Default for PoseConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            depth_scale: 1.0,
            depth: DepthSign::Preserve,
            smoothing: None,
        }
    }
}

impl PoseConfig {
    pub fn convention(&self) -> CoordinateConvention {
        CoordinateConvention {
            depth: self.depth,
            depth_scale: self.depth_scale,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    pub blink: BlinkConfig,
    pub fingers: FingerConfig,
    pub pose: PoseConfig,
    pub mesh: MeshConfig,
    pub weapon: WeaponConfig,
    /// Frames that may wait for the next tick before pushes are refused
    pub queue_capacity: usize,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            blink: BlinkConfig::default(),
            fingers: FingerConfig::default(),
            pose: PoseConfig::default(),
            mesh: MeshConfig::default(),
            weapon: WeaponConfig::default(),
            queue_capacity: 64,
        }
    }
}

impl TrackingConfig {
    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> TrackingResult<Self> {
        let config: TrackingConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> TrackingResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> TrackingResult<()> {
        let fail = |msg: &str| Err(TrackingError::Config(msg.to_string()));

        if !(self.blink.threshold > 0.0) {
            return fail("blink.threshold must be positive");
        }
        if !(self.blink.cooldown_secs >= 0.0) {
            return fail("blink.cooldown_secs must not be negative");
        }
        if self.blink.buffer_size == 0 {
            return fail("blink.buffer_size must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.mesh.smoothing_factor) {
            return fail("mesh.smoothing_factor must be within [0, 1]");
        }
        if !(self.mesh.scale > 0.0) || !(self.pose.scale > 0.0) || !(self.pose.depth_scale > 0.0) {
            return fail("scales must be positive");
        }
        if !(self.weapon.follow_rate >= 0.0) {
            return fail("weapon.follow_rate must not be negative");
        }
        if self.queue_capacity == 0 {
            return fail("queue_capacity must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_is_default() {
        let config = TrackingConfig::from_json("{}").unwrap();
        assert_eq!(config, TrackingConfig::default());
        assert_eq!(config.blink.threshold, 0.25);
        assert_eq!(config.blink.buffer_size, 5);
        assert_eq!(config.mesh.scale, 100.0);
        assert_eq!(config.fingers.reference, FingerReference::Mcp);
    }

    #[test]
    fn test_partial_override() {
        let json = r#"{
            "pose": { "depth": "Invert", "smoothing": { "beta": 0.3 } },
            "fingers": { "reference": "Pip" },
            "weapon": { "offset": [0.0, 0.1, 0.0] }
        }"#;
        let config = TrackingConfig::from_json(json).unwrap();
        assert_eq!(config.pose.depth, DepthSign::Invert);
        assert_eq!(config.pose.scale, 1.0);
        let smoothing = config.pose.smoothing.unwrap();
        assert_eq!(smoothing.beta, 0.3);
        assert_eq!(smoothing.min_cutoff, 1.0);
        assert_eq!(config.fingers.reference, FingerReference::Pip);
        assert_eq!(config.weapon.offset, [0.0, 0.1, 0.0]);
    }

    #[test]
    fn test_round_trip() {
        let config = TrackingConfig::default();
        let back = TrackingConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn test_validation() {
        assert!(TrackingConfig::from_json(r#"{"blink": {"buffer_size": 0}}"#).is_err());
        assert!(TrackingConfig::from_json(r#"{"mesh": {"smoothing_factor": 1.5}}"#).is_err());
        assert!(TrackingConfig::from_json(r#"{"queue_capacity": 0}"#).is_err());
        assert!(matches!(
            TrackingConfig::from_json("not json"),
            Err(TrackingError::Config(_))
        ));
    }
}
