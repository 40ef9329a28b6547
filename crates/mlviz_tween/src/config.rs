//! Engine configuration presets.

use crate::easing::Easing;
use crate::error::{Result, TweenError};
use serde::{Deserialize, Serialize};

/// Configuration for a [`TweenEngine`](crate::TweenEngine).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum number of simultaneously active tasks.
    pub capacity: usize,
    /// Easing used by constructors that don't name one.
    pub default_easing: Easing,
    /// Upper bound for a single frame delta, in seconds (after a stall or window drag).
    pub max_frame_dt: Option<f32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl EngineConfig {
    /// Standard configuration: room for every point of a dataset plus camera and UI tweens.
    pub fn standard() -> Self {
        Self {
            capacity: 1024,
            default_easing: Easing::EaseOutQuad,
            max_frame_dt: None,
        }
    }

    /// Small pool for scenes that only animate the camera and a few labels.
    pub fn minimal() -> Self {
        Self {
            capacity: 64,
            default_easing: Easing::EaseOutQuad,
            max_frame_dt: Some(0.25),
        }
    }

    /// Testing configuration with a tiny pool so exhaustion is easy to reach.
    pub fn testing() -> Self {
        Self {
            capacity: 8,
            default_easing: Easing::Linear,
            max_frame_dt: None,
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_default_easing(mut self, easing: Easing) -> Self {
        self.default_easing = easing;
        self
    }

    pub fn with_max_frame_dt(mut self, max_frame_dt: f32) -> Self {
        self.max_frame_dt = Some(max_frame_dt);
        self
    }

    /// Parse and validate a TOML document
    ///
    /// Missing keys fall back to [`EngineConfig::standard`].
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(source)?;
        config.validate()?;
        tracing::debug!(?config, "loaded tween engine config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(TweenError::InvalidConfig(
                "capacity must be at least 1".to_string(),
            ));
        }
        if let Some(max) = self.max_frame_dt {
            if !max.is_finite() || max <= 0.0 {
                return Err(TweenError::InvalidConfig(format!(
                    "max_frame_dt must be a positive number of seconds, got {max}"
                )));
            }
        }
        Ok(())
    }
}
