//! Tunable constants for the flight path, the smoke trail and the pointer.
//!
//! Every field has a default matching the stock landing page, so an empty
//! TOML document is a valid configuration.

use std::ops::Range;
use std::path::Path;

use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ConfigError, Result};

/// Steering and body-animation parameters for the flying entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightConfig {
    /// Nominal time added per step. Not wall-clock time.
    pub time_step: f32,
    /// Per-step probability of picking a new steering target.
    pub resample_probability: f32,
    /// Half extents of the box targets are drawn from, centered at origin.
    pub target_half_extents: Vec3,
    /// Amplitude of the sine/cosine bob added to the target on x and y.
    pub bob_amplitude: f32,
    pub attraction: f32,
    pub damping: f32,
    /// How far along the velocity the entity looks when deriving its heading.
    pub look_ahead: f32,
    /// Body spin about local X, radians per step.
    pub spin_rate: f32,
    /// Wing flap frequency as a multiple of accumulated time.
    pub flap_frequency: f32,
    pub halo_base: f32,
    pub halo_swing: f32,
    pub halo_frequency: f32,
    pub halo_color: Vec4,
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            time_step: 0.05,
            resample_probability: 0.01,
            target_half_extents: Vec3::new(4.0, 2.0, 1.5),
            bob_amplitude: 0.5,
            attraction: 0.005,
            damping: 0.96,
            look_ahead: 10.0,
            spin_rate: 0.1,
            flap_frequency: 20.0,
            halo_base: 0.4,
            halo_swing: 0.1,
            halo_frequency: 3.0,
            halo_color: Vec4::new(1.0, 0.667, 0.0, 1.0),
        }
    }
}

impl FlightConfig {
    /// Rejects parameters that would make the damped spring diverge.
    ///
    /// For `v' = d(v + k(t - x))`, `x' = x + v'` the iteration is stable iff
    /// `0 < d < 1` and `0 < k < 2(1 + d) / d`.
    pub fn validate(&self) -> Result<()> {
        if !(self.damping > 0.0 && self.damping < 1.0) {
            return Err(ConfigError::invalid(
                "flight.damping",
                format!("must be in (0, 1), got {}", self.damping),
            ));
        }
        let limit = 2.0 * (1.0 + self.damping) / self.damping;
        if !(self.attraction > 0.0 && self.attraction < limit) {
            return Err(ConfigError::invalid(
                "flight.attraction",
                format!("must be in (0, {limit}), got {}", self.attraction),
            ));
        }
        if !(0.0..=1.0).contains(&self.resample_probability) {
            return Err(ConfigError::invalid(
                "flight.resample_probability",
                format!("must be in [0, 1], got {}", self.resample_probability),
            ));
        }
        if self.target_half_extents.min_element() < 0.0 || !self.target_half_extents.is_finite() {
            return Err(ConfigError::invalid(
                "flight.target_half_extents",
                "must be finite and non-negative",
            ));
        }
        if !(self.time_step.is_finite() && self.time_step >= 0.0) {
            return Err(ConfigError::invalid(
                "flight.time_step",
                format!("must be finite and non-negative, got {}", self.time_step),
            ));
        }
        Ok(())
    }
}

/// Smoke trail pool parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrailPreset {
    pub name: String,
    /// Number of slots in the ring buffer.
    pub capacity: usize,
    pub spawns_per_frame: usize,
    /// Nominal age added to each live particle per frame.
    pub age_step: f32,
    pub spawn_opacity: f32,
    /// Full width of the per-axis drift distribution (drift is centered on zero).
    pub drift_spread: f32,
    pub color: Vec4,
    pub life_span: Range<f32>,
    pub growth_rate: Range<f32>,
    pub size: Range<f32>,
}

impl Default for TrailPreset {
    fn default() -> Self {
        Self {
            name: "Smoke".into(),
            capacity: 400,
            spawns_per_frame: 2,
            age_step: 0.02,
            spawn_opacity: 0.6,
            drift_spread: 0.01,
            color: Vec4::new(0.02, 0.02, 0.02, 1.0),
            life_span: 2.0..3.0,
            growth_rate: 0.02..0.04,
            size: 1.0..2.0,
        }
    }
}

impl TrailPreset {
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(ConfigError::invalid("trail.capacity", "must be at least 1"));
        }
        // A zero spawn opacity would leave fresh slots dark but off the sentinel.
        if !(self.spawn_opacity > 0.0 && self.spawn_opacity <= 1.0) {
            return Err(ConfigError::invalid(
                "trail.spawn_opacity",
                format!("must be in (0, 1], got {}", self.spawn_opacity),
            ));
        }
        if !(self.age_step.is_finite() && self.age_step >= 0.0) {
            return Err(ConfigError::invalid(
                "trail.age_step",
                format!("must be finite and non-negative, got {}", self.age_step),
            ));
        }
        check_range("trail.life_span", &self.life_span)?;
        if self.life_span.start <= 0.0 {
            return Err(ConfigError::invalid("trail.life_span", "must start above zero"));
        }
        check_range("trail.growth_rate", &self.growth_rate)?;
        check_range("trail.size", &self.size)?;
        if self.size.start < 0.0 {
            return Err(ConfigError::invalid("trail.size", "must not be negative"));
        }
        Ok(())
    }
}

fn check_range(field: &'static str, range: &Range<f32>) -> Result<()> {
    if !(range.start.is_finite() && range.end.is_finite()) || range.start > range.end {
        return Err(ConfigError::invalid(
            field,
            format!("expected finite start <= end, got {}..{}", range.start, range.end),
        ));
    }
    Ok(())
}

/// Custom cursor parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointerConfig {
    /// Seconds the light takes to catch up with the pointer.
    pub light_lag_secs: f32,
    pub hover_tilt_degrees: f32,
    pub hover_tween_secs: f32,
}

impl Default for PointerConfig {
    fn default() -> Self {
        Self {
            light_lag_secs: 0.15,
            hover_tilt_degrees: 15.0,
            hover_tween_secs: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fixed RNG seed; entropy when absent.
    pub seed: Option<u64>,
    pub flight: FlightConfig,
    #[serde(rename = "trail")]
    pub preset: TrailPreset,
    pub pointer: PointerConfig,
}

impl EngineConfig {
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&source)?;
        info!(
            "Loaded config from {} (trail preset {:?}, {} slots)",
            path.display(),
            config.preset.name,
            config.preset.capacity
        );
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.flight.validate()?;
        self.preset.validate()?;
        if self.pointer.light_lag_secs < 0.0 || self.pointer.hover_tween_secs < 0.0 {
            return Err(ConfigError::invalid("pointer", "tween durations must not be negative"));
        }
        debug!("Config validated");
        Ok(())
    }
}
