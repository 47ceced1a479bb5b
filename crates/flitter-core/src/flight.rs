//! Procedural flight path for the single flying entity.
//!
//! A discrete damped spring pulls the entity toward a wandering target. The
//! order inside [`FlightController::step`] is fixed: accumulate attraction,
//! damp, then integrate position.

use std::f32::consts::{PI, TAU};

use glam::{Mat3, Quat, Vec3};
use tracing::debug;

use crate::config::FlightConfig;
use crate::random::RandomSource;

const LOOK_EPSILON: f32 = 1e-12;

/// Rotation that turns local +Z toward `direction` with `up` as the up
/// reference.
///
/// Returns `None` when `direction` is too short to define a heading. A
/// direction parallel to `up` is nudged so the basis stays well defined.
pub fn look_rotation(direction: Vec3, up: Vec3) -> Option<Quat> {
    if direction.length_squared() <= LOOK_EPSILON {
        return None;
    }
    let mut z = direction.normalize();
    let mut x = up.cross(z);
    if x.length_squared() <= LOOK_EPSILON {
        if (up.z.abs() - 1.0).abs() < f32::EPSILON {
            z.x += 0.0001;
        } else {
            z.z += 0.0001;
        }
        z = z.normalize();
        x = up.cross(z);
    }
    let x = x.normalize();
    let y = z.cross(x);
    Some(Quat::from_mat3(&Mat3::from_cols(x, y, z)).normalize())
}

#[derive(Debug, Clone)]
pub struct FlightController {
    config: FlightConfig,
    position: Vec3,
    velocity: Vec3,
    target: Vec3,
    time: f32,
    orientation: Quat,
    body_spin: f32,
}

impl FlightController {
    /// Starts at rest at the origin, targeting the origin.
    pub fn new(config: FlightConfig) -> Self {
        Self {
            config,
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            target: Vec3::ZERO,
            time: 0.0,
            orientation: Quat::IDENTITY,
            body_spin: 0.0,
        }
    }

    /// Advances the flight by one frame.
    pub fn step(&mut self, dt_nominal: f32, rng: &mut impl RandomSource) {
        self.time += dt_nominal;

        if rng.chance(self.config.resample_probability) {
            let half = self.config.target_half_extents;
            self.target = Vec3::new(
                rng.centered(half.x),
                rng.centered(half.y),
                rng.centered(half.z),
            );
            debug!(target = ?self.target, "Flight target resampled");
        }

        let bob = self.bob();
        self.velocity += (self.target + bob - self.position) * self.config.attraction;
        self.velocity *= self.config.damping;
        self.position += self.velocity;

        self.update_orientation();

        self.body_spin = (self.body_spin + self.config.spin_rate).rem_euclid(TAU);
    }

    /// Bob offset added to the target; z is never bobbed.
    pub fn bob(&self) -> Vec3 {
        let amplitude = self.config.bob_amplitude;
        Vec3::new(
            self.time.sin() * amplitude,
            (self.time * 1.5).cos() * amplitude,
            0.0,
        )
    }

    fn update_orientation(&mut self) {
        let look_at = self.position + self.velocity * self.config.look_ahead;
        if let Some(rotation) = look_rotation(look_at - self.position, Vec3::Y) {
            self.orientation = rotation;
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Overrides the steering target until the next resample.
    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    /// Heading derived from the velocity; unchanged while the entity is at rest.
    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    /// Body rotation about local X in `[0, 2π)`.
    pub fn body_spin(&self) -> f32 {
        self.body_spin
    }

    /// Left and right wing flap angles about local X, in opposite phase.
    pub fn wing_angles(&self) -> (f32, f32) {
        let phase = self.time * self.config.flap_frequency;
        (phase.sin(), (phase + PI).sin())
    }

    /// Pulsing opacity of the halo sprite.
    pub fn halo_opacity(&self) -> f32 {
        self.config.halo_base + (self.time * self.config.halo_frequency).sin() * self.config.halo_swing
    }

    pub fn config(&self) -> &FlightConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{ScriptedRandom, SeededRandom};

    fn never_resample() -> ScriptedRandom {
        ScriptedRandom::constant(0.5)
    }

    #[test]
    fn test_starts_at_rest() {
        let flight = FlightController::new(FlightConfig::default());
        assert_eq!(flight.position(), Vec3::ZERO);
        assert_eq!(flight.velocity(), Vec3::ZERO);
        assert_eq!(flight.orientation(), Quat::IDENTITY);
    }

    #[test]
    fn test_first_step_matches_hand_computation() {
        let config = FlightConfig::default();
        let mut flight = FlightController::new(config.clone());
        flight.step(0.05, &mut never_resample());

        let t = 0.05f32;
        let bob = Vec3::new(t.sin() * 0.5, (t * 1.5).cos() * 0.5, 0.0);
        let expected_velocity = bob * 0.005 * 0.96;
        assert!((flight.velocity() - expected_velocity).length() < 1e-7);
        assert!((flight.position() - expected_velocity).length() < 1e-7);
        assert!((flight.time() - 0.05).abs() < 1e-7);
    }

    #[test]
    fn test_resample_stays_in_box() {
        let mut flight = FlightController::new(FlightConfig::default());
        let mut rng = SeededRandom::from_seed(8);
        for _ in 0..5_000 {
            flight.step(0.05, &mut rng);
            let t = flight.target();
            assert!(t.x.abs() <= 4.0 && t.y.abs() <= 2.0 && t.z.abs() <= 1.5);
        }
    }

    #[test]
    fn test_resample_draws_from_box() {
        let mut flight = FlightController::new(FlightConfig::default());
        // Chance draw 0.0 triggers, then x, y, z draws of 1.0, 0.0 and 0.75.
        let mut rng = ScriptedRandom::new(vec![0.0, 1.0, 0.0, 0.75]);
        flight.step(0.05, &mut rng);
        assert_eq!(flight.target(), Vec3::new(4.0, -2.0, 0.75));
    }

    #[test]
    fn test_velocity_stays_bounded() {
        let mut flight = FlightController::new(FlightConfig::default());
        let mut rng = SeededRandom::from_seed(1234);
        let mut peak = 0.0f32;
        for _ in 0..20_000 {
            flight.step(0.05, &mut rng);
            let speed = flight.velocity().length();
            assert!(speed.is_finite());
            peak = peak.max(speed);
            assert!(flight.position().abs().max_element() < 20.0);
        }
        assert!(peak < 1.0, "peak speed {peak}");
    }

    #[test]
    fn test_converges_on_fixed_target_without_bob() {
        let config = FlightConfig {
            bob_amplitude: 0.0,
            resample_probability: 0.0,
            ..FlightConfig::default()
        };
        let mut flight = FlightController::new(config);
        flight.set_target(Vec3::new(1.0, -1.0, 0.5));
        let mut rng = never_resample();
        for _ in 0..5_000 {
            flight.step(0.05, &mut rng);
        }
        assert!((flight.position() - Vec3::new(1.0, -1.0, 0.5)).length() < 1e-3);
        assert!(flight.velocity().length() < 1e-4);
    }

    #[test]
    fn test_zero_velocity_keeps_orientation() {
        let config = FlightConfig {
            bob_amplitude: 0.0,
            resample_probability: 0.0,
            ..FlightConfig::default()
        };
        let mut flight = FlightController::new(config);
        flight.step(0.05, &mut never_resample());
        assert_eq!(flight.velocity(), Vec3::ZERO);
        assert_eq!(flight.orientation(), Quat::IDENTITY);
        assert!(flight.orientation().is_finite());
    }

    #[test]
    fn test_heading_follows_velocity() {
        let config = FlightConfig {
            bob_amplitude: 0.0,
            resample_probability: 0.0,
            ..FlightConfig::default()
        };
        let mut flight = FlightController::new(config);
        flight.set_target(Vec3::new(3.0, 0.0, 0.0));
        flight.step(0.05, &mut never_resample());
        let forward = flight.orientation() * Vec3::Z;
        assert!((forward - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn test_look_rotation_degenerate_cases() {
        assert!(look_rotation(Vec3::ZERO, Vec3::Y).is_none());
        let straight_up = look_rotation(Vec3::Y, Vec3::Y).unwrap();
        assert!(straight_up.is_finite());
        assert!(((straight_up * Vec3::Z) - Vec3::Y).length() < 1e-3);
    }

    #[test]
    fn test_body_spin_wraps() {
        let mut flight = FlightController::new(FlightConfig::default());
        let mut rng = never_resample();
        for _ in 0..1_000 {
            flight.step(0.05, &mut rng);
            assert!((0.0..TAU).contains(&flight.body_spin()));
        }
    }

    #[test]
    fn test_wings_flap_in_opposite_phase() {
        let mut flight = FlightController::new(FlightConfig::default());
        let mut rng = never_resample();
        for _ in 0..50 {
            flight.step(0.05, &mut rng);
            let (left, right) = flight.wing_angles();
            assert!((left + right).abs() < 1e-4);
        }
    }

    #[test]
    fn test_halo_pulse_range() {
        let mut flight = FlightController::new(FlightConfig::default());
        let mut rng = never_resample();
        for _ in 0..200 {
            flight.step(0.05, &mut rng);
            let halo = flight.halo_opacity();
            assert!((0.3 - 1e-6..=0.5 + 1e-6).contains(&halo));
        }
    }
}
