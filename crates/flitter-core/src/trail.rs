//! Fixed-capacity smoke trail.
//!
//! The pool is a ring buffer of particle slots stored as parallel attribute
//! arrays, so a point renderer can upload them without repacking. Spawning
//! always overwrites the slot under the cursor, live or not; nothing is
//! allocated after construction.

use std::f32::consts::{PI, TAU};

use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::TrailPreset;
use crate::random::RandomSource;

/// Where retired particles are parked, well outside the camera frustum.
pub const SENTINEL_POSITION: Vec3 = Vec3::new(9999.0, 0.0, 0.0);

/// Per-slot state the renderer never sees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotMotion {
    pub age: f32,
    pub life_span: f32,
    pub drift: Vec3,
    pub growth_rate: f32,
}

/// Read-only copy of one slot, for inspection and tests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub position: Vec3,
    pub size: f32,
    pub opacity: f32,
    pub rotation_angle: f32,
    pub motion: SlotMotion,
}

impl Particle {
    /// Live slots are exactly the ones with nonzero opacity.
    pub fn is_active(&self) -> bool {
        self.opacity > 0.0
    }
}

#[derive(Debug, Clone)]
pub struct ParticlePool {
    preset: TrailPreset,
    positions: Vec<Vec3>,
    sizes: Vec<f32>,
    opacities: Vec<f32>,
    angles: Vec<f32>,
    motion: Vec<SlotMotion>,
    next: usize,
}

impl ParticlePool {
    /// Builds a pool with every slot inactive. Initial rotation angles are
    /// drawn from `[0, π)`.
    ///
    /// A zero capacity is bumped to one slot; use [`TrailPreset::validate`]
    /// to reject it up front.
    pub fn new(preset: TrailPreset, rng: &mut impl RandomSource) -> Self {
        let capacity = preset.capacity.max(1);
        let angles = (0..capacity).map(|_| rng.in_range(0.0..PI)).collect();
        Self {
            preset,
            positions: vec![SENTINEL_POSITION; capacity],
            sizes: vec![0.0; capacity],
            opacities: vec![0.0; capacity],
            angles,
            motion: vec![SlotMotion::default(); capacity],
            next: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.positions.len()
    }

    /// Index the next spawn will overwrite.
    #[inline]
    pub fn cursor(&self) -> usize {
        self.next
    }

    /// Overwrites the slot under the cursor with a fresh particle at `origin`
    /// and returns its index.
    pub fn spawn(&mut self, origin: Vec3, rng: &mut impl RandomSource) -> usize {
        let idx = self.next;
        let half_drift = self.preset.drift_spread * 0.5;

        self.positions[idx] = origin;
        self.angles[idx] = rng.in_range(0.0..TAU);
        self.motion[idx] = SlotMotion {
            drift: Vec3::new(
                rng.centered(half_drift),
                rng.centered(half_drift),
                rng.centered(half_drift),
            ),
            age: 0.0,
            life_span: rng.in_range(self.preset.life_span.clone()),
            growth_rate: rng.in_range(self.preset.growth_rate.clone()),
        };
        self.sizes[idx] = rng.in_range(self.preset.size.clone());
        self.opacities[idx] = self.preset.spawn_opacity;

        self.next = (self.next + 1) % self.capacity();
        idx
    }

    /// Spawns `spawns_per_frame` particles at `origin`.
    pub fn emit(&mut self, origin: Vec3, rng: &mut impl RandomSource) {
        for _ in 0..self.preset.spawns_per_frame {
            self.spawn(origin, rng);
        }
    }

    /// Ages every live slot by `dt`, retiring the ones past their life span.
    pub fn advance(&mut self, dt: f32) {
        let spawn_opacity = self.preset.spawn_opacity;
        let mut retired = 0usize;

        for i in 0..self.capacity() {
            if self.opacities[i] <= 0.0 {
                continue;
            }
            let motion = &mut self.motion[i];
            self.positions[i] += motion.drift;
            motion.age += dt;
            let life_ratio = motion.age / motion.life_span;

            self.sizes[i] += motion.growth_rate;
            self.opacities[i] = spawn_opacity * (1.0 - life_ratio);

            // A zero life span gives an infinite or NaN ratio; retire it too.
            if life_ratio >= 1.0 || !life_ratio.is_finite() {
                self.opacities[i] = 0.0;
                self.positions[i] = SENTINEL_POSITION;
                retired += 1;
            }
        }

        if retired > 0 {
            trace!(retired, "Trail slots retired");
        }
    }

    /// Returns every slot to its inactive state and rewinds the cursor.
    pub fn reset(&mut self) {
        self.positions.fill(SENTINEL_POSITION);
        self.sizes.fill(0.0);
        self.opacities.fill(0.0);
        self.motion.fill(SlotMotion::default());
        self.next = 0;
    }

    pub fn active_count(&self) -> usize {
        self.opacities.iter().filter(|&&o| o > 0.0).count()
    }

    pub fn slot(&self, index: usize) -> Option<Particle> {
        Some(Particle {
            position: *self.positions.get(index)?,
            size: self.sizes[index],
            opacity: self.opacities[index],
            rotation_angle: self.angles[index],
            motion: self.motion[index],
        })
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Positions as `3 * capacity` packed floats.
    pub fn positions_flat(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn sizes(&self) -> &[f32] {
        &self.sizes
    }

    pub fn opacities(&self) -> &[f32] {
        &self.opacities
    }

    pub fn rotation_angles(&self) -> &[f32] {
        &self.angles
    }
}
