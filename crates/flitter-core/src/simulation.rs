//! Per-frame driver tying the flight path, the trail and the pointer together.

use glam::Vec2;
use tracing::{info, trace};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::flight::FlightController;
use crate::frame::{EntityTransform, FrameSnapshot, FrameView};
use crate::pointer::PointerFollower;
use crate::random::{RandomSource, SeededRandom};
use crate::trail::ParticlePool;

/// All animation state, owned by whoever drives the frames.
pub struct Simulation<R: RandomSource = SeededRandom> {
    config: EngineConfig,
    flight: FlightController,
    trail: ParticlePool,
    pointer: PointerFollower,
    rng: R,
    frame: u64,
}

impl Simulation<SeededRandom> {
    /// Seeds from `config.seed`, or from entropy when unset.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let rng = SeededRandom::new(config.seed);
        Self::with_random(config, rng)
    }
}

impl<R: RandomSource> Simulation<R> {
    /// Validates `config` before building any state.
    pub fn with_random(config: EngineConfig, mut rng: R) -> Result<Self> {
        config.validate()?;
        let flight = FlightController::new(config.flight.clone());
        let trail = ParticlePool::new(config.preset.clone(), &mut rng);
        let pointer = PointerFollower::new(config.pointer.clone());
        info!(
            capacity = trail.capacity(),
            spawns_per_frame = config.preset.spawns_per_frame,
            seed = ?config.seed,
            "Simulation created"
        );
        Ok(Self {
            config,
            flight,
            trail,
            pointer,
            rng,
            frame: 0,
        })
    }

    /// Advances one frame: steer, spawn at the new position, age the trail.
    pub fn tick(&mut self) -> FrameView<'_> {
        self.flight.step(self.config.flight.time_step, &mut self.rng);
        self.trail.emit(self.flight.position(), &mut self.rng);
        self.trail.advance(self.config.preset.age_step);
        self.frame += 1;
        trace!(frame = self.frame, position = ?self.flight.position(), "Frame ticked");
        self.view()
    }

    /// Output for the current frame without advancing.
    pub fn view(&self) -> FrameView<'_> {
        FrameView {
            frame: self.frame,
            entity: self.entity(),
            positions: self.trail.positions_flat(),
            sizes: self.trail.sizes(),
            opacities: self.trail.opacities(),
            rotation_angles: self.trail.rotation_angles(),
            trail_color: self.config.preset.color,
            halo_color: self.config.flight.halo_color,
            pointer: self.pointer.snapshot(),
        }
    }

    pub fn snapshot(&self) -> FrameSnapshot {
        self.view().to_snapshot()
    }

    pub fn entity(&self) -> EntityTransform {
        let (left_wing, right_wing) = self.flight.wing_angles();
        EntityTransform {
            position: self.flight.position(),
            orientation: self.flight.orientation(),
            body_spin: self.flight.body_spin(),
            left_wing,
            right_wing,
            halo_opacity: self.flight.halo_opacity(),
        }
    }

    pub fn pointer_moved(&mut self, position: Vec2) {
        self.pointer.pointer_moved(position);
    }

    pub fn hover_changed(&mut self, hovering: bool) {
        if hovering {
            self.pointer.hover_entered();
        } else {
            self.pointer.hover_left();
        }
    }

    /// Advances the cursor tweens by measured seconds.
    pub fn advance_pointer(&mut self, dt_secs: f32) {
        self.pointer.advance(dt_secs);
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn flight(&self) -> &FlightController {
        &self.flight
    }

    pub fn trail(&self) -> &ParticlePool {
        &self.trail
    }

    pub fn pointer(&self) -> &PointerFollower {
        &self.pointer
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
