//! Custom cursor: a wand pinned to the pointer and a light that trails it.
//!
//! Runs on its own event-driven cadence and shares nothing with the flight
//! or trail state.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::PointerConfig;

/// GSAP's default `power1.out`.
#[inline]
pub fn power1_out(t: f32) -> f32 {
    let inv = 1.0 - t.clamp(0.0, 1.0);
    1.0 - inv * inv
}

/// Values a [`Tween`] can interpolate.
pub trait Mix: Copy {
    fn mix(self, other: Self, t: f32) -> Self;
}

impl Mix for f32 {
    #[inline]
    fn mix(self, other: Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl Mix for Vec2 {
    #[inline]
    fn mix(self, other: Self, t: f32) -> Self {
        self.lerp(other, t)
    }
}

/// Eased interpolation from `from` to `to` over `duration` seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tween<T> {
    from: T,
    to: T,
    elapsed: f32,
    duration: f32,
}

impl<T: Mix> Tween<T> {
    pub fn new(from: T, to: T, duration: f32) -> Self {
        Self {
            from,
            to,
            elapsed: 0.0,
            duration: duration.max(0.0),
        }
    }

    /// A tween that is already at `value`.
    pub fn settled(value: T) -> Self {
        Self::new(value, value, 0.0)
    }

    pub fn value(&self) -> T {
        if self.is_finished() {
            return self.to;
        }
        self.from.mix(self.to, power1_out(self.elapsed / self.duration))
    }

    pub fn advance(&mut self, dt: f32) {
        self.elapsed = (self.elapsed + dt.max(0.0)).min(self.duration);
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Restarts toward `to` from wherever the tween currently is.
    pub fn retarget(&mut self, to: T, duration: f32) {
        *self = Self::new(self.value(), to, duration);
    }

    pub fn target(&self) -> T {
        self.to
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WandState {
    Idle,
    Glowing,
}

#[derive(Debug, Clone)]
pub struct PointerFollower {
    config: PointerConfig,
    wand: Vec2,
    light: Tween<Vec2>,
    tilt: Tween<f32>,
    state: WandState,
}

impl PointerFollower {
    pub fn new(config: PointerConfig) -> Self {
        Self {
            config,
            wand: Vec2::ZERO,
            light: Tween::settled(Vec2::ZERO),
            tilt: Tween::settled(0.0),
            state: WandState::Idle,
        }
    }

    /// Wand jumps to `position`; the light starts catching up.
    pub fn pointer_moved(&mut self, position: Vec2) {
        self.wand = position;
        self.light.retarget(position, self.config.light_lag_secs);
    }

    pub fn hover_entered(&mut self) {
        self.state = WandState::Glowing;
        self.tilt
            .retarget(self.config.hover_tilt_degrees.to_radians(), self.config.hover_tween_secs);
    }

    pub fn hover_left(&mut self) {
        self.state = WandState::Idle;
        self.tilt.retarget(0.0, self.config.hover_tween_secs);
    }

    /// Progresses both tweens by `dt_secs` of wall-clock time.
    pub fn advance(&mut self, dt_secs: f32) {
        self.light.advance(dt_secs);
        self.tilt.advance(dt_secs);
    }

    pub fn wand_position(&self) -> Vec2 {
        self.wand
    }

    pub fn light_position(&self) -> Vec2 {
        self.light.value()
    }

    /// Wand rotation in radians.
    pub fn wand_tilt(&self) -> f32 {
        self.tilt.value()
    }

    pub fn wand_state(&self) -> WandState {
        self.state
    }

    pub fn snapshot(&self) -> PointerSnapshot {
        PointerSnapshot {
            wand: self.wand,
            light: self.light_position(),
            tilt: self.wand_tilt(),
            state: self.state,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerSnapshot {
    pub wand: Vec2,
    pub light: Vec2,
    pub tilt: f32,
    pub state: WandState,
}
