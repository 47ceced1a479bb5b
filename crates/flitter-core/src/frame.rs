//! What the simulation hands to the renderer each frame.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::pointer::PointerSnapshot;

/// Draw-order tiers, all rendered in one pass. Lower draws first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DrawLayer {
    Trail,
    Halo,
    Body,
}

impl DrawLayer {
    pub const ORDERED: [DrawLayer; 3] = [DrawLayer::Trail, DrawLayer::Halo, DrawLayer::Body];

    pub fn render_order(self) -> i32 {
        match self {
            DrawLayer::Trail => -1,
            DrawLayer::Halo => 0,
            DrawLayer::Body => 1,
        }
    }
}

/// Pose of the flying entity and its sub-parts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntityTransform {
    pub position: Vec3,
    pub orientation: Quat,
    /// Body rotation about local X.
    pub body_spin: f32,
    /// Wing pivot rotations about local X.
    pub left_wing: f32,
    pub right_wing: f32,
    pub halo_opacity: f32,
}

impl EntityTransform {
    /// Group transform: translation plus heading.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position)
    }

    pub fn body_matrix(&self) -> Mat4 {
        self.model_matrix() * Mat4::from_rotation_x(self.body_spin)
    }

    pub fn left_wing_matrix(&self) -> Mat4 {
        self.model_matrix() * Mat4::from_rotation_x(self.left_wing)
    }

    pub fn right_wing_matrix(&self) -> Mat4 {
        self.model_matrix() * Mat4::from_rotation_x(self.right_wing)
    }

    pub fn left_wing_orientation(&self) -> Quat {
        self.orientation * Quat::from_rotation_x(self.left_wing)
    }

    pub fn right_wing_orientation(&self) -> Quat {
        self.orientation * Quat::from_rotation_x(self.right_wing)
    }

    pub fn uniform(&self, halo_color: Vec4) -> EntityUniform {
        EntityUniform {
            body: self.body_matrix().to_cols_array_2d(),
            left_wing: self.left_wing_matrix().to_cols_array_2d(),
            right_wing: self.right_wing_matrix().to_cols_array_2d(),
            halo: [halo_color.x, halo_color.y, halo_color.z, self.halo_opacity * halo_color.w],
        }
    }
}

/// GPU layout of the entity pose.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct EntityUniform {
    pub body: [[f32; 4]; 4],
    pub left_wing: [[f32; 4]; 4],
    pub right_wing: [[f32; 4]; 4],
    /// Halo rgb with pulsed alpha.
    pub halo: [f32; 4],
}

/// Borrowed view of one frame's output.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pub frame: u64,
    pub entity: EntityTransform,
    /// `3 * capacity` floats.
    pub positions: &'a [f32],
    pub sizes: &'a [f32],
    pub opacities: &'a [f32],
    pub rotation_angles: &'a [f32],
    pub trail_color: Vec4,
    pub halo_color: Vec4,
    pub pointer: PointerSnapshot,
}

impl FrameView<'_> {
    pub fn particle_count(&self) -> usize {
        self.sizes.len()
    }

    pub fn active_particles(&self) -> usize {
        self.opacities.iter().filter(|&&o| o > 0.0).count()
    }

    pub fn to_snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            frame: self.frame,
            entity: self.entity,
            positions: self.positions.to_vec(),
            sizes: self.sizes.to_vec(),
            opacities: self.opacities.to_vec(),
            rotation_angles: self.rotation_angles.to_vec(),
            pointer: self.pointer,
        }
    }
}

/// Owned copy of a frame, for dumping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub frame: u64,
    pub entity: EntityTransform,
    pub positions: Vec<f32>,
    pub sizes: Vec<f32>,
    pub opacities: Vec<f32>,
    pub rotation_angles: Vec<f32>,
    pub pointer: PointerSnapshot,
}
