//! Headless stand-in for the GPU renderer: builds the same per-frame draw
//! data a real backend would upload and logs a summary of it.

use std::path::{Path, PathBuf};

use flitter_core::{DrawLayer, FrameView};
use flitter_platform::{FrameRenderer, Result, Viewport};
use glam::{Mat4, Vec3, Vec4};
use tracing::{debug, info, warn};

const FOV_Y_DEGREES: f32 = 45.0;
const NEAR: f32 = 0.1;
const FAR: f32 = 100.0;
const CAMERA_Z: f32 = 10.0;

/// A texture the renderer would sample. Missing files fall back to untextured drawing.
#[derive(Debug)]
struct TextureSlot {
    name: &'static str,
    path: Option<PathBuf>,
    ready: bool,
}

impl TextureSlot {
    fn new(name: &'static str, asset_dir: Option<&Path>) -> Self {
        Self {
            name,
            path: asset_dir.map(|dir| dir.join(name)),
            ready: false,
        }
    }

    fn resolve(&mut self) {
        self.ready = self.path.as_deref().is_some_and(Path::exists);
        if !self.ready {
            warn!("Texture {} unavailable; drawing without it", self.name);
        }
    }
}

/// Per-frame numbers a real backend would care about.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DrawStats {
    pub visible_particles: usize,
    pub uploaded_bytes: usize,
}

pub struct LogRenderer {
    viewport: Viewport,
    projection: Mat4,
    view: Mat4,
    textures: Vec<TextureSlot>,
    log_every: u64,
    frames: u64,
    last_stats: DrawStats,
}

impl LogRenderer {
    pub fn new(viewport: Viewport, asset_dir: Option<&Path>, log_every: u64) -> Self {
        let textures = ["smoke.png", "body.png", "glow.png"]
            .into_iter()
            .map(|name| TextureSlot::new(name, asset_dir))
            .collect();
        Self {
            viewport,
            projection: projection_for(viewport),
            view: Mat4::look_at_rh(Vec3::new(0.0, 0.0, CAMERA_Z), Vec3::ZERO, Vec3::Y),
            textures,
            log_every: log_every.max(1),
            frames: 0,
            last_stats: DrawStats::default(),
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn last_stats(&self) -> DrawStats {
        self.last_stats
    }

    /// Live particles whose centers land inside the clip volume.
    fn visible_particles(&self, frame: &FrameView<'_>) -> usize {
        let view_projection = self.projection * self.view;
        frame
            .positions
            .chunks_exact(3)
            .zip(frame.opacities)
            .filter(|(_, opacity)| **opacity > 0.0)
            .filter(|(p, _)| {
                let clip = view_projection * Vec4::new(p[0], p[1], p[2], 1.0);
                clip.w > 0.0
                    && clip.x.abs() <= clip.w
                    && clip.y.abs() <= clip.w
                    && clip.z.abs() <= clip.w
            })
            .count()
    }
}

fn projection_for(viewport: Viewport) -> Mat4 {
    Mat4::perspective_rh_gl(FOV_Y_DEGREES.to_radians(), viewport.aspect(), NEAR, FAR)
}

impl FrameRenderer for LogRenderer {
    fn init(&mut self) -> Result<()> {
        for texture in &mut self.textures {
            texture.resolve();
        }
        info!(
            "Renderer ready at {}x{} ({} of {} textures)",
            self.viewport.width,
            self.viewport.height,
            self.textures.iter().filter(|t| t.ready).count(),
            self.textures.len()
        );
        Ok(())
    }

    fn render_frame(&mut self, frame: &FrameView<'_>) -> Result<()> {
        let mut uploaded = 0usize;
        for layer in DrawLayer::ORDERED {
            uploaded += match layer {
                DrawLayer::Trail => {
                    std::mem::size_of_val(frame.positions)
                        + std::mem::size_of_val(frame.sizes)
                        + std::mem::size_of_val(frame.opacities)
                        + std::mem::size_of_val(frame.rotation_angles)
                        + bytemuck::bytes_of(&frame.trail_color).len()
                }
                DrawLayer::Halo => bytemuck::bytes_of(&frame.halo_color).len(),
                DrawLayer::Body => bytemuck::bytes_of(&frame.entity.uniform(frame.halo_color)).len(),
            };
        }

        self.last_stats = DrawStats {
            visible_particles: self.visible_particles(frame),
            uploaded_bytes: uploaded,
        };
        self.frames += 1;

        if self.frames % self.log_every == 0 {
            let p = frame.entity.position;
            info!(
                "frame {}: entity ({:.2}, {:.2}, {:.2}), {} live / {} visible particles, halo {:.2}",
                frame.frame,
                p.x,
                p.y,
                p.z,
                frame.active_particles(),
                self.last_stats.visible_particles,
                frame.entity.halo_opacity
            );
        }
        Ok(())
    }

    fn resize(&mut self, viewport: Viewport) -> Result<()> {
        if viewport.width == 0 || viewport.height == 0 {
            return Err(format!("cannot render into {}x{}", viewport.width, viewport.height).into());
        }
        self.viewport = viewport;
        self.projection = projection_for(viewport);
        debug!(
            "Renderer resized to {}x{} (aspect {:.3})",
            viewport.width,
            viewport.height,
            viewport.aspect()
        );
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        for texture in &mut self.textures {
            texture.ready = false;
        }
        info!("Renderer released after {} frames", self.frames);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flitter_core::{EngineConfig, Simulation};

    fn simulation() -> Simulation {
        Simulation::new(EngineConfig {
            seed: Some(4),
            ..EngineConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_renders_without_textures() {
        let mut renderer = LogRenderer::new(Viewport::default(), None, 1);
        renderer.init().unwrap();
        let mut sim = simulation();
        for _ in 0..30 {
            let view = sim.tick();
            renderer.render_frame(&view).unwrap();
        }
        let stats = renderer.last_stats();
        assert!(stats.visible_particles > 0);
        assert!(stats.visible_particles <= 60);
        assert_eq!(stats.uploaded_bytes, 400 * 6 * 4 + 16 + 16 + 208);
        renderer.release().unwrap();
    }

    #[test]
    fn test_sentinel_particles_are_culled() {
        let mut renderer = LogRenderer::new(Viewport::default(), None, 1);
        let mut sim = simulation();
        let view = sim.tick();
        renderer.render_frame(&view).unwrap();
        assert_eq!(renderer.last_stats().visible_particles, 2);
    }

    #[test]
    fn test_resize_updates_viewport() {
        let mut renderer = LogRenderer::new(Viewport::default(), None, 1);
        renderer.resize(Viewport::new(800, 800)).unwrap();
        assert_eq!(renderer.viewport().aspect(), 1.0);
        assert!(renderer.resize(Viewport::new(0, 10)).is_err());
        assert_eq!(renderer.viewport(), Viewport::new(800, 800));
    }
}
