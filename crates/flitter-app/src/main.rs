use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use crossbeam_channel::Sender;
use flitter_core::{EngineConfig, Simulation};
use flitter_platform::{
    FixedRateScheduler, FrameControl, FrameRenderer, FrameScheduler, FrameTick, HostEvent, Result,
    Viewport,
};
use glam::Vec2;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod renderer;

use crate::renderer::LogRenderer;

const USAGE: &str = "usage: flitter [--config FILE] [--frames N] [--fps RATE] [--seed N] \
[--assets DIR] [--dump FILE] [--log-every N] [--no-pointer]";

#[derive(Debug)]
struct Options {
    config: Option<PathBuf>,
    frames: Option<u64>,
    fps: f32,
    seed: Option<u64>,
    assets: Option<PathBuf>,
    dump: Option<PathBuf>,
    log_every: u64,
    pointer_demo: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            config: None,
            frames: Some(600),
            fps: 60.0,
            seed: None,
            assets: None,
            dump: None,
            log_every: 60,
            pointer_demo: true,
        }
    }
}

impl Options {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let mut options = Self::default();
        while let Some(flag) = args.next() {
            let mut value = || args.next().ok_or_else(|| format!("{flag} needs a value\n{USAGE}"));
            match flag.as_str() {
                "--config" => options.config = Some(value()?.into()),
                "--frames" => {
                    let frames: u64 = value()?.parse()?;
                    options.frames = (frames > 0).then_some(frames);
                }
                "--fps" => options.fps = value()?.parse()?,
                "--seed" => options.seed = Some(value()?.parse()?),
                "--assets" => options.assets = Some(value()?.into()),
                "--dump" => options.dump = Some(value()?.into()),
                "--log-every" => options.log_every = value()?.parse()?,
                "--no-pointer" => options.pointer_demo = false,
                "-h" | "--help" => return Err(USAGE.into()),
                other => return Err(format!("unknown argument {other}\n{USAGE}").into()),
            }
        }
        Ok(options)
    }
}

/// Sweeps a fake pointer in a circle, toggling hover now and then, until the
/// scheduler hangs up.
fn spawn_pointer_demo(events: Sender<HostEvent>, viewport: Viewport) {
    thread::spawn(move || {
        let center = Vec2::new(viewport.width as f32, viewport.height as f32) * 0.5;
        let radius = center.min_element() * 0.6;
        let mut step = 0u32;
        loop {
            let angle = step as f32 * 0.05;
            let p = center + Vec2::new(angle.cos(), angle.sin()) * radius;
            if events.send(HostEvent::PointerMoved { x: p.x, y: p.y }).is_err() {
                break;
            }
            if step % 90 == 0 && events.send(HostEvent::HoverChanged(step % 180 == 0)).is_err() {
                break;
            }
            step = step.wrapping_add(1);
            thread::sleep(Duration::from_millis(25));
        }
    });
}

fn run_app() -> Result<()> {
    let options = Options::parse(std::env::args().skip(1))?;

    let mut config = match &options.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if options.seed.is_some() {
        config.seed = options.seed;
    }

    let viewport = Viewport::default();
    let mut simulation = Simulation::new(config)?;
    let mut renderer = LogRenderer::new(viewport, options.assets.as_deref(), options.log_every);
    renderer.init()?;

    let (event_sender, event_receiver) = crossbeam_channel::unbounded();
    let mut scheduler = FixedRateScheduler::with_rate(options.fps, event_receiver);
    if let Some(frames) = options.frames {
        scheduler = scheduler.max_frames(frames);
    }
    if options.pointer_demo {
        spawn_pointer_demo(event_sender.clone(), viewport);
    }

    scheduler.run(&mut |tick: &FrameTick| {
        for event in &tick.events {
            match *event {
                HostEvent::Resized(viewport) => {
                    if let Err(e) = renderer.resize(viewport) {
                        warn!("Resize ignored: {e}");
                    }
                }
                HostEvent::PointerMoved { x, y } => simulation.pointer_moved(Vec2::new(x, y)),
                HostEvent::HoverChanged(hovering) => simulation.hover_changed(hovering),
                HostEvent::Stop => return FrameControl::Stop,
            }
        }
        simulation.advance_pointer(tick.elapsed.as_secs_f32());

        let frame = simulation.tick();
        if let Err(e) = renderer.render_frame(&frame) {
            warn!("Frame {} not rendered: {e}", frame.frame);
        }
        FrameControl::Continue
    })?;
    // Closing the receiver is what ends the pointer demo thread.
    drop(scheduler);
    drop(event_sender);

    renderer.release()?;

    if let Some(path) = &options.dump {
        let json = serde_json::to_string_pretty(&simulation.snapshot())?;
        std::fs::write(path, json)?;
        info!("Wrote frame {} snapshot to {}", simulation.frame(), path.display());
    }
    Ok(())
}

fn main() {
    // Init logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    info!("Flitter starting");
    if let Err(e) = run_app() {
        eprintln!("Flitter error: {e}");
        std::process::exit(1);
    }
}
