use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, TryRecvError};
use tracing::{debug, info};

use crate::{FrameControl, FrameScheduler, FrameTick, HostEvent, Result};

/// Calls back at a fixed cadence on the calling thread.
///
/// Host events are drained from `events` before every frame; a
/// [`HostEvent::Stop`] or a disconnected channel with `stop_on_disconnect`
/// ends the loop without another callback.
pub struct FixedRateScheduler {
    interval: Duration,
    events: Receiver<HostEvent>,
    max_frames: Option<u64>,
    stop_on_disconnect: bool,
}

impl FixedRateScheduler {
    pub fn new(interval: Duration, events: Receiver<HostEvent>) -> Self {
        Self {
            interval,
            events,
            max_frames: None,
            stop_on_disconnect: false,
        }
    }

    /// Cadence for `rate` frames per second.
    pub fn with_rate(rate: f32, events: Receiver<HostEvent>) -> Self {
        let interval = if rate > 0.0 {
            Duration::from_secs_f32(1.0 / rate)
        } else {
            Duration::ZERO
        };
        Self::new(interval, events)
    }

    pub fn max_frames(mut self, frames: u64) -> Self {
        self.max_frames = Some(frames);
        self
    }

    pub fn stop_on_disconnect(mut self, stop: bool) -> Self {
        self.stop_on_disconnect = stop;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns `None` when the loop should end.
    fn drain_events(&self) -> Option<Vec<HostEvent>> {
        let mut events = Vec::new();
        loop {
            match self.events.try_recv() {
                Ok(HostEvent::Stop) => {
                    info!("Scheduler: stop requested by host");
                    return None;
                }
                Ok(event) => events.push(event),
                Err(TryRecvError::Empty) => return Some(events),
                Err(TryRecvError::Disconnected) => {
                    if self.stop_on_disconnect {
                        debug!("Scheduler: event channel closed");
                        return None;
                    }
                    return Some(events);
                }
            }
        }
    }
}

impl FrameScheduler for FixedRateScheduler {
    fn run(&mut self, on_frame: &mut dyn FnMut(&FrameTick) -> FrameControl) -> Result<()> {
        let mut index = 0u64;
        let mut last = Instant::now();
        info!("Scheduler: running at {:?} per frame", self.interval);

        loop {
            if self.max_frames.is_some_and(|max| index >= max) {
                info!("Scheduler: frame limit {} reached", index);
                break;
            }
            let Some(events) = self.drain_events() else {
                break;
            };

            let now = Instant::now();
            let tick = FrameTick {
                index,
                elapsed: now.duration_since(last),
                events,
            };
            last = now;

            if on_frame(&tick) == FrameControl::Stop {
                info!("Scheduler: callback withdrew at frame {}", index);
                break;
            }
            index += 1;

            let spent = last.elapsed();
            if spent < self.interval {
                thread::sleep(self.interval - spent);
            }
        }
        Ok(())
    }
}
