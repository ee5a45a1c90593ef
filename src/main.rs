//! Water Bottle demo entry point
//!
//! Runs the simulation headless: a scripted rocking tilt source feeds the
//! sensor mailbox and every few frames the bottle is logged as text.
//!
//! Usage: `water-bottle [settings.json]`

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use water_bottle::platform::{RenderTarget, TiltSource, Visibility};
use water_bottle::renderer::{WaterScene, ascii};
use water_bottle::sim::FrameState;
use water_bottle::{SimError, SimulationClock, Settings, TiltSink};

/// Log one frame in this many
const LOG_EVERY: u64 = 15;
const GRID_COLS: usize = 24;
const GRID_ROWS: usize = 16;

/// Render target that rasterises to text and logs it
struct LogTarget {
    width: f32,
    height: f32,
    last_tick: u64,
}

impl RenderTarget for LogTarget {
    type Drawable = String;

    fn acquire(&mut self) -> Option<String> {
        Some(String::with_capacity(GRID_ROWS * (GRID_COLS + 1)))
    }

    fn draw(&mut self, drawable: &mut String, frame: &FrameState) -> Result<(), SimError> {
        self.last_tick = frame.tick;
        if frame.tick % LOG_EVERY != 0 {
            return Ok(());
        }
        let scene = WaterScene::from_frame(frame);
        drawable.push_str(&format!(
            "tick {} fill {:.2} angle {:.1} amp {:.2}\n",
            frame.tick, frame.fill, frame.rotation_deg, frame.amplitude
        ));
        drawable.push_str(&ascii::render(
            &scene,
            self.width,
            self.height,
            GRID_COLS,
            GRID_ROWS,
        ));
        Ok(())
    }

    fn present(&mut self, drawable: String) -> Result<(), SimError> {
        if !drawable.is_empty() {
            log::info!("\n{drawable}");
        }
        Ok(())
    }
}

/// Pretends the device is being rocked side to side
#[derive(Default)]
struct RockingTilt {
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl TiltSource for RockingTilt {
    fn subscribe(&mut self, sink: TiltSink) {
        if self.worker.is_some() {
            return;
        }
        self.stop.store(false, Ordering::Release);
        let stop = Arc::clone(&self.stop);
        self.worker = Some(thread::spawn(move || {
            let origin = Instant::now();
            while !stop.load(Ordering::Acquire) {
                let t = origin.elapsed().as_secs_f32();
                let x = 7.0 * (t * 0.8).sin();
                let y = 9.8 * (t * 0.8).cos().abs();
                sink.push(x, y, origin.elapsed().as_millis() as u64);
                thread::sleep(Duration::from_millis(20));
            }
        }));
        log::info!("Tilt source subscribed");
    }

    fn unsubscribe(&mut self) {
        if let Some(worker) = self.worker.take() {
            self.stop.store(true, Ordering::Release);
            if worker.join().is_err() {
                log::warn!("Tilt thread panicked");
            }
            log::info!("Tilt source unsubscribed");
        }
    }
}

fn main() -> Result<(), SimError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Water Bottle (headless) starting...");

    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load_or_default(Path::new(&path)),
        None => Settings::default(),
    };

    let target = LogTarget {
        width: settings.container_width,
        height: settings.container_height,
        last_tick: 0,
    };
    let visibility = Visibility::default();
    let mut clock =
        SimulationClock::from_settings(&settings, target, RockingTilt::default(), visibility)?;
    let handle = clock.handle();

    handle.set_on_animation_end(|| log::info!("Water animation finished"));
    handle.set_show_tips(true);
    handle.command_animated(0.7)?;
    clock.start()?;
    thread::sleep(Duration::from_secs(5));

    // Tap the bottle a few times
    let seed = 0xB0_77_1E;
    let mut rng = Pcg32::seed_from_u64(seed);
    handle.set_show_tips(false);
    for _ in 0..3 {
        let fraction: f32 = rng.random();
        log::info!("Refill to {:.0}%", fraction * 100.0);
        handle.command_animated(fraction)?;
        thread::sleep(Duration::from_secs(4));
    }

    handle.pause();
    thread::sleep(Duration::from_millis(500));
    handle.resume();
    handle.command_correctness(false);
    thread::sleep(Duration::from_secs(1));

    clock.stop()?;
    if let Some(target) = clock.into_target() {
        log::info!("Stopped after {} ticks", target.last_tick);
    }
    Ok(())
}
