//! Simulation thread
//!
//! One dedicated thread owns the tick-and-draw loop. Other threads talk to it
//! through:
//! - `SimulationHandle`: commands, pause/resume, completion callback
//! - `TiltSink`: single-slot mailbox for the latest tilt reading
//!
//! The loop runs at a fixed period and never runs extra ticks to catch up.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::platform::{Clock, RenderTarget, SystemClock, TiltSource, VisibilityQuery};
use crate::sim::{FrameState, ScrollDirection, Simulation, TickInput, TiltSample};
use crate::{SimError, Settings};

type AnimationEndCallback = Box<dyn FnMut() + Send>;

/// Lock a mutex, recovering the data if a panicking tick poisoned it
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Holds only the newest unread tilt sample
#[derive(Debug, Default)]
struct TiltMailbox {
    slot: Mutex<Option<TiltSample>>,
}

impl TiltMailbox {
    fn put(&self, sample: TiltSample) {
        *lock(&self.slot) = Some(sample);
    }

    fn take(&self) -> Option<TiltSample> {
        lock(&self.slot).take()
    }
}

/// Where a `TiltSource` delivers readings. Cheap to clone.
#[derive(Debug, Clone)]
pub struct TiltSink {
    mailbox: Arc<TiltMailbox>,
}

impl TiltSink {
    /// Replace any unread sample with this one
    pub fn push(&self, x: f32, y: f32, time_ms: u64) {
        self.mailbox.put(TiltSample::new(x, y, time_ms));
    }
}

struct Shared {
    sim: Mutex<Simulation>,
    mailbox: Arc<TiltMailbox>,
    paused: AtomicBool,
    running: AtomicBool,
    latest: Mutex<Option<FrameState>>,
    on_animation_end: Mutex<Option<AnimationEndCallback>>,
}

impl Shared {
    fn new(sim: Simulation) -> Self {
        Self {
            sim: Mutex::new(sim),
            mailbox: Arc::new(TiltMailbox::default()),
            paused: AtomicBool::new(false),
            running: AtomicBool::new(false),
            latest: Mutex::new(None),
            on_animation_end: Mutex::new(None),
        }
    }

    /// Run the callback without holding its lock, so it may replace itself
    /// or issue commands.
    fn fire_animation_end(&self) {
        let Some(callback) = lock(&self.on_animation_end).take() else {
            return;
        };
        let mut running = RunningCallback {
            slot: &self.on_animation_end,
            callback: Some(callback),
        };
        if let Some(callback) = running.callback.as_mut() {
            callback();
        }
    }
}

/// A callback taken out of its slot; goes back on drop, also when it panicked
struct RunningCallback<'a> {
    slot: &'a Mutex<Option<AnimationEndCallback>>,
    callback: Option<AnimationEndCallback>,
}

impl Drop for RunningCallback<'_> {
    fn drop(&mut self) {
        let mut slot = lock(self.slot);
        // Replaced from inside the callback: keep the replacement
        if slot.is_none() {
            *slot = self.callback.take();
        }
    }
}

/// Command interface for host threads. Cheap to clone.
#[derive(Clone)]
pub struct SimulationHandle {
    shared: Arc<Shared>,
}

impl SimulationHandle {
    /// Animate the level to `fraction`
    pub fn command_animated(&self, fraction: f32) -> Result<(), SimError> {
        lock(&self.shared.sim).command_animated(fraction)
    }

    /// Set the level to `fraction` without animation
    pub fn command_immediate(&self, fraction: f32) -> Result<(), SimError> {
        lock(&self.shared.sim).command_immediate(fraction)
    }

    pub fn command_correctness(&self, correct: bool) {
        lock(&self.shared.sim).command_correctness(correct);
    }

    pub fn set_direction_hint(&self, direction: ScrollDirection) {
        lock(&self.shared.sim).set_direction_hint(direction);
    }

    pub fn set_show_tips(&self, show: bool) {
        lock(&self.shared.sim).set_show_tips(show);
    }

    pub fn show_tips(&self) -> bool {
        lock(&self.shared.sim).show_tips()
    }

    pub fn set_water_color(&self, color: u32) {
        lock(&self.shared.sim).set_water_color(color);
    }

    pub fn set_background_color(&self, color: u32) {
        lock(&self.shared.sim).set_background_color(color);
    }

    /// Called on the simulation thread when a commanded level is reached
    pub fn set_on_animation_end<F>(&self, callback: F)
    where
        F: FnMut() + Send + 'static,
    {
        *lock(&self.shared.on_animation_end) = Some(Box::new(callback));
    }

    pub fn clear_on_animation_end(&self) {
        *lock(&self.shared.on_animation_end) = None;
    }

    pub fn pause(&self) {
        self.shared.paused.store(true, Ordering::Release);
        log::debug!("Simulation paused");
    }

    pub fn resume(&self) {
        self.shared.paused.store(false, Ordering::Release);
        log::debug!("Simulation resumed");
    }

    pub fn is_paused(&self) -> bool {
        self.shared.paused.load(Ordering::Acquire)
    }

    /// Most recently drawn frame
    pub fn latest_frame(&self) -> Option<FrameState> {
        lock(&self.shared.latest).clone()
    }

    pub fn tilt_sink(&self) -> TiltSink {
        TiltSink {
            mailbox: Arc::clone(&self.shared.mailbox),
        }
    }
}

/// Owns the simulation thread and its collaborators
pub struct SimulationClock<T: RenderTarget> {
    shared: Arc<Shared>,
    /// Parked here while the thread is not running
    target: Option<T>,
    tilt_source: Box<dyn TiltSource>,
    visibility: Arc<dyn VisibilityQuery>,
    clock: Arc<dyn Clock>,
    period: Duration,
    worker: Option<JoinHandle<T>>,
}

impl<T: RenderTarget> SimulationClock<T> {
    pub fn new(
        simulation: Simulation,
        target: T,
        tilt_source: impl TiltSource + 'static,
        visibility: impl VisibilityQuery + 'static,
        period: Duration,
    ) -> Self {
        Self {
            shared: Arc::new(Shared::new(simulation)),
            target: Some(target),
            tilt_source: Box::new(tilt_source),
            visibility: Arc::new(visibility),
            clock: Arc::new(SystemClock::default()),
            period,
            worker: None,
        }
    }

    pub fn from_settings(
        settings: &Settings,
        target: T,
        tilt_source: impl TiltSource + 'static,
        visibility: impl VisibilityQuery + 'static,
    ) -> Result<Self, SimError> {
        let simulation = Simulation::from_settings(settings)?;
        Ok(Self::new(
            simulation,
            target,
            tilt_source,
            visibility,
            settings.tick_period(),
        ))
    }

    /// Use a different time source for pacing
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn handle(&self) -> SimulationHandle {
        SimulationHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Subscribe to tilt and start the loop. Does nothing if already running.
    pub fn start(&mut self) -> Result<(), SimError> {
        if self.worker.is_some() {
            return Ok(());
        }
        let Some(target) = self.target.take() else {
            return Err(SimError::Render("render target was lost".to_string()));
        };

        self.tilt_source.subscribe(self.handle().tilt_sink());
        self.shared.running.store(true, Ordering::Release);

        let shared = Arc::clone(&self.shared);
        let visibility = Arc::clone(&self.visibility);
        let clock = Arc::clone(&self.clock);
        let period = self.period;

        let spawned = thread::Builder::new()
            .name("water-sim".to_string())
            .spawn(move || run_loop(shared, target, visibility, clock, period));

        match spawned {
            Ok(worker) => {
                self.worker = Some(worker);
                log::info!("Simulation thread started ({} ms ticks)", period.as_millis());
                Ok(())
            }
            Err(e) => {
                self.shared.running.store(false, Ordering::Release);
                self.tilt_source.unsubscribe();
                Err(e.into())
            }
        }
    }

    /// Unsubscribe from tilt, end the loop and park the level. Does nothing if
    /// not running.
    pub fn stop(&mut self) -> Result<(), SimError> {
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };

        self.tilt_source.unsubscribe();
        self.shared.running.store(false, Ordering::Release);

        let joined = worker.join();
        lock(&self.shared.sim).park();

        match joined {
            Ok(target) => {
                self.target = Some(target);
                log::info!("Simulation thread stopped");
                Ok(())
            }
            Err(_) => Err(SimError::ThreadPanicked),
        }
    }

    pub fn pause(&self) {
        self.handle().pause();
    }

    pub fn resume(&self) {
        self.handle().resume();
    }

    /// Give back the render target; only available while stopped
    pub fn into_target(mut self) -> Option<T> {
        if self.stop().is_err() {
            return None;
        }
        self.target.take()
    }
}

impl<T: RenderTarget> Drop for SimulationClock<T> {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            log::warn!("Simulation did not stop cleanly: {e}");
        }
    }
}

/// Presents the drawable when dropped, whatever happened while drawing
struct PresentGuard<'a, T: RenderTarget> {
    target: &'a mut T,
    drawable: Option<T::Drawable>,
}

impl<'a, T: RenderTarget> PresentGuard<'a, T> {
    fn new(target: &'a mut T, drawable: T::Drawable) -> Self {
        Self {
            target,
            drawable: Some(drawable),
        }
    }

    fn draw(&mut self, frame: &FrameState) -> Result<(), SimError> {
        match self.drawable.as_mut() {
            Some(drawable) => self.target.draw(drawable, frame),
            None => Ok(()),
        }
    }

    fn present(mut self) -> Result<(), SimError> {
        match self.drawable.take() {
            Some(drawable) => self.target.present(drawable),
            None => Ok(()),
        }
    }
}

impl<T: RenderTarget> Drop for PresentGuard<'_, T> {
    fn drop(&mut self) {
        if let Some(drawable) = self.drawable.take() {
            if let Err(e) = self.target.present(drawable) {
                log::warn!("Present failed: {e}");
            }
        }
    }
}

fn run_loop<T: RenderTarget>(
    shared: Arc<Shared>,
    mut target: T,
    visibility: Arc<dyn VisibilityQuery>,
    clock: Arc<dyn Clock>,
    period: Duration,
) -> T {
    while shared.running.load(Ordering::Acquire) {
        let started = clock.now_millis();

        if !shared.paused.load(Ordering::Acquire) {
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                step(&shared, &mut target, visibility.is_visible())
            }));
            match result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => log::warn!("Render error: {e}"),
                Err(_) => log::error!("Simulation tick panicked, continuing"),
            }
        }

        let elapsed = Duration::from_millis(clock.now_millis().saturating_sub(started));
        match period.checked_sub(elapsed) {
            Some(rest) => thread::sleep(rest),
            None => log::debug!("Tick overran by {} ms", (elapsed - period).as_millis()),
        }
    }
    target
}

/// One tick: acquire, simulate, draw, present
fn step<T: RenderTarget>(shared: &Shared, target: &mut T, visible: bool) -> Result<(), SimError> {
    let Some(drawable) = target.acquire() else {
        log::trace!("Render target not ready, skipping tick");
        return Ok(());
    };
    let mut guard = PresentGuard::new(target, drawable);

    let input = TickInput {
        visible,
        tilt: shared.mailbox.take(),
    };
    let report = lock(&shared.sim).tick(&input);

    if report.animation_ended {
        shared.fire_animation_end();
    }

    *lock(&shared.latest) = Some(report.frame.clone());
    guard.draw(&report.frame)?;
    guard.present()
}
