//! Platform abstraction layer
//!
//! What the simulation thread needs from its host:
//! - Tilt samples (`TiltSource`)
//! - A surface to draw on (`RenderTarget`)
//! - Monotonic time (`Clock`)
//! - Visibility of the surface (`VisibilityQuery`)

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::SimError;
use crate::clock::TiltSink;
use crate::sim::FrameState;

/// Source of accelerometer readings.
///
/// Once subscribed, the source pushes `(x, y, millis)` readings into the sink
/// from whatever thread it likes. Both calls must tolerate repetition.
pub trait TiltSource: Send {
    fn subscribe(&mut self, sink: TiltSink);
    fn unsubscribe(&mut self);
}

/// Host without a tilt sensor
#[derive(Debug, Default)]
pub struct NoTilt;

impl TiltSource for NoTilt {
    fn subscribe(&mut self, _sink: TiltSink) {}
    fn unsubscribe(&mut self) {}
}

/// Drawing surface plus the renderer that paints a `FrameState` onto it.
///
/// `acquire` may return `None` while the surface is not ready; the tick is
/// then skipped. Every acquired drawable is handed back through `present`,
/// even when drawing fails.
pub trait RenderTarget: Send + 'static {
    type Drawable;

    fn acquire(&mut self) -> Option<Self::Drawable>;
    fn draw(&mut self, drawable: &mut Self::Drawable, frame: &FrameState) -> Result<(), SimError>;
    fn present(&mut self, drawable: Self::Drawable) -> Result<(), SimError>;
}

/// Monotonic millisecond time
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> u64;
}

/// Milliseconds since construction
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Whether the drawing surface is currently shown
pub trait VisibilityQuery: Send + Sync {
    fn is_visible(&self) -> bool;
}

impl<F> VisibilityQuery for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn is_visible(&self) -> bool {
        self()
    }
}

/// Visibility flag the host flips from its own thread
#[derive(Debug, Clone)]
pub struct Visibility(Arc<AtomicBool>);

impl Default for Visibility {
    fn default() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }
}

impl Visibility {
    pub fn set(&self, visible: bool) {
        self.0.store(visible, Ordering::Release);
    }
}

impl VisibilityQuery for Visibility {
    fn is_visible(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_flag_is_shared() {
        let vis = Visibility::default();
        let host = vis.clone();
        assert!(vis.is_visible());
        host.set(false);
        assert!(!vis.is_visible());
    }

    #[test]
    fn test_closure_visibility() {
        let hidden = || false;
        assert!(!hidden.is_visible());
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock::default();
        let a = clock.now_millis();
        std::thread::sleep(std::time::Duration::from_millis(2));
        assert!(clock.now_millis() >= a + 1);
    }
}
