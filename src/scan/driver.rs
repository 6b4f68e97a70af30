use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::foundation::core::Bounds;
use crate::foundation::error::{TimewarpError, TimewarpResult};
use crate::scan::session::{ScanSession, ScanStatus, TickOutcome};
use crate::source::FrameSource;
use crate::surface::Surface;

/// Paces ticks to display refreshes.
pub trait RefreshClock {
    /// Block until the next refresh is due.
    fn wait_for_refresh(&mut self);
}

/// Wall-clock refresh at a fixed rate. Late refreshes are not made up for.
#[derive(Debug, Clone)]
pub struct FixedRateClock {
    interval: Duration,
    next: Option<Instant>,
}

impl FixedRateClock {
    pub fn new(hz: u32) -> TimewarpResult<Self> {
        if hz == 0 {
            return Err(TimewarpError::validation("refresh rate must be > 0 Hz"));
        }
        Ok(Self {
            interval: Duration::from_secs(1) / hz,
            next: None,
        })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for FixedRateClock {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1) / 60,
            next: None,
        }
    }
}

impl RefreshClock for FixedRateClock {
    fn wait_for_refresh(&mut self) {
        let now = Instant::now();
        let due = *self.next.get_or_insert(now);
        if due > now {
            std::thread::sleep(due - now);
        }
        self.next = Some(due.max(now) + self.interval);
    }
}

/// A clock that never waits; counts refreshes. Used to step scans deterministically.
#[derive(Debug, Default, Clone)]
pub struct ManualClock {
    refreshes: u64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refreshes(&self) -> u64 {
        self.refreshes
    }
}

impl RefreshClock for ManualClock {
    fn wait_for_refresh(&mut self) {
        self.refreshes += 1;
    }
}

/// Cancellation flag shared between a running scan and whoever may want to stop it.
///
/// Once set, any tick that was already pending is skipped and the session is aborted.
#[derive(Debug, Default, Clone)]
pub struct AbortHandle(Arc<AtomicBool>);

impl AbortHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Clear the flag so every clone of this handle can cancel the next scan.
    pub(crate) fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Host notifications emitted while a scan runs.
pub trait ScanObserver {
    /// A tick ran; `cursor` is the position after advancing.
    fn on_tick(&mut self, _cursor: u32) {}
    /// The scan finished; the image is ready for export.
    fn on_complete(&mut self, _bounds: Bounds) {}
    /// The scan was cancelled through its [`AbortHandle`].
    fn on_aborted(&mut self) {}
    /// A tick failed and the session was discarded.
    fn on_failed(&mut self, _err: &TimewarpError) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ScanObserver for NoopObserver {}

/// Drive `session` one tick per refresh until it completes, is aborted, or fails.
///
/// Ticks run strictly in order on the calling thread. The abort flag is checked after each
/// wait, right before the tick would run.
pub fn run_scan<F: FrameSource, S: Surface>(
    session: &mut ScanSession<F, S>,
    clock: &mut dyn RefreshClock,
    abort: &AbortHandle,
    observer: &mut dyn ScanObserver,
) -> TimewarpResult<ScanStatus> {
    loop {
        if session.status() != ScanStatus::Running {
            return Ok(session.status());
        }

        clock.wait_for_refresh();
        if abort.is_aborted() {
            session.abort();
            observer.on_aborted();
            return Ok(session.status());
        }

        match session.tick() {
            Ok(TickOutcome::Continue) => observer.on_tick(session.cursor()),
            Ok(TickOutcome::Completed) => {
                observer.on_tick(session.cursor());
                observer.on_complete(session.bounds());
                return Ok(ScanStatus::Complete);
            }
            Ok(TickOutcome::Idle) => return Ok(session.status()),
            Err(e) => {
                observer.on_failed(&e);
                return Err(e);
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scan/driver.rs"]
mod tests;
