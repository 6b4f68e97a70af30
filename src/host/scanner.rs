use std::path::{Path, PathBuf};

use crate::foundation::core::ScanDirection;
use crate::foundation::error::{TimewarpError, TimewarpResult};
use crate::scan::driver::{AbortHandle, RefreshClock, ScanObserver, run_scan};
use crate::scan::export::{DEFAULT_EXPORT_FILENAME, save_png};
use crate::scan::opts::ScanOpts;
use crate::scan::session::{ScanSession, ScanStatus};
use crate::source::FrameSource;

/// What the host is currently showing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanView {
    /// Direction picker; no scan open.
    Idle,
    /// A scan is in progress.
    Scanning,
    /// A scan finished; export and retry are offered.
    Complete,
}

/// Host controller owning at most one scan session at a time.
///
/// Opening a new scan always discards the previous session and its surface. Failed or
/// aborted scans close the view and return to [`ScanView::Idle`].
pub struct Scanner<F: FrameSource> {
    direction: ScanDirection,
    opts: ScanOpts,
    session: Option<ScanSession<F>>,
    abort: AbortHandle,
}

impl<F: FrameSource> Default for Scanner<F> {
    fn default() -> Self {
        Self::new(ScanOpts::default())
    }
}

impl<F: FrameSource> Scanner<F> {
    pub fn new(opts: ScanOpts) -> Self {
        Self {
            direction: ScanDirection::default(),
            opts,
            session: None,
            abort: AbortHandle::new(),
        }
    }

    pub fn direction(&self) -> ScanDirection {
        self.direction
    }

    /// Pick the direction for the next scan. Refused while a scan view is open.
    pub fn select_direction(&mut self, direction: ScanDirection) -> TimewarpResult<()> {
        if self.session.is_some() {
            return Err(TimewarpError::validation(
                "close the current scan before changing direction",
            ));
        }
        self.direction = direction;
        Ok(())
    }

    pub fn view(&self) -> ScanView {
        match self.session.as_ref().map(ScanSession::status) {
            Some(ScanStatus::Running) => ScanView::Scanning,
            Some(ScanStatus::Complete) => ScanView::Complete,
            Some(ScanStatus::Discarded) | None => ScanView::Idle,
        }
    }

    pub fn session(&self) -> Option<&ScanSession<F>> {
        self.session.as_ref()
    }

    /// Handle that cancels the open scan.
    ///
    /// The same flag serves every scan this host opens: `open` clears it and `close` sets it,
    /// so a handle taken earlier still cancels a later scan.
    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    /// Start a scan with `source`. On failure the view stays closed and the error is returned.
    pub fn open(&mut self, source: F) -> TimewarpResult<()> {
        self.close();
        self.abort.reset();
        match ScanSession::start(self.direction, source, self.opts.clone()) {
            Ok(session) => {
                self.session = Some(session);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("scan could not start, closing view: {e}");
                Err(e)
            }
        }
    }

    /// Drive the open scan until it completes, is aborted, or fails.
    ///
    /// Anything other than completion closes the view.
    pub fn run(
        &mut self,
        clock: &mut dyn RefreshClock,
        observer: &mut dyn ScanObserver,
    ) -> TimewarpResult<ScanStatus> {
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| TimewarpError::validation("no scan is open"))?;
        let result = run_scan(session, clock, &self.abort, observer);
        if !matches!(result, Ok(ScanStatus::Complete)) {
            self.close();
        }
        result
    }

    /// Write the finished scan to `path` as PNG. The view stays open.
    pub fn export_to(&self, path: &Path) -> TimewarpResult<()> {
        let session = self
            .session
            .as_ref()
            .ok_or_else(|| TimewarpError::not_ready("no scan is open"))?;
        save_png(&session.finished_frame()?, path)
    }

    /// Save the finished scan as `time-warp-scan.png` inside `dir`, then close the view.
    pub fn download(&mut self, dir: &Path) -> TimewarpResult<PathBuf> {
        let path = dir.join(DEFAULT_EXPORT_FILENAME);
        self.export_to(&path)?;
        self.close();
        Ok(path)
    }

    /// Discard the current scan (if any) and start a fresh one with `source`.
    pub fn try_new_scanning(&mut self, source: F) -> TimewarpResult<()> {
        self.open(source)
    }

    /// Discard the current scan, releasing its source. Harmless when nothing is open.
    pub fn close(&mut self) {
        self.abort.abort();
        if let Some(mut session) = self.session.take() {
            session.abort();
        }
    }
}

impl<F: FrameSource> Drop for Scanner<F> {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/scanner.rs"]
mod tests;
