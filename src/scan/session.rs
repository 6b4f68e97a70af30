use crate::foundation::core::{Bounds, PixelRect, ScanDirection};
use crate::foundation::error::{TimewarpError, TimewarpResult};
use crate::scan::export::encode_png;
use crate::scan::opts::ScanOpts;
use crate::source::lease::SourceLease;
use crate::source::{Frame, FrameSource};
use crate::surface::{RasterSurface, Surface};

/// Lifecycle of a [`ScanSession`]. `Complete` and `Discarded` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScanStatus {
    /// Ticks are still being processed.
    Running,
    /// The cursor swept past the far edge; the finished image is available.
    Complete,
    /// Aborted or failed before completion; no image is guaranteed.
    Discarded,
}

/// What the caller should do after a [`ScanSession::tick`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Schedule another tick.
    Continue,
    /// This tick finished the scan. Do not schedule another.
    Completed,
    /// The session was not running; nothing happened.
    Idle,
}

/// One slit-scan attempt: an output surface fixed to the source's bounds, a cursor sweeping
/// one pixel per tick along the chosen axis, and exclusive ownership of the live source.
///
/// Each tick resamples only the part of the live frame at or beyond the cursor, so pixels
/// behind it keep showing the moment the cursor passed them.
pub struct ScanSession<F: FrameSource, S: Surface = RasterSurface> {
    direction: ScanDirection,
    opts: ScanOpts,
    bounds: Bounds,
    cursor: u32,
    status: ScanStatus,
    ticks: u64,
    surface: S,
    lease: SourceLease<F>,
}

impl<F: FrameSource> ScanSession<F, RasterSurface> {
    /// Acquire `source` and start a session drawing onto a fresh CPU surface.
    pub fn start(direction: ScanDirection, source: F, opts: ScanOpts) -> TimewarpResult<Self> {
        Self::start_with_surface(direction, source, opts, RasterSurface::new)
    }
}

impl<F: FrameSource, S: Surface> ScanSession<F, S> {
    /// Acquire `source` and start a session on a surface built by `make_surface`.
    ///
    /// Every failure is reported as `Initialization`. If `acquire` fails nothing is released;
    /// if anything fails after a successful `acquire`, the source is released before
    /// returning.
    #[tracing::instrument(skip_all, fields(direction = %direction))]
    pub fn start_with_surface(
        direction: ScanDirection,
        mut source: F,
        opts: ScanOpts,
        make_surface: impl FnOnce(Bounds) -> TimewarpResult<S>,
    ) -> TimewarpResult<Self> {
        opts.validate()
            .map_err(|e| TimewarpError::initialization(e.to_string()))?;
        source
            .acquire()
            .map_err(|e| TimewarpError::initialization(e.to_string()))?;

        // From here on the source is held; the lease releases it on any early return.
        let lease = SourceLease::new(source);
        let bounds = match lease.bounds() {
            Some(b) if !b.is_empty() => b,
            Some(b) => {
                return Err(TimewarpError::initialization(format!(
                    "source bounds are empty ({}x{})",
                    b.width, b.height
                )));
            }
            None => {
                return Err(TimewarpError::initialization(
                    "source bounds are unavailable",
                ));
            }
        };
        let surface =
            make_surface(bounds).map_err(|e| TimewarpError::initialization(e.to_string()))?;
        if surface.bounds() != bounds {
            return Err(TimewarpError::initialization(format!(
                "surface is {}x{} but the source is {}x{}",
                surface.bounds().width,
                surface.bounds().height,
                bounds.width,
                bounds.height
            )));
        }

        tracing::debug!(
            width = bounds.width,
            height = bounds.height,
            "scan session started"
        );
        Ok(Self {
            direction,
            opts,
            bounds,
            cursor: 0,
            status: ScanStatus::Running,
            ticks: 0,
            surface,
            lease,
        })
    }

    pub fn direction(&self) -> ScanDirection {
        self.direction
    }

    pub fn opts(&self) -> &ScanOpts {
        &self.opts
    }

    /// Output surface dimensions, fixed at start.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Current cursor position along the scan axis.
    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    /// The cursor value the scan must pass to complete (width or height).
    pub fn bound(&self) -> u32 {
        self.direction.axis_len(self.bounds)
    }

    pub fn status(&self) -> ScanStatus {
        self.status
    }

    /// Number of ticks that did work.
    pub fn ticks_run(&self) -> u64 {
        self.ticks
    }

    pub fn is_source_released(&self) -> bool {
        self.lease.is_released()
    }

    pub fn source(&self) -> &F {
        self.lease.source()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Run one compositing step.
    ///
    /// Samples the unrevealed remainder of the live frame, erases the seam behind the cursor,
    /// paints the strip `paint_offset` pixels behind the cursor, draws the cursor line and
    /// advances the cursor by one. Once the cursor passes the far edge the source is released
    /// and `Completed` is returned. A no-op returning `Idle` unless the session is running.
    ///
    /// A failed frame read releases the source, discards the session and returns the error.
    pub fn tick(&mut self) -> TimewarpResult<TickOutcome> {
        if self.status != ScanStatus::Running {
            return Ok(TickOutcome::Idle);
        }

        let frame = match self.lease.current_frame() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(cursor = self.cursor, "frame read failed, discarding scan: {e}");
                self.status = ScanStatus::Discarded;
                self.lease.release();
                let detail = match e {
                    TimewarpError::Frame(msg) => msg,
                    other => other.to_string(),
                };
                return Err(TimewarpError::frame(format!(
                    "frame read failed at cursor {}: {detail}",
                    self.cursor
                )));
            }
        };

        self.composite(&frame);
        self.cursor = self.cursor.saturating_add(1);
        self.ticks = self.ticks.saturating_add(1);
        tracing::trace!(cursor = self.cursor, "tick");

        if self.cursor > self.bound() {
            self.status = ScanStatus::Complete;
            self.lease.release();
            tracing::debug!(ticks = self.ticks, "scan complete");
            return Ok(TickOutcome::Completed);
        }
        Ok(TickOutcome::Continue)
    }

    fn composite(&mut self, frame: &Frame) {
        let Bounds { width, height } = self.bounds;
        let c = i64::from(self.cursor);
        let seam = self.opts.seam_width;
        let offset = i64::from(self.opts.paint_offset);

        match self.direction {
            ScanDirection::Horizontal => {
                let strip = PixelRect::new(c, 0, width.saturating_sub(self.cursor), height);
                self.surface
                    .clear_rect(PixelRect::new(c - i64::from(seam), 0, seam, height));
                self.surface.draw_frame(frame, strip, c - offset, 0);
                if self.opts.draw_indicator {
                    self.surface
                        .fill_rect(PixelRect::new(c, 0, 1, height), self.opts.indicator());
                }
            }
            ScanDirection::Vertical => {
                let strip = PixelRect::new(0, c, width, height.saturating_sub(self.cursor));
                self.surface
                    .clear_rect(PixelRect::new(0, c - i64::from(seam), width, seam));
                self.surface.draw_frame(frame, strip, 0, c - offset);
                if self.opts.draw_indicator {
                    self.surface
                        .fill_rect(PixelRect::new(0, c, width, 1), self.opts.indicator());
                }
            }
        }
    }

    /// Raw pixels of the finished scan. Fails with `NotReady` unless `Complete`.
    pub fn finished_frame(&self) -> TimewarpResult<Frame> {
        match self.status {
            ScanStatus::Complete => Ok(self.surface.snapshot()),
            ScanStatus::Running => Err(TimewarpError::not_ready("scan is still running")),
            ScanStatus::Discarded => Err(TimewarpError::not_ready("scan was discarded")),
        }
    }

    /// PNG encoding of the finished scan. Fails with `NotReady` unless `Complete`.
    pub fn finished_image(&self) -> TimewarpResult<Vec<u8>> {
        encode_png(&self.finished_frame()?)
    }

    /// Stop the scan and release the source if it is still held.
    ///
    /// Safe from any state. A running session becomes `Discarded`; a completed one stays
    /// `Complete` and keeps its image.
    pub fn abort(&mut self) {
        if self.status == ScanStatus::Running {
            self.status = ScanStatus::Discarded;
            tracing::debug!(cursor = self.cursor, "scan aborted");
        }
        self.lease.release();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scan/session.rs"]
mod tests;
