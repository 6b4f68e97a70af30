use crate::foundation::core::Bounds;
use crate::foundation::error::{TimewarpError, TimewarpResult};
use crate::source::{Frame, FrameSource};

/// Exclusive hold on an acquired [`FrameSource`].
///
/// `release` is forwarded to the source at most once, no matter how many of completion, abort,
/// failure or drop reach it. Reads after release are refused.
pub struct SourceLease<F: FrameSource> {
    source: F,
    released: bool,
}

impl<F: FrameSource> SourceLease<F> {
    /// Wrap a source that has already been acquired.
    pub(crate) fn new(source: F) -> Self {
        Self {
            source,
            released: false,
        }
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.source.current_bounds()
    }

    pub fn source(&self) -> &F {
        &self.source
    }

    pub(crate) fn current_frame(&mut self) -> TimewarpResult<Frame> {
        if self.released {
            return Err(TimewarpError::frame("source already released"));
        }
        self.source.current_frame()
    }

    /// Release the source if still held. Returns `true` when this call performed the release.
    pub(crate) fn release(&mut self) -> bool {
        if self.released {
            return false;
        }
        self.released = true;
        self.source.release();
        true
    }
}

impl<F: FrameSource> Drop for SourceLease<F> {
    fn drop(&mut self) {
        if self.release() {
            tracing::debug!("frame source released on teardown");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/lease.rs"]
mod tests;
