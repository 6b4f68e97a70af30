//! Frame Source Adapter: the boundary between a live capture device and the compositor.
//!
//! A source is acquired once, queried for its bounds, sampled once per tick, and released
//! exactly once. [`SourceLease`] enforces the release-once rule on behalf of a session.

pub(crate) mod ffmpeg;
pub(crate) mod frame;
pub(crate) mod lease;
pub(crate) mod synthetic;

use crate::foundation::core::Bounds;
use crate::foundation::error::TimewarpResult;

pub use frame::Frame;

/// Contract the compositor requires from a live capture device.
pub trait FrameSource {
    /// Open the underlying device. Fails with `SourceUnavailable` when it cannot be opened.
    fn acquire(&mut self) -> TimewarpResult<()>;

    /// Dimensions of the live frame, available once acquired.
    fn current_bounds(&self) -> Option<Bounds>;

    /// Snapshot of the most recent frame at the moment of the call.
    fn current_frame(&mut self) -> TimewarpResult<Frame>;

    /// Stop the underlying device. Must be idempotent.
    fn release(&mut self);
}

impl<F: FrameSource + ?Sized> FrameSource for Box<F> {
    fn acquire(&mut self) -> TimewarpResult<()> {
        (**self).acquire()
    }

    fn current_bounds(&self) -> Option<Bounds> {
        (**self).current_bounds()
    }

    fn current_frame(&mut self) -> TimewarpResult<Frame> {
        (**self).current_frame()
    }

    fn release(&mut self) {
        (**self).release()
    }
}
