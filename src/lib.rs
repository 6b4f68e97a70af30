//! Timewarp builds slit-scan ("time-warp") images from a live camera feed.
//!
//! Instead of capturing one instant, the output is assembled one column (or row) per display
//! refresh: a cursor sweeps across the picture, and every pixel behind it keeps showing the
//! video as it was when the cursor passed.
//!
//! # Pieces
//!
//! - [`FrameSource`]: the live capture device (camera via `ffmpeg`, or the built-in
//!   [`SyntheticSource`]). Acquired once, sampled once per tick, released exactly once.
//! - [`Surface`]: the persistent drawing target; [`RasterSurface`] is the CPU implementation.
//! - [`ScanSession`]: the compositor state machine. [`ScanSession::tick`] is its only mutator.
//! - [`run_scan`]: drives a session one tick per [`RefreshClock`] refresh, honoring an
//!   [`AbortHandle`].
//! - [`Scanner`]: host-side flow (choose direction, start, download, try again, close).
//!
//! # Example
//!
//! ```no_run
//! use timewarp::{AbortHandle, FixedRateClock, NoopObserver, ScanDirection, ScanOpts,
//!     ScanSession, SyntheticSource, run_scan};
//!
//! # fn main() -> timewarp::TimewarpResult<()> {
//! let mut session = ScanSession::start(
//!     ScanDirection::Horizontal,
//!     SyntheticSource::new(320, 240),
//!     ScanOpts::default(),
//! )?;
//! run_scan(&mut session, &mut FixedRateClock::new(60)?, &AbortHandle::new(), &mut NoopObserver)?;
//! std::fs::write("time-warp-scan.png", session.finished_image()?).map_err(anyhow::Error::from)?;
//! # Ok(())
//! # }
//! ```
#![forbid(unsafe_code)]

mod foundation;
mod host;
mod scan;
mod source;
mod surface;

pub use foundation::core::{Bounds, PixelRect, Rgba8, ScanDirection};
pub use foundation::error::{TimewarpError, TimewarpResult};
pub use host::scanner::{ScanView, Scanner};
pub use scan::driver::{
    AbortHandle, FixedRateClock, ManualClock, NoopObserver, RefreshClock, ScanObserver, run_scan,
};
pub use scan::export::{DEFAULT_EXPORT_FILENAME, encode_png, save_png};
pub use scan::opts::ScanOpts;
pub use scan::session::{ScanSession, ScanStatus, TickOutcome};
pub use source::ffmpeg::{FfmpegInput, FfmpegSource, is_ffmpeg_on_path};
pub use source::synthetic::SyntheticSource;
pub use source::{Frame, FrameSource};
pub use surface::{RasterSurface, Surface};
