//! Abstract 2D drawing capability used by the compositor, plus the CPU raster implementation.

pub(crate) mod raster;

use crate::foundation::core::{Bounds, PixelRect, Rgba8};
use crate::source::Frame;

pub use raster::RasterSurface;

/// Persistent drawing target with 2D-canvas-like clipping.
///
/// Every operation clips silently to the surface; rectangles that fall entirely outside are
/// no-ops.
pub trait Surface {
    fn bounds(&self) -> Bounds;

    /// Reset pixels inside `rect` to fully transparent.
    fn clear_rect(&mut self, rect: PixelRect);

    /// Overwrite pixels inside `rect` with `color`.
    fn fill_rect(&mut self, rect: PixelRect, color: Rgba8);

    /// Copy the `src` region of `frame` so its top-left lands at `(dst_x, dst_y)`.
    ///
    /// Pixels are copied, not blended.
    fn draw_frame(&mut self, frame: &Frame, src: PixelRect, dst_x: i64, dst_y: i64);

    /// Copy of the current surface contents.
    fn snapshot(&self) -> Frame;
}
