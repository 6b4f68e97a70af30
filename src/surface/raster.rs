use crate::foundation::core::{Bounds, PixelRect, Rgba8};
use crate::foundation::error::{TimewarpError, TimewarpResult};
use crate::source::Frame;
use crate::surface::Surface;

/// CPU RGBA8 surface. Starts fully transparent.
#[derive(Clone, Debug)]
pub struct RasterSurface {
    bounds: Bounds,
    data: Vec<u8>,
}

impl RasterSurface {
    pub fn new(bounds: Bounds) -> TimewarpResult<Self> {
        if bounds.is_empty() {
            return Err(TimewarpError::validation(format!(
                "surface must be non-empty, got {}x{}",
                bounds.width, bounds.height
            )));
        }
        Ok(Self {
            bounds,
            data: vec![0u8; bounds.byte_len()],
        })
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8> {
        if x >= self.bounds.width || y >= self.bounds.height {
            return None;
        }
        let i = self.offset(x, y);
        Some(Rgba8::new(
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.bounds.width as usize) + (x as usize)) * 4
    }

    fn fill_clipped(&mut self, rect: PixelRect, px: [u8; 4]) {
        let Some(r) = rect.clip_to(self.bounds) else {
            return;
        };
        let row = px.repeat(r.width as usize);
        for y in r.y..r.bottom() {
            let start = self.offset(r.x as u32, y as u32);
            self.data[start..start + row.len()].copy_from_slice(&row);
        }
    }
}

impl Surface for RasterSurface {
    fn bounds(&self) -> Bounds {
        self.bounds
    }

    fn clear_rect(&mut self, rect: PixelRect) {
        self.fill_clipped(rect, [0, 0, 0, 0]);
    }

    fn fill_rect(&mut self, rect: PixelRect, color: Rgba8) {
        self.fill_clipped(rect, color.to_array());
    }

    fn draw_frame(&mut self, frame: &Frame, src: PixelRect, dst_x: i64, dst_y: i64) {
        // Clip the source against the frame, then shift the destination by however much
        // the source origin moved.
        if frame.data.len() != frame.bounds().byte_len() {
            tracing::warn!("skipping draw of malformed frame");
            return;
        }
        let requested = src;
        let Some(src) = requested.clip_to(frame.bounds()) else {
            return;
        };
        let dst = PixelRect::new(
            dst_x + (src.x - requested.x),
            dst_y + (src.y - requested.y),
            src.width,
            src.height,
        );
        let Some(clipped) = dst.clip_to(self.bounds) else {
            return;
        };
        let sx0 = src.x + (clipped.x - dst.x);
        let sy0 = src.y + (clipped.y - dst.y);
        let len = clipped.width as usize * 4;
        let frame_stride = frame.width as usize * 4;
        for row in 0..i64::from(clipped.height) {
            let s = ((sy0 + row) as usize) * frame_stride + (sx0 as usize) * 4;
            let d = self.offset(clipped.x as u32, (clipped.y + row) as u32);
            self.data[d..d + len].copy_from_slice(&frame.data[s..s + len]);
        }
    }

    fn snapshot(&self) -> Frame {
        Frame {
            width: self.bounds.width,
            height: self.bounds.height,
            data: self.data.clone(),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/surface/raster.rs"]
mod tests;
