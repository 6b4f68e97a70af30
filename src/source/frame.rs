use crate::foundation::core::{Bounds, Rgba8};
use crate::foundation::error::{TimewarpError, TimewarpResult};

/// A single visual frame as straight-alpha RGBA8 pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> TimewarpResult<Self> {
        let expected = Bounds::new(width, height).byte_len();
        if data.len() != expected {
            return Err(TimewarpError::frame(format!(
                "frame buffer has {} bytes, expected {expected} for {width}x{height}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// A frame filled with a single color.
    pub fn filled(bounds: Bounds, color: Rgba8) -> Self {
        Self {
            width: bounds.width,
            height: bounds.height,
            data: color.to_array().repeat(bounds.pixel_count()),
        }
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.width, self.height)
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        Some(Rgba8::new(
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ))
    }
}
