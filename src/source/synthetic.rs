use crate::foundation::core::Bounds;
use crate::foundation::error::{TimewarpError, TimewarpResult};
use crate::source::{Frame, FrameSource};

/// Deterministic animated test pattern standing in for a camera.
///
/// Every `current_frame` call advances the pattern by one step: diagonal color bands drift
/// right while a bright bar sweeps down, so each tick of a scan samples visibly different
/// content.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    bounds: Bounds,
    step: u64,
    acquired: bool,
    releases: u32,
}

impl SyntheticSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            bounds: Bounds::new(width, height),
            step: 0,
            acquired: false,
            releases: 0,
        }
    }

    /// Number of frames produced so far.
    pub fn frames_served(&self) -> u64 {
        self.step
    }

    /// Number of `release` calls that actually stopped the source.
    pub fn release_count(&self) -> u32 {
        self.releases
    }

    fn render(&self, step: u64) -> Vec<u8> {
        let (w, h) = (self.bounds.width, self.bounds.height);
        let bar_y = if h == 0 { 0 } else { (step % u64::from(h)) as u32 };
        let mut data = Vec::with_capacity(self.bounds.byte_len());
        for y in 0..h {
            let in_bar = y.abs_diff(bar_y) <= 1;
            for x in 0..w {
                let band = (u64::from(x) + u64::from(y) + step * 3) % 256;
                let r = band as u8;
                let g = ((u64::from(y) * 255) / u64::from(h.max(1))) as u8;
                let b = if in_bar { 255 } else { (255 - band) as u8 };
                data.extend_from_slice(&[r, g, b, 255]);
            }
        }
        data
    }
}

impl FrameSource for SyntheticSource {
    fn acquire(&mut self) -> TimewarpResult<()> {
        self.acquired = true;
        Ok(())
    }

    fn current_bounds(&self) -> Option<Bounds> {
        (self.acquired && !self.bounds.is_empty()).then_some(self.bounds)
    }

    fn current_frame(&mut self) -> TimewarpResult<Frame> {
        if !self.acquired {
            return Err(TimewarpError::frame("synthetic source is not acquired"));
        }
        let data = self.render(self.step);
        self.step = self.step.saturating_add(1);
        Frame::new(self.bounds.width, self.bounds.height, data)
    }

    fn release(&mut self) {
        if self.acquired {
            self.acquired = false;
            self.releases = self.releases.saturating_add(1);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/source/synthetic.rs"]
mod tests;
