use std::path::Path;

use anyhow::Context as _;

use crate::foundation::core::Rgba8;
use crate::foundation::error::{TimewarpError, TimewarpResult};

/// Tuning for the per-tick compositing step.
///
/// The defaults reproduce the classic look: each strip is painted two pixels behind the
/// cursor and a one pixel seam behind the cursor is erased first, which hides gaps caused by
/// uneven refresh timing.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanOpts {
    /// Distance (pixels) behind the cursor at which each sampled strip is painted.
    pub paint_offset: u32,
    /// Width (pixels) of the seam erased immediately behind the cursor.
    pub seam_width: u32,
    /// Color of the one pixel cursor line (straight RGBA8).
    pub indicator_rgba: [u8; 4],
    /// Draw the cursor line at all.
    pub draw_indicator: bool,
}

impl Default for ScanOpts {
    fn default() -> Self {
        Self {
            paint_offset: 2,
            seam_width: 1,
            indicator_rgba: [0, 0, 0, 255],
            draw_indicator: true,
        }
    }
}

impl ScanOpts {
    /// Load options from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> TimewarpResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read scan options '{}'", path.display()))?;
        let opts: Self = serde_json::from_str(&text)
            .map_err(|e| TimewarpError::validation(format!("parse scan options: {e}")))?;
        opts.validate()?;
        Ok(opts)
    }

    pub fn indicator(&self) -> Rgba8 {
        Rgba8::from(self.indicator_rgba)
    }

    /// Reject combinations that would leave permanent unpainted lines in the output.
    pub fn validate(&self) -> TimewarpResult<()> {
        if self.paint_offset < self.seam_width {
            return Err(TimewarpError::validation(format!(
                "paint_offset ({}) must be >= seam_width ({})",
                self.paint_offset, self.seam_width
            )));
        }
        if self.draw_indicator && self.paint_offset == 0 {
            return Err(TimewarpError::validation(
                "paint_offset must be >= 1 when the cursor indicator is drawn",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scan/opts.rs"]
mod tests;
