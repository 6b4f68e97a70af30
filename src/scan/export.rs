use std::io::Cursor;
use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::{TimewarpError, TimewarpResult};
use crate::source::Frame;

/// File name hosts use when offering the finished scan for download.
pub const DEFAULT_EXPORT_FILENAME: &str = "time-warp-scan.png";

/// Encode a frame as PNG bytes.
pub fn encode_png(frame: &Frame) -> TimewarpResult<Vec<u8>> {
    let img = image::RgbaImage::from_raw(frame.width, frame.height, frame.data.clone())
        .ok_or_else(|| {
            TimewarpError::encode(format!(
                "frame buffer does not match {}x{} rgba8",
                frame.width, frame.height
            ))
        })?;
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| TimewarpError::encode(format!("png encode failed: {e}")))?;
    Ok(buf)
}

/// Encode `frame` as PNG and write it to `path`, creating parent directories.
pub fn save_png(frame: &Frame, path: &Path) -> TimewarpResult<()> {
    let bytes = encode_png(frame)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write png '{}'", path.display()))?;
    tracing::info!(path = %path.display(), "wrote scan image");
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/scan/export.rs"]
mod tests;
