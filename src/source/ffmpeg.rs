use std::path::{Path, PathBuf};
use std::process::Child;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::foundation::core::Bounds;
use crate::foundation::error::{TimewarpError, TimewarpResult};
use crate::source::{Frame, FrameSource};

/// How long `current_frame` waits for the first decoded frame after `acquire`.
const FIRST_FRAME_TIMEOUT: Duration = Duration::from_secs(5);

/// Default age after which the newest frame no longer counts as live.
const STALE_FRAME_TIMEOUT: Duration = Duration::from_secs(2);

/// Where an [`FfmpegSource`] reads its pictures from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FfmpegInput {
    /// A V4L2 capture device such as `/dev/video0`.
    Camera { device: PathBuf },
    /// A video file, played in real time and looped.
    File { path: PathBuf },
}

impl FfmpegInput {
    fn path(&self) -> &Path {
        match self {
            Self::Camera { device } => device,
            Self::File { path } => path,
        }
    }
}

#[derive(Default)]
struct Latest {
    frame: Option<Frame>,
    seq: u64,
    received: Option<Instant>,
    ended: Option<String>,
}

/// Newest decoded frame, shared between the capture reader and the consumer.
#[derive(Default)]
struct FrameSlot {
    latest: Mutex<Latest>,
    ready: Condvar,
}

impl FrameSlot {
    fn lock(&self) -> MutexGuard<'_, Latest> {
        self.latest.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn reset(&self) {
        *self.lock() = Latest::default();
    }

    #[cfg_attr(not(feature = "media-ffmpeg"), allow(dead_code))]
    fn publish(&self, frame: Frame) {
        let mut latest = self.lock();
        latest.frame = Some(frame);
        latest.seq += 1;
        latest.received = Some(Instant::now());
        drop(latest);
        self.ready.notify_all();
    }

    #[cfg_attr(not(feature = "media-ffmpeg"), allow(dead_code))]
    fn end(&self, reason: String) {
        self.lock().ended = Some(reason);
        self.ready.notify_all();
    }

    /// The newest frame, provided it arrived within `stale_after`.
    ///
    /// Otherwise waits for the next one: up to `first_timeout` before any frame has arrived,
    /// up to `stale_after` once one has. Fails when the stream ended or nothing new came.
    fn fresh_frame(
        &self,
        first_timeout: Duration,
        stale_after: Duration,
    ) -> TimewarpResult<Frame> {
        let latest = self.lock();
        if let Some(reason) = latest.ended.as_ref() {
            return Err(TimewarpError::frame(format!("ffmpeg stream ended: {reason}")));
        }
        if let (Some(frame), Some(at)) = (latest.frame.as_ref(), latest.received)
            && at.elapsed() <= stale_after
        {
            return Ok(frame.clone());
        }

        let seen = latest.seq;
        let timeout = if seen == 0 { first_timeout } else { stale_after };
        let (latest, _timeout) = self
            .ready
            .wait_timeout_while(latest, timeout, |l| l.seq == seen && l.ended.is_none())
            .unwrap_or_else(|e| e.into_inner());
        if let Some(reason) = latest.ended.as_ref() {
            return Err(TimewarpError::frame(format!("ffmpeg stream ended: {reason}")));
        }
        if latest.seq == seen {
            return Err(TimewarpError::frame(if seen == 0 {
                "timed out waiting for the first ffmpeg frame".to_string()
            } else {
                format!("no new ffmpeg frame for {}ms, capture stalled", timeout.as_millis())
            }));
        }
        latest
            .frame
            .clone()
            .ok_or_else(|| TimewarpError::frame("ffmpeg frame slot is empty"))
    }
}

/// Live frame source backed by the system `ffmpeg` binary.
///
/// `acquire` spawns `ffmpeg` writing raw RGBA frames to a pipe. A reader thread drains the
/// pipe continuously and keeps only the newest frame, so a slow consumer never sees a backlog
/// of stale frames. A frame older than the stale timeout is never served: if the device stops
/// delivering, `current_frame` fails instead of repeating the last picture.
pub struct FfmpegSource {
    input: FfmpegInput,
    requested: Option<Bounds>,
    stale_after: Duration,
    bounds: Option<Bounds>,
    child: Option<Child>,
    reader: Option<JoinHandle<()>>,
    slot: Arc<FrameSlot>,
}

impl FfmpegSource {
    pub fn camera(device: impl Into<PathBuf>) -> Self {
        Self::new(FfmpegInput::Camera {
            device: device.into(),
        })
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(FfmpegInput::File { path: path.into() })
    }

    pub fn new(input: FfmpegInput) -> Self {
        Self {
            input,
            requested: None,
            stale_after: STALE_FRAME_TIMEOUT,
            bounds: None,
            child: None,
            reader: None,
            slot: Arc::new(FrameSlot::default()),
        }
    }

    /// Ask ffmpeg to deliver frames at this size instead of the native one.
    pub fn with_size(mut self, size: Bounds) -> Self {
        self.requested = Some(size);
        self
    }

    /// Fail frame reads once no new frame has arrived for `timeout`. Defaults to two seconds.
    pub fn with_stale_timeout(mut self, timeout: Duration) -> Self {
        self.stale_after = timeout;
        self
    }

    pub fn input(&self) -> &FfmpegInput {
        &self.input
    }
}

impl FrameSource for FfmpegSource {
    fn acquire(&mut self) -> TimewarpResult<()> {
        if self.child.is_some() {
            return Ok(());
        }
        let bounds = match self.requested {
            Some(b) => b,
            None => probe_bounds(&self.input)?,
        };
        if bounds.is_empty() {
            return Err(TimewarpError::source_unavailable(format!(
                "'{}' reports empty frame size {}x{}",
                self.input.path().display(),
                bounds.width,
                bounds.height
            )));
        }

        self.slot.reset();
        let (child, reader) =
            spawn_capture(&self.input, bounds, self.requested.is_some(), &self.slot)?;
        tracing::info!(
            input = %self.input.path().display(),
            width = bounds.width,
            height = bounds.height,
            "ffmpeg capture started"
        );
        self.bounds = Some(bounds);
        self.child = Some(child);
        self.reader = Some(reader);
        Ok(())
    }

    fn current_bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    fn current_frame(&mut self) -> TimewarpResult<Frame> {
        if self.child.is_none() {
            return Err(TimewarpError::frame("ffmpeg source is not acquired"));
        }
        self.slot.fresh_frame(FIRST_FRAME_TIMEOUT, self.stale_after)
    }

    fn release(&mut self) {
        let Some(mut child) = self.child.take() else {
            return;
        };
        if let Err(e) = child.kill() {
            tracing::warn!("failed to stop ffmpeg: {e}");
        }
        let _ = child.wait();
        if let Some(reader) = self.reader.take()
            && reader.join().is_err()
        {
            tracing::warn!("ffmpeg reader thread panicked");
        }
        tracing::info!(input = %self.input.path().display(), "ffmpeg capture stopped");
    }
}

impl Drop for FfmpegSource {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(feature = "media-ffmpeg")]
fn probe_bounds(input: &FfmpegInput) -> TimewarpResult<Bounds> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
    }

    let mut cmd = std::process::Command::new("ffprobe");
    cmd.args(["-v", "error", "-print_format", "json", "-show_streams"]);
    if let FfmpegInput::Camera { .. } = input {
        cmd.args(["-f", "v4l2"]);
    }
    let out = cmd.arg(input.path()).output().map_err(|e| {
        TimewarpError::source_unavailable(format!("failed to run ffprobe: {e}"))
    })?;
    if !out.status.success() {
        return Err(TimewarpError::source_unavailable(format!(
            "ffprobe failed for '{}': {}",
            input.path().display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout).map_err(|e| {
        TimewarpError::source_unavailable(format!("ffprobe json parse failed: {e}"))
    })?;
    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| TimewarpError::source_unavailable("no video stream found"))?;
    match (video.width, video.height) {
        (Some(w), Some(h)) => Ok(Bounds::new(w, h)),
        _ => Err(TimewarpError::source_unavailable(
            "missing video dimensions from ffprobe",
        )),
    }
}

#[cfg(not(feature = "media-ffmpeg"))]
fn probe_bounds(_input: &FfmpegInput) -> TimewarpResult<Bounds> {
    Err(TimewarpError::source_unavailable(
        "ffmpeg capture requires the 'media-ffmpeg' feature",
    ))
}

#[cfg(feature = "media-ffmpeg")]
fn spawn_capture(
    input: &FfmpegInput,
    bounds: Bounds,
    scale: bool,
    slot: &Arc<FrameSlot>,
) -> TimewarpResult<(Child, JoinHandle<()>)> {
    use std::io::Read as _;
    use std::process::{Command, Stdio};

    let size = format!("{}x{}", bounds.width, bounds.height);
    let mut cmd = Command::new("ffmpeg");
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .args(["-loglevel", "error"]);
    match input {
        FfmpegInput::Camera { device } => {
            cmd.args(["-f", "v4l2"]);
            if scale {
                cmd.args(["-video_size", &size]);
            }
            cmd.arg("-i").arg(device);
        }
        FfmpegInput::File { path } => {
            cmd.args(["-re", "-stream_loop", "-1", "-i"]).arg(path);
        }
    }
    cmd.args(["-an", "-f", "rawvideo", "-pix_fmt", "rgba"]);
    if scale {
        cmd.args(["-s", &size]);
    }
    cmd.arg("pipe:1");

    let mut child = cmd.spawn().map_err(|e| {
        TimewarpError::source_unavailable(format!(
            "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
        ))
    })?;
    let mut stdout = child.stdout.take().ok_or_else(|| {
        TimewarpError::source_unavailable("failed to open ffmpeg stdout (unexpected)")
    })?;

    let mut stderr = child.stderr.take().ok_or_else(|| {
        TimewarpError::source_unavailable("failed to open ffmpeg stderr (unexpected)")
    })?;
    let stderr_drain = std::thread::spawn(move || {
        let mut stderr_bytes = Vec::new();
        stderr.read_to_end(&mut stderr_bytes).map(|_| stderr_bytes)
    });

    let frame_len = bounds.byte_len();
    let slot = Arc::clone(slot);
    let reader = std::thread::spawn(move || {
        let mut buf = vec![0u8; frame_len];
        let read_err = loop {
            if let Err(e) = stdout.read_exact(&mut buf) {
                break e.to_string();
            }
            match Frame::new(bounds.width, bounds.height, buf.clone()) {
                Ok(frame) => slot.publish(frame),
                Err(e) => break e.to_string(),
            }
        };
        let stderr_bytes = match stderr_drain.join() {
            Ok(Ok(bytes)) => bytes,
            Ok(Err(e)) => {
                tracing::warn!("ffmpeg stderr read failed: {e}");
                Vec::new()
            }
            Err(_) => {
                tracing::warn!("ffmpeg stderr drain thread panicked");
                Vec::new()
            }
        };
        slot.end(stream_end_reason(&read_err, &stderr_bytes));
    });

    Ok((child, reader))
}

/// Why the capture stream stopped: ffmpeg's own diagnostics when it printed any, otherwise the
/// pipe read error.
#[cfg(feature = "media-ffmpeg")]
fn stream_end_reason(read_err: &str, stderr: &[u8]) -> String {
    let stderr = String::from_utf8_lossy(stderr);
    let stderr = stderr.trim();
    if stderr.is_empty() {
        read_err.to_string()
    } else {
        format!("{stderr} ({read_err})")
    }
}

#[cfg(not(feature = "media-ffmpeg"))]
fn spawn_capture(
    _input: &FfmpegInput,
    _bounds: Bounds,
    _scale: bool,
    _slot: &Arc<FrameSlot>,
) -> TimewarpResult<(Child, JoinHandle<()>)> {
    Err(TimewarpError::source_unavailable(
        "ffmpeg capture requires the 'media-ffmpeg' feature",
    ))
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    std::process::Command::new("ffmpeg")
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/source/ffmpeg.rs"]
mod tests;
