use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt as _, util::SubscriberInitExt as _};

#[derive(Parser, Debug)]
#[command(name = "timewarp", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Capture a slit-scan image and write it as PNG.
    Scan(ScanArgs),
}

#[derive(Parser, Debug)]
struct ScanArgs {
    /// Scan axis.
    #[arg(long, value_enum, default_value_t = DirectionChoice::Horizontal)]
    direction: DirectionChoice,

    /// Where frames come from. `camera` and `file` need ffmpeg and a build with the
    /// `media-ffmpeg` feature; `synthetic` always works.
    #[arg(long, value_enum, default_value_t = SourceChoice::Camera)]
    source: SourceChoice,

    /// Capture device for `--source camera`.
    #[arg(long, default_value = "/dev/video0")]
    device: PathBuf,

    /// Input video for `--source file`.
    #[arg(long = "in")]
    in_path: Option<PathBuf>,

    /// Frame width. Required for `synthetic`; rescales camera/file input when set.
    #[arg(long)]
    width: Option<u32>,

    /// Frame height. Required for `synthetic`; rescales camera/file input when set.
    #[arg(long)]
    height: Option<u32>,

    /// Refresh rate in Hz. `0` ticks as fast as frames can be read.
    #[arg(long, default_value_t = 60)]
    hz: u32,

    /// JSON file with compositing options.
    #[arg(long)]
    opts: Option<PathBuf>,

    /// Output PNG path, or a directory to write `time-warp-scan.png` into.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DirectionChoice {
    Horizontal,
    Vertical,
}

impl From<DirectionChoice> for timewarp::ScanDirection {
    fn from(v: DirectionChoice) -> Self {
        match v {
            DirectionChoice::Horizontal => Self::Horizontal,
            DirectionChoice::Vertical => Self::Vertical,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SourceChoice {
    Camera,
    File,
    Synthetic,
}

/// Logs progress every tenth of the sweep.
struct ProgressLog {
    bound: u32,
    last_decile: u32,
}

impl timewarp::ScanObserver for ProgressLog {
    fn on_tick(&mut self, cursor: u32) {
        let decile = cursor.saturating_mul(10) / self.bound.max(1);
        if decile > self.last_decile {
            self.last_decile = decile;
            tracing::info!("scanning {}%", (decile * 10).min(100));
        }
    }

    fn on_complete(&mut self, bounds: timewarp::Bounds) {
        tracing::info!(
            width = bounds.width,
            height = bounds.height,
            "scan complete"
        );
    }

    fn on_aborted(&mut self) {
        tracing::warn!("scan aborted");
    }

    fn on_failed(&mut self, err: &timewarp::TimewarpError) {
        tracing::error!("scan failed: {err}");
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Scan(args) => cmd_scan(args),
    }
}

fn make_source(args: &ScanArgs) -> anyhow::Result<Box<dyn timewarp::FrameSource>> {
    let size = match (args.width, args.height) {
        (Some(w), Some(h)) => Some(timewarp::Bounds::new(w, h)),
        (None, None) => None,
        _ => anyhow::bail!("--width and --height must be given together"),
    };

    if !cfg!(feature = "media-ffmpeg") && !matches!(args.source, SourceChoice::Synthetic) {
        anyhow::bail!(
            "--source {} needs a build with `--features media-ffmpeg`; \
             use --source synthetic otherwise",
            format!("{:?}", args.source).to_lowercase()
        );
    }

    Ok(match args.source {
        SourceChoice::Synthetic => {
            let size = size.context("--source synthetic needs --width and --height")?;
            Box::new(timewarp::SyntheticSource::new(size.width, size.height))
        }
        SourceChoice::Camera => {
            let src = timewarp::FfmpegSource::camera(&args.device);
            Box::new(match size {
                Some(size) => src.with_size(size),
                None => src,
            })
        }
        SourceChoice::File => {
            let path = args
                .in_path
                .as_ref()
                .context("--source file needs --in <video>")?;
            let src = timewarp::FfmpegSource::file(path);
            Box::new(match size {
                Some(size) => src.with_size(size),
                None => src,
            })
        }
    })
}

fn cmd_scan(args: ScanArgs) -> anyhow::Result<()> {
    let opts = match args.opts.as_deref() {
        Some(path) => timewarp::ScanOpts::from_json_file(path)?,
        None => timewarp::ScanOpts::default(),
    };
    let source = make_source(&args)?;

    let mut scanner = timewarp::Scanner::new(opts);
    scanner.select_direction(args.direction.into())?;
    scanner.open(source).context("start scan")?;

    let bound = scanner
        .session()
        .map(timewarp::ScanSession::bound)
        .unwrap_or(1);
    let mut progress = ProgressLog {
        bound,
        last_decile: 0,
    };

    let status = if args.hz == 0 {
        scanner.run(&mut timewarp::ManualClock::new(), &mut progress)?
    } else {
        scanner.run(&mut timewarp::FixedRateClock::new(args.hz)?, &mut progress)?
    };
    if status != timewarp::ScanStatus::Complete {
        anyhow::bail!("scan did not complete ({status:?})");
    }

    let written = write_output(&mut scanner, &args.out)?;
    eprintln!("wrote {}", written.display());
    Ok(())
}

fn write_output(
    scanner: &mut timewarp::Scanner<Box<dyn timewarp::FrameSource>>,
    out: &Path,
) -> anyhow::Result<PathBuf> {
    let is_png = out
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
    if is_png {
        scanner
            .export_to(out)
            .with_context(|| format!("write png '{}'", out.display()))?;
        scanner.close();
        Ok(out.to_path_buf())
    } else {
        Ok(scanner
            .download(out)
            .with_context(|| format!("write png into '{}'", out.display()))?)
    }
}
