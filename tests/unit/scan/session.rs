use super::*;
use crate::foundation::core::Rgba8;

/// Serves uniform frames whose red channel is 10 + the frame number.
struct Numbered {
    bounds: Bounds,
    served: u8,
    releases: u32,
}

impl Numbered {
    fn new(w: u32, h: u32) -> Self {
        Self {
            bounds: Bounds::new(w, h),
            served: 10,
            releases: 0,
        }
    }
}

impl FrameSource for Numbered {
    fn acquire(&mut self) -> TimewarpResult<()> {
        Ok(())
    }

    fn current_bounds(&self) -> Option<Bounds> {
        Some(self.bounds)
    }

    fn current_frame(&mut self) -> TimewarpResult<Frame> {
        let f = Frame::filled(self.bounds, Rgba8::new(self.served, 0, 0, 255));
        self.served += 1;
        Ok(f)
    }

    fn release(&mut self) {
        self.releases += 1;
    }
}

fn run_to_end<F: FrameSource>(s: &mut ScanSession<F>) {
    while s.tick().unwrap() == TickOutcome::Continue {}
}

#[test]
fn first_tick_paints_shifted_frame_and_cursor_line() {
    let mut s = ScanSession::start(
        ScanDirection::Horizontal,
        Numbered::new(6, 2),
        ScanOpts::default(),
    )
    .unwrap();
    assert_eq!(s.tick().unwrap(), TickOutcome::Continue);
    assert_eq!(s.cursor(), 1);

    let surface = s.surface();
    // Cursor line at column 0 covers the strip painted there.
    assert_eq!(surface.pixel(0, 0), Some(Rgba8::BLACK));
    assert_eq!(surface.pixel(1, 1), Some(Rgba8::new(10, 0, 0, 255)));
    assert_eq!(surface.pixel(3, 0), Some(Rgba8::new(10, 0, 0, 255)));
    // Strip of width 6 painted at -2 leaves the last two columns untouched.
    assert_eq!(surface.pixel(4, 0), Some(Rgba8::TRANSPARENT));
    assert_eq!(surface.pixel(5, 1), Some(Rgba8::TRANSPARENT));
}

#[test]
fn history_behind_cursor_is_kept() {
    let opts = ScanOpts {
        draw_indicator: false,
        ..ScanOpts::default()
    };
    let mut s = ScanSession::start(ScanDirection::Horizontal, Numbered::new(8, 1), opts).unwrap();
    run_to_end(&mut s);

    let out = s.finished_frame().unwrap();
    // Column x was last painted by the tick whose cursor was x + 2, i.e. frame x + 2.
    for x in 0..6 {
        assert_eq!(out.pixel(x, 0), Some(Rgba8::new(x as u8 + 12, 0, 0, 255)));
    }
    assert_eq!(out.pixel(6, 0), Some(Rgba8::TRANSPARENT));
    assert_eq!(out.pixel(7, 0), Some(Rgba8::TRANSPARENT));
}

#[test]
fn vertical_scan_fills_rows() {
    let opts = ScanOpts {
        draw_indicator: false,
        ..ScanOpts::default()
    };
    let mut s = ScanSession::start(ScanDirection::Vertical, Numbered::new(2, 5), opts).unwrap();
    run_to_end(&mut s);
    assert_eq!(s.ticks_run(), 6);

    let out = s.finished_frame().unwrap();
    for y in 0..3 {
        assert_eq!(out.pixel(1, y), Some(Rgba8::new(y as u8 + 12, 0, 0, 255)));
    }
    assert_eq!(out.pixel(0, 4), Some(Rgba8::TRANSPARENT));
}

#[test]
fn indicator_is_drawn_at_cursor_and_erased_next_tick() {
    let opts = ScanOpts {
        indicator_rgba: [0, 255, 0, 255],
        ..ScanOpts::default()
    };
    let green = Rgba8::new(0, 255, 0, 255);
    let mut s = ScanSession::start(ScanDirection::Horizontal, Numbered::new(8, 2), opts).unwrap();
    s.tick().unwrap();
    s.tick().unwrap();
    s.tick().unwrap();
    // Cursor was 2 during the last tick.
    assert_eq!(s.surface().pixel(2, 1), Some(green));
    assert_ne!(s.surface().pixel(1, 1), Some(green));

    s.tick().unwrap();
    assert_ne!(s.surface().pixel(2, 1), Some(green));
    assert_eq!(s.surface().pixel(3, 0), Some(green));
}

#[test]
fn completion_releases_source_once() {
    let mut s = ScanSession::start(
        ScanDirection::Horizontal,
        Numbered::new(3, 2),
        ScanOpts::default(),
    )
    .unwrap();
    run_to_end(&mut s);
    assert_eq!(s.status(), ScanStatus::Complete);
    assert_eq!(s.cursor(), 4);
    assert_eq!(s.source().releases, 1);

    s.abort();
    s.abort();
    assert_eq!(s.source().releases, 1);
    assert_eq!(s.status(), ScanStatus::Complete);
    assert!(s.finished_frame().is_ok());
}

#[test]
fn ticks_after_completion_do_not_touch_state() {
    let mut s = ScanSession::start(
        ScanDirection::Vertical,
        Numbered::new(2, 2),
        ScanOpts::default(),
    )
    .unwrap();
    run_to_end(&mut s);
    let before = s.finished_frame().unwrap();
    assert_eq!(s.tick().unwrap(), TickOutcome::Idle);
    assert_eq!(s.cursor(), 3);
    assert_eq!(s.finished_frame().unwrap(), before);
    assert_eq!(s.source().served, 13);
}

#[test]
fn invalid_opts_fail_initialization() {
    let opts = ScanOpts {
        paint_offset: 0,
        seam_width: 1,
        ..ScanOpts::default()
    };
    let err = ScanSession::start(ScanDirection::Horizontal, Numbered::new(2, 2), opts)
        .err()
        .unwrap();
    assert!(matches!(err, TimewarpError::Initialization(_)));
}

#[test]
fn mismatched_surface_fails_initialization() {
    let err = ScanSession::start_with_surface(
        ScanDirection::Horizontal,
        Numbered::new(4, 4),
        ScanOpts::default(),
        |_| RasterSurface::new(Bounds::new(2, 2)),
    )
    .err()
    .unwrap();
    assert!(matches!(err, TimewarpError::Initialization(_)));
}
