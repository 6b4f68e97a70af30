use super::*;
use crate::scan::driver::{ManualClock, NoopObserver};
use crate::source::synthetic::SyntheticSource;

#[test]
fn starts_idle_with_horizontal_default() {
    let scanner = Scanner::<SyntheticSource>::default();
    assert_eq!(scanner.view(), ScanView::Idle);
    assert_eq!(scanner.direction(), ScanDirection::Horizontal);
}

#[test]
fn direction_is_locked_while_scanning() {
    let mut scanner = Scanner::default();
    scanner.select_direction(ScanDirection::Vertical).unwrap();
    scanner.open(SyntheticSource::new(4, 4)).unwrap();
    assert_eq!(scanner.view(), ScanView::Scanning);
    assert!(scanner.select_direction(ScanDirection::Horizontal).is_err());
    assert_eq!(
        scanner.session().unwrap().direction(),
        ScanDirection::Vertical
    );

    scanner.close();
    assert_eq!(scanner.view(), ScanView::Idle);
    scanner.select_direction(ScanDirection::Horizontal).unwrap();
}

#[test]
fn failed_start_leaves_view_closed() {
    let mut scanner = Scanner::default();
    let err = scanner.open(SyntheticSource::new(0, 0)).unwrap_err();
    assert!(matches!(err, TimewarpError::Initialization(_)));
    assert_eq!(scanner.view(), ScanView::Idle);
}

#[test]
fn download_writes_default_file_and_closes() {
    let dir = PathBuf::from("target").join("unit_scanner_download");
    let _ = std::fs::remove_dir_all(&dir);

    let mut scanner = Scanner::default();
    scanner.open(SyntheticSource::new(6, 3)).unwrap();
    assert!(matches!(
        scanner.download(&dir),
        Err(TimewarpError::NotReady(_))
    ));

    let status = scanner
        .run(&mut ManualClock::new(), &mut NoopObserver)
        .unwrap();
    assert_eq!(status, ScanStatus::Complete);
    assert_eq!(scanner.view(), ScanView::Complete);

    let path = scanner.download(&dir).unwrap();
    assert_eq!(path, dir.join("time-warp-scan.png"));
    assert!(path.is_file());
    assert_eq!(scanner.view(), ScanView::Idle);
}

#[test]
fn try_new_scanning_replaces_finished_session() {
    let mut scanner = Scanner::default();
    scanner.open(SyntheticSource::new(3, 3)).unwrap();
    scanner
        .run(&mut ManualClock::new(), &mut NoopObserver)
        .unwrap();
    assert_eq!(scanner.view(), ScanView::Complete);

    scanner.try_new_scanning(SyntheticSource::new(5, 2)).unwrap();
    assert_eq!(scanner.view(), ScanView::Scanning);
    let session = scanner.session().unwrap();
    assert_eq!(session.cursor(), 0);
    assert_eq!(session.bounds(), crate::foundation::core::Bounds::new(5, 2));
}

#[test]
fn aborted_run_closes_view() {
    let mut scanner = Scanner::default();
    scanner.open(SyntheticSource::new(8, 8)).unwrap();
    scanner.abort_handle().abort();
    let status = scanner
        .run(&mut ManualClock::new(), &mut NoopObserver)
        .unwrap();
    assert_eq!(status, ScanStatus::Discarded);
    assert_eq!(scanner.view(), ScanView::Idle);
    assert!(scanner.run(&mut ManualClock::new(), &mut NoopObserver).is_err());
}

#[test]
fn early_abort_handle_cancels_later_scans() {
    let mut scanner = Scanner::default();
    let handle = scanner.abort_handle();

    scanner.open(SyntheticSource::new(4, 4)).unwrap();
    assert!(!handle.is_aborted());
    scanner.close();
    assert!(handle.is_aborted());

    scanner.open(SyntheticSource::new(4, 4)).unwrap();
    assert!(!handle.is_aborted());
    handle.abort();
    let status = scanner
        .run(&mut ManualClock::new(), &mut NoopObserver)
        .unwrap();
    assert_eq!(status, ScanStatus::Discarded);
    assert_eq!(scanner.view(), ScanView::Idle);
}
