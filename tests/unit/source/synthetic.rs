use super::*;

#[test]
fn bounds_only_after_acquire() {
    let mut src = SyntheticSource::new(8, 4);
    assert_eq!(src.current_bounds(), None);
    src.acquire().unwrap();
    assert_eq!(src.current_bounds(), Some(Bounds::new(8, 4)));
}

#[test]
fn zero_bounds_are_reported_unavailable() {
    let mut src = SyntheticSource::new(0, 4);
    src.acquire().unwrap();
    assert_eq!(src.current_bounds(), None);
}

#[test]
fn frames_change_between_calls() {
    let mut src = SyntheticSource::new(8, 4);
    src.acquire().unwrap();
    let a = src.current_frame().unwrap();
    let b = src.current_frame().unwrap();
    assert_eq!(a.bounds(), Bounds::new(8, 4));
    assert_ne!(a.data, b.data);
    assert_eq!(src.frames_served(), 2);
}

#[test]
fn frames_are_opaque() {
    let mut src = SyntheticSource::new(5, 3);
    src.acquire().unwrap();
    let f = src.current_frame().unwrap();
    assert!(f.data.chunks_exact(4).all(|px| px[3] == 255));
}

#[test]
fn release_is_idempotent_and_stops_frames() {
    let mut src = SyntheticSource::new(2, 2);
    src.acquire().unwrap();
    src.release();
    src.release();
    assert_eq!(src.release_count(), 1);
    assert!(src.current_frame().is_err());
}
