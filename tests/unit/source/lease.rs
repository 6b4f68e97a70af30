use std::cell::Cell;
use std::rc::Rc;

use super::*;
use crate::foundation::core::Rgba8;

struct Counting {
    releases: Rc<Cell<u32>>,
}

impl FrameSource for Counting {
    fn acquire(&mut self) -> TimewarpResult<()> {
        Ok(())
    }

    fn current_bounds(&self) -> Option<Bounds> {
        Some(Bounds::new(2, 2))
    }

    fn current_frame(&mut self) -> TimewarpResult<Frame> {
        Ok(Frame::filled(Bounds::new(2, 2), Rgba8::BLACK))
    }

    fn release(&mut self) {
        self.releases.set(self.releases.get() + 1);
    }
}

#[test]
fn release_is_forwarded_once() {
    let releases = Rc::new(Cell::new(0));
    let mut lease = SourceLease::new(Counting {
        releases: releases.clone(),
    });
    assert!(lease.release());
    assert!(!lease.release());
    drop(lease);
    assert_eq!(releases.get(), 1);
}

#[test]
fn drop_releases_held_source() {
    let releases = Rc::new(Cell::new(0));
    let lease = SourceLease::new(Counting {
        releases: releases.clone(),
    });
    assert!(!lease.is_released());
    drop(lease);
    assert_eq!(releases.get(), 1);
}

#[test]
fn frames_are_refused_after_release() {
    let releases = Rc::new(Cell::new(0));
    let mut lease = SourceLease::new(Counting { releases });
    assert!(lease.current_frame().is_ok());
    lease.release();
    assert!(lease.current_frame().is_err());
}
