use super::*;
use crate::foundation::core::{Bounds, Rgba8};

#[test]
fn png_decodes_back_to_same_pixels() {
    let frame = Frame::new(2, 1, vec![10, 20, 30, 255, 0, 0, 0, 0]).unwrap();
    let png = encode_png(&frame).unwrap();
    assert_eq!(&png[1..4], b"PNG");

    let back = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(back.dimensions(), (2, 1));
    assert_eq!(back.into_raw(), frame.data);
}

#[test]
fn malformed_frame_is_an_encode_error() {
    let frame = Frame {
        width: 4,
        height: 4,
        data: vec![0; 3],
    };
    assert!(matches!(encode_png(&frame), Err(TimewarpError::Encode(_))));
}

#[test]
fn save_png_creates_parent_dirs() {
    let dir = std::path::PathBuf::from("target")
        .join("unit_export")
        .join("nested");
    let _ = std::fs::remove_dir_all(&dir);
    let path = dir.join(DEFAULT_EXPORT_FILENAME);

    save_png(&Frame::filled(Bounds::new(3, 3), Rgba8::BLACK), &path).unwrap();
    let img = image::open(&path).unwrap();
    assert_eq!((img.width(), img.height()), (3, 3));
}
