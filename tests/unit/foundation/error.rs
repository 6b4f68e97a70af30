use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        TimewarpError::source_unavailable("x")
            .to_string()
            .contains("source unavailable:")
    );
    assert!(
        TimewarpError::initialization("x")
            .to_string()
            .contains("initialization error:")
    );
    assert!(
        TimewarpError::not_ready("x")
            .to_string()
            .contains("not ready:")
    );
    assert!(
        TimewarpError::frame("x")
            .to_string()
            .contains("frame error:")
    );
    assert!(
        TimewarpError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        TimewarpError::encode("x")
            .to_string()
            .contains("encode error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = TimewarpError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
