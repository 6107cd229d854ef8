use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        TrackreelError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        TrackreelError::schedule("x")
            .to_string()
            .contains("schedule error:")
    );
    assert!(
        TrackreelError::render("x")
            .to_string()
            .contains("render error:")
    );
    assert!(
        TrackreelError::encode("x")
            .to_string()
            .contains("encode error:")
    );
    assert!(
        TrackreelError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = TrackreelError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
