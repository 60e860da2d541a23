use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(DepthflowError::data("x").to_string().contains("data error:"));
    assert!(
        DepthflowError::resource("x")
            .to_string()
            .contains("resource error:")
    );
    assert!(
        DepthflowError::config("x")
            .to_string()
            .contains("config error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = DepthflowError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
