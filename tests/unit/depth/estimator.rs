use std::path::PathBuf;

use super::*;

fn scratch(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("unit_estimator");
    std::fs::create_dir_all(&dir).unwrap();
    dir.join(name)
}

#[test]
fn request_body_omits_token() {
    let req = DepthRequest::new("https://example.test/a.png", "secret");
    assert_eq!(req.to_json().unwrap(), r#"{"image_url":"https://example.test/a.png"}"#);
    assert_eq!(req.authorization(), "Bearer secret");
}

#[test]
fn file_estimator_reads_matrix() {
    let path = scratch("ok.json");
    std::fs::write(&path, "[[1, 2], [3, 4]]").unwrap();
    let m = FileDepthEstimator::new(&path)
        .estimate(&DepthRequest::new("ignored", ""))
        .unwrap();
    assert_eq!(m.rows(), 2);
    assert_eq!(m.cols(), 2);
}

#[test]
fn file_estimator_surfaces_missing_and_malformed() {
    let missing = FileDepthEstimator::new(scratch("does_not_exist.json"));
    assert!(matches!(
        missing.estimate(&DepthRequest::new("x", "")),
        Err(DepthflowError::Resource(_))
    ));

    let path = scratch("ragged.json");
    std::fs::write(&path, "[[1, 2], [3]]").unwrap();
    assert!(matches!(
        FileDepthEstimator::new(&path).estimate(&DepthRequest::new("x", "")),
        Err(DepthflowError::Data(_))
    ));
}
