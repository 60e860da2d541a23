use std::io::Cursor;

use super::*;
use crate::foundation::error::DepthflowError;

fn png_2x2() -> Vec<u8> {
    let img = image::RgbaImage::from_raw(2, 2, vec![255; 16]).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn depth_2x2() -> Vec<u8> {
    b"[[0.0, 1.0], [2.0, 3.0]]".to_vec()
}

#[test]
fn newest_load_installs() {
    let loader = SourceLoader::new();
    let pending = loader.load_async(png_2x2(), depth_2x2()).unwrap();
    let ticket = pending.ticket();
    let loaded = pending.wait().unwrap().unwrap();
    assert_eq!(loaded.ticket, ticket);
    assert_eq!(loaded.image.width(), 2);
    assert_eq!(loaded.heightfield.as_slice()[0], 0.0);
    assert_eq!(loaded.heightfield.as_slice()[3], 1.0);
}

#[test]
fn superseded_load_is_discarded() {
    let loader = SourceLoader::new();
    let first = loader.load_async(png_2x2(), depth_2x2()).unwrap();
    let second = loader.load_async(png_2x2(), depth_2x2()).unwrap();
    assert!(second.ticket() > first.ticket());

    assert!(first.wait().unwrap().is_none());
    assert!(second.wait().unwrap().is_some());
}

#[test]
fn begin_alone_supersedes_pending_work() {
    let loader = SourceLoader::new();
    let pending = loader.load_async(png_2x2(), depth_2x2()).unwrap();
    let newer = loader.begin();
    assert!(loader.accept(newer));
    assert!(!loader.accept(pending.ticket()));
    assert!(pending.wait().unwrap().is_none());
}

#[test]
fn cancelled_load_resolves_to_none() {
    let loader = SourceLoader::new();
    let pending = loader.load_async(png_2x2(), depth_2x2()).unwrap();
    pending.cancel();
    assert!(pending.wait().unwrap().is_none());
}

#[test]
fn decode_failures_surface_for_current_generation() {
    let loader = SourceLoader::new();
    let bad_image = loader.load_async(b"nope".to_vec(), depth_2x2()).unwrap();
    assert!(matches!(
        bad_image.wait(),
        Err(DepthflowError::Resource(_))
    ));

    let bad_depth = loader.load_async(png_2x2(), b"[[1.0], []]".to_vec()).unwrap();
    assert!(matches!(bad_depth.wait(), Err(DepthflowError::Data(_))));
}
