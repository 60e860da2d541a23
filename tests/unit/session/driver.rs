use crate::foundation::core::Vec2;

use super::*;

fn image(width: u32, height: u32) -> SourceImage {
    SourceImage::new(width, height, vec![200; (width * height * 4) as usize]).unwrap()
}

fn field(width: u32, height: u32) -> Heightfield {
    let n = (width * height) as usize;
    let data = (0..n).map(|i| i as f32 / n as f32).collect();
    Heightfield::new(width, height, data).unwrap()
}

fn session() -> ParallaxSession {
    let opts = SessionOpts {
        threads: Some(2),
        ..SessionOpts::default()
    };
    ParallaxSession::new(image(8, 4), field(8, 4), opts).unwrap()
}

#[test]
fn aspect_mismatch_is_data_error() {
    assert!(matches!(
        ParallaxSession::new(image(8, 4), field(4, 4), SessionOpts::default()),
        Err(DepthflowError::Data(_))
    ));
    // Within tolerance.
    assert!(ParallaxSession::new(image(200, 100), field(201, 100), SessionOpts::default()).is_ok());
}

#[test]
fn aspect_ratio_follows_image_and_is_clamped() {
    let s = session();
    assert_eq!(s.config().get(Param::AspectRatio), 2.0);
    let s = ParallaxSession::new(image(3, 4), field(3, 4), SessionOpts::default()).unwrap();
    assert_eq!(s.config().get(Param::AspectRatio), 0.75);
    let s = ParallaxSession::new(image(5, 1), field(5, 1), SessionOpts::default()).unwrap();
    assert_eq!(s.config().get(Param::AspectRatio), 2.0);
}

#[test]
fn invalid_opts_are_config_errors() {
    let zero_threads = SessionOpts {
        threads: Some(0),
        ..SessionOpts::default()
    };
    assert!(matches!(
        ParallaxSession::new(image(2, 2), field(2, 2), zero_threads),
        Err(DepthflowError::Config(_))
    ));
    let bad_march = SessionOpts {
        march: MarchBudget {
            refine_fixed: Some(-1.0),
            ..MarchBudget::default()
        },
        ..SessionOpts::default()
    };
    assert!(ParallaxSession::new(image(2, 2), field(2, 2), bad_march).is_err());
}

#[test]
fn pointer_overrides_configured_depth_origin() {
    let s = session();
    let viewport = Viewport::new(16, 8).unwrap();
    assert_eq!(s.uniforms(viewport).depth_origin, Vec2::new(0.5, 0.5));

    s.pointer().set(0.5, -0.5).unwrap();
    assert_eq!(s.uniforms(viewport).depth_origin, Vec2::new(0.5, 0.5));
    s.pointer().set_enabled(true);
    let origin = s.uniforms(viewport).depth_origin;
    assert!((origin.x - 0.8).abs() < 1e-9 && (origin.y - 0.2).abs() < 1e-9);
}

#[test]
fn render_frame_matches_viewport() {
    let s = session();
    let frame = s.render_frame(Viewport::new(16, 8).unwrap());
    assert_eq!((frame.width, frame.height), (16, 8));
    assert_eq!(frame.data.len(), 16 * 8 * 4);
    assert!(frame.data.chunks_exact(4).all(|px| px[3] == 255 || px[3] == 200));
}

#[test]
fn sequence_advances_loops_between_frames() {
    let mut s = session();
    s.loops().lock().unwrap().enable(Param::Dolly);
    let mut seen = Vec::new();
    s.render_sequence(Viewport::new(4, 2).unwrap(), 3, 30.0, |i, frame| {
        assert_eq!(frame.width, 4);
        seen.push(i);
        Ok(())
    })
    .unwrap();
    assert_eq!(seen, vec![0, 1, 2]);
    assert_eq!(s.config().get(Param::Dolly), 0.06);

    assert!(matches!(
        s.render_sequence(Viewport::new(4, 2).unwrap(), 1, 0.0, |_, _| Ok(())),
        Err(DepthflowError::Config(_))
    ));
}

#[test]
fn sink_errors_stop_the_sequence() {
    let mut s = session();
    let mut calls = 0;
    let res = s.render_sequence(Viewport::new(2, 2).unwrap(), 5, 24.0, |_, _| {
        calls += 1;
        Err(DepthflowError::resource("disk full"))
    });
    assert!(res.is_err());
    assert_eq!(calls, 1);
}

#[test]
fn rejected_replacement_keeps_current_sources() {
    let mut s = session();
    assert!(s.replace_sources(image(4, 4), field(8, 4)).is_err());
    assert_eq!(s.image().width(), 8);

    s.replace_sources(image(4, 4), field(4, 4)).unwrap();
    assert_eq!(s.heightfield().width(), 4);
    assert_eq!(s.config().get(Param::AspectRatio), 1.0);
}

#[test]
fn install_rejects_tickets_not_newer_than_installed() {
    let loader = crate::assets::loader::SourceLoader::new();
    let first = loader.begin();
    let second = loader.begin();
    let loaded = |ticket, width| LoadedSources {
        image: image(width, 4),
        heightfield: field(width, 4),
        ticket,
    };

    let mut s = session();
    assert_eq!(s.installed(), None);
    assert!(s.install(loaded(second, 4)).unwrap());
    assert!(!s.install(loaded(first, 8)).unwrap());
    assert!(!s.install(loaded(second, 8)).unwrap());
    assert_eq!(s.image().width(), 4);
    assert_eq!(s.installed(), Some(second));

    let third = loader.begin();
    assert!(s.install(loaded(third, 8)).unwrap());
    assert_eq!(s.image().width(), 8);
}
