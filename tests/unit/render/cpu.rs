use super::*;
use crate::config::params::Param;
use crate::config::store::Config;
use crate::foundation::core::Viewport;
use crate::render::solver::MarchBudget;
use crate::render::uniforms::BACKGROUND;

fn white(width: u32, height: u32) -> SourceImage {
    SourceImage::new(width, height, vec![255; (width * height * 4) as usize]).unwrap()
}

fn flat(width: u32, height: u32, v: f32) -> Heightfield {
    Heightfield::new(width, height, vec![v; (width * height) as usize]).unwrap()
}

fn render(config: &Config) -> FrameRGBA {
    let u = FrameUniforms::new(
        config,
        Viewport::new(8, 8).unwrap(),
        &MarchBudget::default(),
        BACKGROUND,
    );
    let pool = build_thread_pool(Some(2)).unwrap();
    FrameRenderer::new(&u, &white(4, 4), &flat(4, 4, 0.5)).render(&pool)
}

#[test]
fn thread_pool_rejects_zero() {
    assert!(matches!(
        build_thread_pool(Some(0)),
        Err(DepthflowError::Config(_))
    ));
    assert_eq!(build_thread_pool(Some(3)).unwrap().current_num_threads(), 3);
}

#[test]
fn default_frame_has_background_corners_and_image_center() {
    let frame = render(&Config::default());
    assert_eq!((frame.width, frame.height), (8, 8));
    assert_eq!(frame.data.len(), 8 * 8 * 4);
    assert!(!frame.premultiplied);
    assert_eq!(frame.pixel(0, 0), [51, 51, 51, 255]);
    assert_eq!(frame.pixel(7, 7), [51, 51, 51, 255]);
    assert_eq!(frame.pixel(3, 4), [255, 255, 255, 255]);
}

#[test]
fn vignette_darkens_but_keeps_alpha() {
    let mut c = Config::default();
    c.set(Param::VignetteEnable, 1.0).unwrap();
    c.set(Param::VignetteDecay, 0.5).unwrap();
    let px = render(&c).pixel(4, 4);
    assert!(px[0] > 0 && px[0] < 255, "{px:?}");
    assert_eq!(px[3], 255);
}

#[test]
fn depth_map_overlay_replaces_color_at_full_opacity() {
    let mut c = Config::default();
    c.set(Param::ViewDepthMap, 1.0).unwrap();
    assert_eq!(render(&c).pixel(4, 3), [128, 128, 128, 255]);
}

#[test]
fn dof_on_flat_white_image_stays_white() {
    let mut c = Config::default();
    c.set(Param::DofEnable, 1.0).unwrap();
    c.set(Param::DofIntensity, 1.0).unwrap();
    assert_eq!(render(&c).pixel(4, 4), [255, 255, 255, 255]);
}
