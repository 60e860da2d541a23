use super::*;

#[test]
fn starts_centered_and_disabled() {
    let p = PointerState::new();
    assert_eq!(p.position(), Vec2::ZERO);
    assert!(p.depth_origin().is_none());
}

#[test]
fn position_is_clamped_and_mapped_to_depth_origin() {
    let p = PointerState::new();
    p.set(2.0, -0.5).unwrap();
    assert_eq!(p.position(), Vec2::new(1.0, -0.5));
    p.set_enabled(true);
    let origin = p.depth_origin().unwrap();
    assert!((origin.x - 1.1).abs() < 1e-9);
    assert!((origin.y - 0.2).abs() < 1e-9);
}

#[test]
fn non_finite_write_keeps_previous_position() {
    let p = PointerState::new();
    p.set(0.25, 0.75).unwrap();
    assert!(p.set(f64::NAN, 0.0).is_err());
    assert_eq!(p.position(), Vec2::new(0.25, 0.75));
}

#[test]
fn y_up_positions_map_to_downward_rows() {
    let p = PointerState::new();
    p.set_enabled(true);

    p.set(0.0, 1.0).unwrap();
    assert!((p.depth_origin().unwrap().y - 1.1).abs() < 1e-9);

    p.set_y_up(0.0, 1.0).unwrap();
    assert_eq!(p.position(), Vec2::new(0.0, -1.0));
    assert!((p.depth_origin().unwrap().y + 0.1).abs() < 1e-9);
}
