use super::*;

#[test]
fn table_is_indexed_by_variant() {
    for (i, p) in Param::ALL.into_iter().enumerate() {
        assert_eq!(p.index(), i);
        assert_eq!(Param::from_name(p.name()).unwrap(), p);
    }
}

#[test]
fn defaults_sit_inside_bounds() {
    for p in Param::ALL {
        let s = p.spec();
        assert!(s.min <= s.max, "{p}");
        assert!(s.contains(s.default), "{p} default {}", s.default);
        assert!(s.step > 0.0, "{p}");
    }
}

#[test]
fn aliases_and_unknown_names() {
    assert_eq!(Param::from_name("depthHeight").unwrap(), Param::Height);
    assert_eq!("depthFocus".parse::<Param>().unwrap(), Param::Focus);
    assert!(matches!(
        Param::from_name("warp"),
        Err(DepthflowError::Config(_))
    ));
}

#[test]
fn validate_rejects_out_of_range_and_nan() {
    assert_eq!(Param::Focus.validate(0.6).unwrap(), 0.6);
    assert!(Param::Focus.validate(0.5).is_err());
    assert!(Param::Zoom.validate(f64::NAN).is_err());
    assert!(Param::DofDirections.validate(17.0).is_err());
}

#[test]
fn spot_check_table_rows() {
    let s = Param::Invert.spec();
    assert_eq!((s.min, s.max, s.step, s.default), (0.0, 1.0, 0.01, 0.39));
    let s = Param::Quality.spec();
    assert_eq!((s.min, s.max, s.default), (0.0, 100.0, 100.0));
    let s = Param::DofQuality.spec();
    assert_eq!((s.min, s.max, s.step, s.default), (1.0, 8.0, 1.0, 4.0));
}
