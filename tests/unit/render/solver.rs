use super::*;
use crate::config::params::Param;
use crate::config::store::Config;
use crate::foundation::core::Viewport;
use crate::render::uniforms::BACKGROUND;

fn uniforms(config: &Config) -> FrameUniforms {
    FrameUniforms::new(
        config,
        Viewport::new(64, 64).unwrap(),
        &MarchBudget::default(),
        BACKGROUND,
    )
}

fn checker() -> Heightfield {
    Heightfield::new(2, 2, vec![0.0, 1.0, 1.0, 0.0]).unwrap()
}

#[test]
fn corner_ray_over_checker_resolves_to_low_texel() {
    let hf = checker();
    let u = uniforms(&Config::default());
    let cam = Camera::new(Vec2::new(0.0, 0.0));
    let point = ParallaxSolver::new(&hf, &u).solve(&cam).unwrap();
    assert_eq!(point.height, 0.0);
    // The walk runs diagonally up-left of sigma = (-0.5, -0.5).
    assert!(point.uv.x < -0.5 + 0.1 + 1e-9 && point.uv.x > -0.5);
    assert_eq!(point.uv.x, point.uv.y);
}

#[test]
fn out_of_bounds_camera_yields_background() {
    let hf = checker();
    let u = uniforms(&Config::default());
    let mut cam = Camera::new(Vec2::new(0.5, 0.5));
    cam.out_of_bounds = true;
    assert!(ParallaxSolver::new(&hf, &u).solve(&cam).is_none());
}

#[test]
fn zero_displacement_reads_height_at_sigma() {
    let hf = Heightfield::new(2, 2, vec![0.1, 0.2, 0.3, 0.4]).unwrap();
    let u = uniforms(&Config::default());
    // lambda = depth origin, so the camera looks straight down the relief.
    let cam = Camera::new(Vec2::new(0.5, 0.5));
    let point = ParallaxSolver::new(&hf, &u).solve(&cam).unwrap();
    assert_eq!(point.uv, Vec2::new(0.5, 0.5));
    assert_eq!(point.height, f64::from(0.4f32));
}

#[test]
fn non_finite_inputs_degrade_to_background() {
    let hf = checker();
    let mut u = uniforms(&Config::default());
    u.depth_origin = Vec2::new(f64::NAN, 0.0);
    let cam = Camera::new(Vec2::new(0.2, 0.2));
    assert!(ParallaxSolver::new(&hf, &u).solve(&cam).is_none());
}

#[test]
fn solved_points_are_finite_over_the_frame() {
    let hf = Heightfield::new(3, 2, vec![0.0, 0.5, 1.0, 0.25, 0.75, 0.1]).unwrap();
    let mut c = Config::default();
    c.set(Param::DepthMirror, 1.0).unwrap();
    c.set(Param::Static, 0.3).unwrap();
    c.set(Param::FocusCenterX, 0.2).unwrap();
    let u = uniforms(&c);
    let solver = ParallaxSolver::new(&hf, &u);
    for y in 0..8 {
        for x in 0..8 {
            let uv = Vec2::new((x as f64 + 0.5) / 8.0, (y as f64 + 0.5) / 8.0);
            let cam = Camera::for_fragment(uv, &u);
            if let Some(p) = solver.solve(&cam) {
                assert!(p.uv.x.is_finite() && p.uv.y.is_finite());
                assert!((0.0..=1.0).contains(&p.height));
            }
        }
    }
}

#[test]
fn march_budget_validation_and_fixed_refine() {
    assert!(MarchBudget::default().validate().is_ok());
    let bad = MarchBudget {
        probe_min: 0.0,
        ..MarchBudget::default()
    };
    assert!(bad.validate().is_err());

    let fixed = MarchBudget {
        refine_fixed: Some(300.0),
        ..MarchBudget::default()
    };
    assert_eq!(fixed.refine_steps(0.0, 10), 300.0);
    assert_eq!(MarchBudget::default().refine_steps(1.0, 1920), 960.0);
    assert_eq!(MarchBudget::default().probe_steps(0.5), 75.0);
}

#[test]
fn oversized_march_budgets_are_rejected_or_capped() {
    let dense = MarchBudget {
        refine_fixed: Some(1e17),
        ..MarchBudget::default()
    };
    assert!(matches!(dense.validate(), Err(DepthflowError::Config(_))));
    assert_eq!(dense.refine_steps(1.0, 64), MAX_MARCH_STEPS);
    assert_eq!(
        MarchBudget::default().refine_steps(1.0, u32::MAX),
        MAX_MARCH_STEPS
    );
    let dense_probe = MarchBudget {
        probe_max: MAX_MARCH_STEPS * 2.0,
        ..MarchBudget::default()
    };
    assert!(dense_probe.validate().is_err());
}

#[test]
fn march_terminates_when_step_size_underflows() {
    let hf = checker();
    let mut u = uniforms(&Config::default());
    u.probe_steps = 1e17;
    u.refine_steps = 1e17;
    let cam = Camera::new(Vec2::new(0.0, 0.0));
    let point = ParallaxSolver::new(&hf, &u).solve(&cam).unwrap();
    assert!(point.uv.x.is_finite() && point.uv.y.is_finite());

    u.refine_steps = f64::NAN;
    assert!(ParallaxSolver::new(&hf, &u).solve(&cam).is_none());
}
