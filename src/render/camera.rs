use crate::foundation::core::{Vec2, Vec3};
use crate::foundation::math::vec2_is_finite;
use crate::render::uniforms::FrameUniforms;

/// Vertical field of view of the perspective camera, in degrees.
pub const FOV_DEGREES: f64 = 60.0;

/// Per-pixel view ray and its intersection with the image plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub origin: Vec3,
    pub direction: Vec3,
    pub up: Vec3,
    pub right: Vec3,
    /// Radians.
    pub fov: f64,
    pub zoom: f64,
    pub isometric: bool,
    pub dolly: f64,
    pub plane_point: Vec3,
    /// Image-plane UV once projected; the fragment UV before that.
    pub uv: Vec2,
    pub out_of_bounds: bool,
}

impl Camera {
    /// Base camera one unit above the image plane, looking straight down.
    pub fn new(uv: Vec2) -> Self {
        Self {
            origin: Vec3::new(0.0, 0.0, 1.0),
            direction: Vec3::new(0.0, 0.0, -1.0),
            up: Vec3::new(0.0, 1.0, 0.0),
            right: Vec3::new(1.0, 0.0, 0.0),
            fov: FOV_DEGREES.to_radians(),
            zoom: 1.0,
            isometric: false,
            dolly: 0.0,
            plane_point: Vec3::ZERO,
            uv,
            out_of_bounds: false,
        }
    }

    /// Camera for the fragment at `uv`, with the frame's parallax options applied and the
    /// ray projected onto the image plane.
    pub fn for_fragment(uv: Vec2, uniforms: &FrameUniforms) -> Self {
        let mut cam = Self::new(uv);
        cam.origin.x += uniforms.depth_offset.x;
        cam.origin.y += uniforms.depth_offset.y;
        cam.isometric |= uniforms.isometric;
        cam.dolly += uniforms.dolly;
        cam.zoom = uniforms.zoom;
        cam.plane_point = Vec3::new(0.0, 0.0, uniforms.depth_distance());
        cam.project(uv, uniforms);
        cam
    }

    /// Build the view direction for the fragment at `uv` and intersect it with the plane.
    pub fn project(&mut self, uv: Vec2, uniforms: &FrameUniforms) {
        if self.isometric {
            self.direction = Vec3::new(-1.0, -1.0, -1.0).normalize();
        } else {
            if !self.zoom.is_finite() || self.zoom == 0.0 {
                self.out_of_bounds = true;
                return;
            }
            let fov_factor = (self.fov * 0.5).tan() / self.zoom;
            let mut ndc = uv * 2.0 - Vec2::new(1.0, 1.0);

            let viewport_aspect = uniforms.viewport.aspect();
            if uniforms.aspect_ratio <= 1.0 {
                ndc.y /= viewport_aspect / uniforms.aspect_ratio;
            } else {
                ndc.x *= viewport_aspect / uniforms.aspect_ratio;
            }
            self.direction = Vec3::new(ndc.x * fov_factor, ndc.y * fov_factor, -1.0).normalize();
        }
        self.up = Vec3::new(0.0, 1.0, 0.0);
        self.right = self.direction.cross(self.up);
        self.origin.z += self.dolly;
        self.intersect_plane();
    }

    /// Intersect the current ray with the z = 0 plane and derive the plane UV.
    ///
    /// Rays parallel to the plane, pointing away from it, or producing non-finite points are
    /// out of bounds, as are hits outside the [-1,1] square.
    pub fn intersect_plane(&mut self) {
        if self.direction.z == 0.0 {
            self.out_of_bounds = true;
            return;
        }
        let t = -self.origin.z / self.direction.z;
        if !t.is_finite() || t < 0.0 {
            self.out_of_bounds = true;
            return;
        }
        self.plane_point = self.origin + self.direction * t;
        let hit = self.plane_point.xy();
        self.out_of_bounds = !vec2_is_finite(hit) || hit.x.abs() > 1.0 || hit.y.abs() > 1.0;
        self.uv = (hit + Vec2::new(1.0, 1.0)) * 0.5;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/camera.rs"]
mod tests;
