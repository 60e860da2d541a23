pub(crate) mod camera;
pub(crate) mod cpu;
pub(crate) mod frame;
pub(crate) mod post;
pub(crate) mod solver;
pub(crate) mod uniforms;
