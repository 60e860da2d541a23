pub(crate) mod estimator;
pub(crate) mod heightfield;
pub(crate) mod normalize;
