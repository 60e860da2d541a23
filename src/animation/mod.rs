pub(crate) mod loops;
pub(crate) mod scheduler;
