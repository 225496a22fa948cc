pub(crate) mod frame;
pub(crate) mod grid_pattern;
