pub(crate) mod bounds;
pub(crate) mod color;
pub(crate) mod diff;
pub(crate) mod frame;
pub(crate) mod linker;
pub(crate) mod raster;
pub(crate) mod surface;
