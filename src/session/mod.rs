pub(crate) mod controller;
pub(crate) mod opts;
pub(crate) mod progress;
pub(crate) mod scheduler;
