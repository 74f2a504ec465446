//! Raw touch sample sources

mod backend;
pub(crate) mod rdev_backend;

pub use backend::*;
