#[cfg(feature = "diesel")]
#[cfg_attr(feature = "diesel", macro_use)] // extern crate with #[macro_use] because diesel 1 does not fully support Rust 2018.
extern crate diesel;

#[cfg(feature = "diesel")]
pub mod schema;
pub mod model;
pub mod api;
pub mod validate;
pub mod format_error;
