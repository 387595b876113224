#[macro_use] // extern crate with #[macro_use] because diesel 1 does not fully support Rust 2018.
extern crate diesel;
#[macro_use]
extern crate diesel_migrations;

pub mod database;
pub mod model;
pub mod password;
