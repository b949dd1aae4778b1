#![deny(clippy::all, warnings)]

mod capture;
mod effects;
mod encode;
mod orchestrate;
mod prepare;

pub mod api;

pub use api::*;
