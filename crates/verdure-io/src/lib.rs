//! # verdure-io
//!
//! Scene files and solver assembly.
//!
//! A scene is a TOML document describing the timestep, solver settings and
//! the bodies to simulate. It is validated before anything is built, then
//! turned into a ready-to-step [`verdure_solver::Solver`].

pub mod builder;
pub mod contract;
pub mod validator;

pub use builder::{build_body, build_solver};
pub use contract::{SceneBody, SceneConfig, SourceShape};
pub use validator::validate_scene;
