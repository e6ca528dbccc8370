//! Core types: math re-exports, board layout, camera, errors.

pub use glam::{Mat4, Vec3, Vec4, vec3};

pub mod board;
pub mod camera;
pub mod error;

pub use error::{CoreError, CoreResult};
