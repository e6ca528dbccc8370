//! Uniform blocks shared with `shaders/board.wgsl`.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};

/// Per-frame camera block (group 0).
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct FrameUniform {
    pub proj: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
}

impl FrameUniform {
    pub fn new(proj: Mat4, view: Mat4) -> Self {
        Self {
            proj: proj.to_cols_array_2d(),
            view: view.to_cols_array_2d(),
        }
    }
}

/// Per-draw block (group 1), addressed with a dynamic offset.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct CellUniform {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl CellUniform {
    pub fn new(model: Mat4, color: Vec4) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            color: color.to_array(),
        }
    }
}

/// Round `value` up to the next multiple of `alignment` (a power of two).
#[inline]
pub fn align_to(value: u64, alignment: u64) -> u64 {
    debug_assert!(alignment.is_power_of_two());
    (value + alignment - 1) & !(alignment - 1)
}
