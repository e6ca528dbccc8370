//! Board draw list and the per-draw uniform bytes that go with it.

use corelib::{
    Mat4, Vec3, Vec4,
    board::{self, BOARD_SIZE},
};

use crate::mesh::MeshSlot;
use crate::uniforms::CellUniform;

/// Flat color of the X and O meshes.
pub const MARK_COLOR: Vec4 = Vec4::new(1.0, 0.0, 0.0, 1.0);
/// Flat color of the optional backdrop tiles.
pub const TILE_COLOR: Vec4 = Vec4::new(0.2, 0.2, 0.2, 1.0);
/// Tiles sit just behind the mark plane.
pub const TILE_DEPTH: f32 = -0.05;

/// Upper bound on draws per frame: one tile and one mark per cell.
pub const MAX_DRAWS: usize = 2 * BOARD_SIZE * BOARD_SIZE;

/// One indexed draw. Its uniform entry lives at `index * stride`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawCommand {
    pub slot: MeshSlot,
    pub model: Mat4,
    pub color: Vec4,
}

/// Ordered draw list: every tile first (if enabled), then one mark per cell.
pub fn plan_board_draws(show_tiles: bool) -> Vec<DrawCommand> {
    let mut commands = Vec::with_capacity(MAX_DRAWS);
    if show_tiles {
        commands.extend(board::cells().map(|cell| DrawCommand {
            slot: MeshSlot::Tile,
            model: Mat4::from_translation(cell.offset() + Vec3::Z * TILE_DEPTH),
            color: TILE_COLOR,
        }));
    }
    commands.extend(board::cells().map(|cell| DrawCommand {
        slot: cell.mark().into(),
        model: cell.model(),
        color: MARK_COLOR,
    }));
    commands
}

/// Uniform bytes for `commands`, entry `i` at byte `i * stride`.
pub fn pack_cell_uniforms(commands: &[DrawCommand], stride: u64) -> Vec<u8> {
    let stride = stride as usize;
    let size = std::mem::size_of::<CellUniform>();
    debug_assert!(stride >= size, "uniform stride {stride} < block size {size}");

    let mut bytes = vec![0u8; commands.len() * stride];
    for (i, cmd) in commands.iter().enumerate() {
        let block = CellUniform::new(cmd.model, cmd.color);
        bytes[i * stride..i * stride + size].copy_from_slice(bytemuck::bytes_of(&block));
    }
    bytes
}
