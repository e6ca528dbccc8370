//! GPU-resident meshes and the slot table the board draws from.

use asset::MeshData;
use corelib::board::Mark;
use wgpu::{Buffer, BufferUsages, Device, VertexBufferLayout, VertexStepMode, util::DeviceExt};

/// Which of the three board meshes a draw uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MeshSlot {
    Tile,
    X,
    O,
}

impl From<Mark> for MeshSlot {
    fn from(mark: Mark) -> Self {
        match mark {
            Mark::X => MeshSlot::X,
            Mark::O => MeshSlot::O,
        }
    }
}

/// One value per mesh slot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshTable<T> {
    pub tile: T,
    pub x: T,
    pub o: T,
}

impl<T> MeshTable<T> {
    pub fn get(&self, slot: MeshSlot) -> &T {
        match slot {
            MeshSlot::Tile => &self.tile,
            MeshSlot::X => &self.x,
            MeshSlot::O => &self.o,
        }
    }

    pub fn map<U>(&self, mut f: impl FnMut(MeshSlot, &T) -> U) -> MeshTable<U> {
        MeshTable {
            tile: f(MeshSlot::Tile, &self.tile),
            x: f(MeshSlot::X, &self.x),
            o: f(MeshSlot::O, &self.o),
        }
    }
}

/// Vertex buffer layout: tightly packed `vec3<f32>` positions.
pub const POSITION_LAYOUT: VertexBufferLayout<'static> = VertexBufferLayout {
    array_stride: std::mem::size_of::<[f32; 3]>() as u64,
    step_mode: VertexStepMode::Vertex,
    attributes: &wgpu::vertex_attr_array![0 => Float32x3],
};

/// Vertex + index buffers for one mesh. Dropping it frees both buffers.
pub struct GpuMesh {
    pub vertex_buf: Buffer,
    pub index_buf: Buffer,
    pub index_count: u32,
}

impl GpuMesh {
    pub fn upload(device: &Device, label: &str, mesh: &MeshData) -> Self {
        let vertex_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} VB")),
            contents: bytemuck::cast_slice(&mesh.positions),
            usage: BufferUsages::VERTEX,
        });
        let index_buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} IB")),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: BufferUsages::INDEX,
        });
        log::debug!(
            "Uploaded mesh '{}': {} vertices, {} indices",
            label,
            mesh.positions.len(),
            mesh.indices.len()
        );
        Self {
            vertex_buf,
            index_buf,
            index_count: mesh.indices.len() as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marks_map_to_their_own_slot() {
        assert_eq!(MeshSlot::from(Mark::X), MeshSlot::X);
        assert_eq!(MeshSlot::from(Mark::O), MeshSlot::O);
    }

    #[test]
    fn table_lookup_and_map() {
        let table = MeshTable {
            tile: MeshData::unit_quad(),
            x: MeshData::new(vec![[0.0; 3]; 3], vec![0, 1, 2]),
            o: MeshData::new(vec![[0.0; 3]; 4], vec![0, 1, 2, 0, 2, 3, 1, 2, 3]),
        };
        let counts = table.map(|_, m| m.indices.len() as u32);
        assert_eq!(*counts.get(MeshSlot::Tile), 6);
        assert_eq!(*counts.get(MeshSlot::X), 3);
        assert_eq!(*counts.get(MeshSlot::O), 9);
    }

    #[test]
    fn position_stride_is_twelve_bytes() {
        assert_eq!(POSITION_LAYOUT.array_stride, 12);
    }
}
