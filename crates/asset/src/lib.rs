//! Asset loading: CPU-side meshes and the OBJ reader that produces them.

pub mod mesh;
pub mod obj;

pub use mesh::MeshData;
pub use obj::load_obj_from_path;
