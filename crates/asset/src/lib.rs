//! Asset loading/parsers (meshes, textures).
//! OBJ ingestion runs reader -> assembler -> normalizer and yields a flat
//! interleaved vertex buffer drawn as a plain triangle list.

pub mod error;
pub mod mesh;
pub mod obj;
pub mod primitives;
pub mod texture;

pub use error::ObjError;
pub use mesh::{BoundingExtent, MeshBuffer, VertexLayout, load_mesh, normalize};
pub use obj::{FaceIndices, ObjSource, Triangle, read_face_indices};
