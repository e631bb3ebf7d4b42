//! CPU-side interleaved vertex buffers, their assembly from OBJ tables and
//! the bounding-box normalization applied before upload.

use std::path::Path;

use anyhow::{Context, Result};

use crate::{
    error::ObjError,
    obj::{FaceIndices, ObjSource, load_obj_from_path},
};

/// Field order of one vertex record. Positions always occupy floats 0..3.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VertexLayout {
    /// x y z nx ny nz
    PositionNormal,
    /// x y z nx ny nz u v
    PositionNormalTexcoord,
    /// x y z r g b
    PositionColor,
}

impl VertexLayout {
    /// Floats per vertex record.
    #[inline]
    pub const fn stride(self) -> usize {
        match self {
            Self::PositionNormal | Self::PositionColor => 6,
            Self::PositionNormalTexcoord => 8,
        }
    }
}

/// Per-vertex colors cycled over the emitted vertices of a colored mesh.
pub const PALETTE: [[f32; 3]; 8] = [
    [0.0, 0.0, 0.0],
    [0.0, 0.0, 1.0],
    [0.0, 1.0, 0.0],
    [0.0, 1.0, 1.0],
    [1.0, 0.0, 0.0],
    [1.0, 0.0, 1.0],
    [1.0, 1.0, 0.0],
    [1.0, 1.0, 1.0],
];

/// Axis-aligned bounds of the emitted positions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingExtent {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl BoundingExtent {
    /// Inverted bounds; the first `include` snaps them to a point.
    pub const fn empty() -> Self {
        Self {
            min: [f32::INFINITY; 3],
            max: [f32::NEG_INFINITY; 3],
        }
    }

    #[inline]
    pub fn include(&mut self, p: [f32; 3]) {
        for axis in 0..3 {
            self.min[axis] = self.min[axis].min(p[axis]);
            self.max[axis] = self.max[axis].max(p[axis]);
        }
    }

    pub fn from_buffer(buffer: &MeshBuffer) -> Self {
        let mut extent = Self::empty();
        for p in buffer.positions() {
            extent.include(p);
        }
        extent
    }

    pub fn center(&self) -> [f32; 3] {
        [
            (self.min[0] + self.max[0]) / 2.0,
            (self.min[1] + self.max[1]) / 2.0,
            (self.min[2] + self.max[2]) / 2.0,
        ]
    }

    /// Half of the longest axis span.
    pub fn half_extent(&self) -> f32 {
        let spans = [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ];
        spans.into_iter().fold(f32::NEG_INFINITY, f32::max) / 2.0
    }

    /// Index of the axis with the largest span (first one on ties).
    pub fn longest_axis(&self) -> usize {
        (0..3).fold(0, |best, axis| {
            if self.max[axis] - self.min[axis] > self.max[best] - self.min[best] {
                axis
            } else {
                best
            }
        })
    }

    /// True when uniform rescaling would divide by zero (or by garbage).
    pub fn is_degenerate(&self) -> bool {
        let half = self.half_extent();
        !(half.is_finite() && half > 0.0)
    }
}

impl Default for BoundingExtent {
    fn default() -> Self {
        Self::empty()
    }
}

/// Flat interleaved vertex data, one record per (face, corner).
/// Consumed as a non-indexed triangle list.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshBuffer {
    layout: VertexLayout,
    data: Vec<f32>,
}

impl MeshBuffer {
    pub fn new(layout: VertexLayout) -> Self {
        Self {
            layout,
            data: Vec::new(),
        }
    }

    pub fn with_capacity(layout: VertexLayout, vertices: usize) -> Self {
        Self {
            layout,
            data: Vec::with_capacity(vertices * layout.stride()),
        }
    }

    /// Wrap pre-built records. `data.len()` must be a multiple of the stride.
    pub fn from_raw(layout: VertexLayout, data: Vec<f32>) -> Option<Self> {
        (data.len() % layout.stride() == 0).then_some(Self { layout, data })
    }

    /// Append one record; `fields` must hold exactly one stride of floats.
    #[inline]
    pub fn push_vertex(&mut self, fields: &[f32]) {
        debug_assert_eq!(fields.len(), self.layout.stride());
        self.data.extend_from_slice(fields);
    }

    #[inline]
    pub fn layout(&self) -> VertexLayout {
        self.layout
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.layout.stride()
    }

    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.data.len() / self.stride()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn vertices(&self) -> impl Iterator<Item = &[f32]> {
        self.data.chunks_exact(self.stride())
    }

    pub fn positions(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        self.vertices().map(|v| [v[0], v[1], v[2]])
    }

    /// Line-list buffer holding the three edges of every triangle.
    pub fn wireframe(&self) -> MeshBuffer {
        let stride = self.stride();
        let mut lines = MeshBuffer::with_capacity(self.layout, self.vertex_count() * 2);
        for tri in self.data.chunks_exact(stride * 3) {
            let (a, rest) = tri.split_at(stride);
            let (b, c) = rest.split_at(stride);
            for edge in [[a, b], [b, c], [c, a]] {
                lines.push_vertex(edge[0]);
                lines.push_vertex(edge[1]);
            }
        }
        lines
    }
}

fn lookup<T: Copy>(table: &[T], index: usize, name: &'static str) -> Result<T, ObjError> {
    table.get(index).copied().ok_or(ObjError::IndexOutOfRange {
        table: name,
        index,
        len: table.len(),
    })
}

fn check_faces(faces: &FaceIndices) -> Result<(), ObjError> {
    if faces.position.len() != faces.normal.len() {
        return Err(ObjError::FaceCountMismatch {
            positions: faces.position.len(),
            normals: faces.normal.len(),
        });
    }
    if faces.is_empty() {
        return Err(ObjError::Empty);
    }
    Ok(())
}

/// Join face indices against the coordinate tables into a position+normal
/// buffer, tracking the bounds of every emitted position.
pub fn assemble(
    faces: &FaceIndices,
    positions: &[[f32; 3]],
    normals: &[[f32; 3]],
) -> Result<(MeshBuffer, BoundingExtent), ObjError> {
    check_faces(faces)?;

    let mut buffer =
        MeshBuffer::with_capacity(VertexLayout::PositionNormal, faces.triangle_count() * 3);
    let mut extent = BoundingExtent::empty();

    for (pos_face, norm_face) in faces.position.iter().zip(&faces.normal) {
        for (&pi, &ni) in pos_face.iter().zip(norm_face) {
            let [x, y, z] = lookup(positions, pi, "position")?;
            let [nx, ny, nz] = lookup(normals, ni, "normal")?;
            buffer.push_vertex(&[x, y, z, nx, ny, nz]);
            extent.include([x, y, z]);
        }
    }

    Ok((buffer, extent))
}

/// Like [`assemble`] with texture coordinates appended; triangles without
/// texcoord references get (0, 0).
pub fn assemble_textured(source: &ObjSource) -> Result<(MeshBuffer, BoundingExtent), ObjError> {
    let faces = &source.faces;
    check_faces(faces)?;
    let normals = source.normal_table();

    let mut buffer = MeshBuffer::with_capacity(
        VertexLayout::PositionNormalTexcoord,
        faces.triangle_count() * 3,
    );
    let mut extent = BoundingExtent::empty();

    for ((pos_face, norm_face), tex_face) in faces
        .position
        .iter()
        .zip(&faces.normal)
        .zip(&faces.texcoord)
    {
        for corner in 0..3 {
            let [x, y, z] = lookup(&source.positions, pos_face[corner], "position")?;
            let [nx, ny, nz] = lookup(normals, norm_face[corner], "normal")?;
            let [u, v] = match tex_face {
                Some(tex) => lookup(&source.texcoords, tex[corner], "texcoord")?,
                None => [0.0, 0.0],
            };
            buffer.push_vertex(&[x, y, z, nx, ny, nz, u, v]);
            extent.include([x, y, z]);
        }
    }

    Ok((buffer, extent))
}

/// Position+color buffer; vertex `i` takes `PALETTE[i % PALETTE.len()]`.
pub fn assemble_colored(source: &ObjSource) -> Result<(MeshBuffer, BoundingExtent), ObjError> {
    check_faces(&source.faces)?;

    let mut buffer = MeshBuffer::with_capacity(
        VertexLayout::PositionColor,
        source.faces.triangle_count() * 3,
    );
    let mut extent = BoundingExtent::empty();

    for (i, &pi) in source.faces.position.iter().flatten().enumerate() {
        let [x, y, z] = lookup(&source.positions, pi, "position")?;
        let [r, g, b] = PALETTE[i % PALETTE.len()];
        buffer.push_vertex(&[x, y, z, r, g, b]);
        extent.include([x, y, z]);
    }

    Ok((buffer, extent))
}

/// Recenter and uniformly rescale positions in place so the longest axis
/// spans [-1, 1]. Other fields are untouched. A degenerate extent only
/// recenters (scale 1).
pub fn normalize(buffer: &mut MeshBuffer, extent: &BoundingExtent) {
    let mut center = extent.center();
    if center.iter().any(|c| !c.is_finite()) {
        center = [0.0; 3];
    }

    if extent.is_degenerate() {
        log::warn!(
            "Degenerate bounding extent (min={:?}, max={:?}); skipping rescale",
            extent.min,
            extent.max
        );
        let stride = buffer.stride();
        for vertex in buffer.data.chunks_exact_mut(stride) {
            for axis in 0..3 {
                vertex[axis] -= center[axis];
            }
        }
        return;
    }

    let scale = extent.half_extent();
    let longest = extent.longest_axis();
    let stride = buffer.stride();
    for vertex in buffer.data.chunks_exact_mut(stride) {
        for axis in 0..3 {
            let p = vertex[axis];
            // Rounding in (p - c) / h can land one ulp past the unit box.
            vertex[axis] = if axis == longest && p == extent.min[axis] {
                -1.0
            } else if axis == longest && p == extent.max[axis] {
                1.0
            } else {
                ((p - center[axis]) / scale).clamp(-1.0, 1.0)
            };
        }
    }
}

/// Parse, assemble and normalize an OBJ file into a buffer of `layout`.
pub fn load_mesh(path: impl AsRef<Path>, layout: VertexLayout) -> Result<MeshBuffer> {
    let path = path.as_ref();
    log::info!("Loading mesh {:?} as {:?}", path, layout);

    let source = load_obj_from_path(path)
        .with_context(|| format!("Failed to parse OBJ file: {}", path.display()))?;

    let (mut buffer, extent) = match layout {
        VertexLayout::PositionNormal => {
            assemble(&source.faces, &source.positions, source.normal_table())
        }
        VertexLayout::PositionNormalTexcoord => assemble_textured(&source),
        VertexLayout::PositionColor => assemble_colored(&source),
    }
    .with_context(|| format!("Failed to assemble vertices from {}", path.display()))?;

    normalize(&mut buffer, &extent);

    log::info!(
        "Loaded {} triangles ({} vertices, stride {}) from {:?}",
        buffer.vertex_count() / 3,
        buffer.vertex_count(),
        buffer.stride(),
        path
    );
    Ok(buffer)
}
