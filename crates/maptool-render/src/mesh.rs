//! Vertex layouts and mesh descriptions handed to the device.

use bytemuck::{Pod, Zeroable};

/// Position + color vertex for lines and flat-colored geometry.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct VertexPositionColor {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

/// Position + normal + texture coordinate vertex for lit terrain.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct VertexPositionNormalUv {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// Position + texture coordinate vertex for overlay text.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct VertexPositionUv {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

/// Primitive assembly for a mesh.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Topology {
    TriangleList,
    LineList,
}

/// Borrowed vertex data of one of the supported layouts.
#[derive(Clone, Copy, Debug)]
pub enum VertexData<'a> {
    PositionColor(&'a [VertexPositionColor]),
    PositionNormalUv(&'a [VertexPositionNormalUv]),
    PositionUv(&'a [VertexPositionUv]),
}

impl VertexData<'_> {
    /// Number of vertices.
    pub fn len(&self) -> usize {
        match self {
            Self::PositionColor(v) => v.len(),
            Self::PositionNormalUv(v) => v.len(),
            Self::PositionUv(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw bytes for upload.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::PositionColor(v) => bytemuck::cast_slice(v),
            Self::PositionNormalUv(v) => bytemuck::cast_slice(v),
            Self::PositionUv(v) => bytemuck::cast_slice(v),
        }
    }

    /// Size of one vertex in bytes.
    pub fn stride(&self) -> usize {
        match self {
            Self::PositionColor(_) => std::mem::size_of::<VertexPositionColor>(),
            Self::PositionNormalUv(_) => std::mem::size_of::<VertexPositionNormalUv>(),
            Self::PositionUv(_) => std::mem::size_of::<VertexPositionUv>(),
        }
    }
}

/// Everything the device needs to create or rewrite a mesh.
#[derive(Clone, Copy, Debug)]
pub struct MeshDesc<'a> {
    pub label: &'a str,
    pub topology: Topology,
    pub vertices: VertexData<'a>,
    pub indices: &'a [u32],
}

impl<'a> MeshDesc<'a> {
    pub fn triangles(label: &'a str, vertices: VertexData<'a>, indices: &'a [u32]) -> Self {
        Self {
            label,
            topology: Topology::TriangleList,
            vertices,
            indices,
        }
    }

    pub fn lines(label: &'a str, vertices: VertexData<'a>, indices: &'a [u32]) -> Self {
        Self {
            label,
            topology: Topology::LineList,
            vertices,
            indices,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_sizes() {
        assert_eq!(std::mem::size_of::<VertexPositionColor>(), 28);
        assert_eq!(std::mem::size_of::<VertexPositionNormalUv>(), 32);
        assert_eq!(std::mem::size_of::<VertexPositionUv>(), 20);
    }

    #[test]
    fn test_vertex_bytes_match_stride() {
        let verts = [VertexPositionUv::zeroed(); 3];
        let data = VertexData::PositionUv(&verts);
        assert_eq!(data.len(), 3);
        assert_eq!(data.as_bytes().len(), 3 * data.stride());
    }
}
