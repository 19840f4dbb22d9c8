//! Mesh data as supplied by the host tessellator.

use glam::{Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// A single mesh face. Quads are carried as authored and fanned into
/// triangles at serialization time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeshFace {
    /// Triangle face.
    Triangle([u32; 3]),
    /// Quad face.
    Quad([u32; 4]),
}

impl MeshFace {
    /// Number of triangles this face expands to.
    pub fn triangle_count(&self) -> usize {
        match self {
            MeshFace::Triangle(_) => 1,
            MeshFace::Quad(_) => 2,
        }
    }
}

/// Render-mesh data for one piece of an object.
///
/// Per-vertex arrays are either empty or share the vertex count of
/// `positions`. The host is responsible for welding and tessellation;
/// this type only carries the result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeshData {
    /// Vertex positions.
    pub positions: Vec<Vec3>,
    /// Vertex normals (empty when absent).
    pub normals: Vec<Vec3>,
    /// Texture coordinates (empty when absent).
    pub texcoords: Vec<Vec2>,
    /// Vertex colors, RGBA in `[0, 1]` (empty when absent).
    pub colors: Vec<Vec4>,
    /// Faces, mixed triangles and quads.
    pub faces: Vec<MeshFace>,
    /// Whether the mesh is closed (host-computed; consumed by the
    /// open-mesh export filter).
    pub closed: bool,
}

impl MeshData {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh from positions and a flat triangle index list.
    pub fn from_triangles(positions: Vec<Vec3>, indices: &[u32]) -> Self {
        let faces = indices
            .chunks_exact(3)
            .map(|t| MeshFace::Triangle([t[0], t[1], t[2]]))
            .collect();
        Self {
            positions,
            faces,
            ..Default::default()
        }
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles after quad fanning.
    pub fn triangle_count(&self) -> usize {
        self.faces.iter().map(MeshFace::triangle_count).sum()
    }

    /// Flatten faces to a triangle index list. Quads fan from their
    /// first vertex: `(a, b, c, d)` becomes `(a, b, c)` and `(a, c, d)`.
    pub fn triangulated_indices(&self) -> Vec<u32> {
        let mut indices = Vec::with_capacity(self.triangle_count() * 3);
        for face in &self.faces {
            match *face {
                MeshFace::Triangle([a, b, c]) => indices.extend_from_slice(&[a, b, c]),
                MeshFace::Quad([a, b, c, d]) => {
                    indices.extend_from_slice(&[a, b, c]);
                    indices.extend_from_slice(&[a, c, d]);
                }
            }
        }
        indices
    }

    /// Whether the optional per-vertex arrays are empty or match the
    /// vertex count.
    pub fn attributes_consistent(&self) -> bool {
        let n = self.positions.len();
        (self.normals.is_empty() || self.normals.len() == n)
            && (self.texcoords.is_empty() || self.texcoords.len() == n)
            && (self.colors.is_empty() || self.colors.len() == n)
    }

    /// Export validity filter: a mesh must have vertices, faces,
    /// consistent attribute arrays, and (unless `allow_open`) be closed.
    pub fn is_valid_for_export(&self, allow_open: bool) -> bool {
        if self.positions.is_empty() || self.faces.is_empty() {
            return false;
        }
        if !self.attributes_consistent() {
            return false;
        }
        allow_open || self.closed
    }

    /// Compute area-weighted vertex normals from face windings. Does
    /// nothing when normals are already present.
    pub fn compute_normals(&mut self) {
        if !self.normals.is_empty() {
            return;
        }
        let mut normals = vec![Vec3::ZERO; self.positions.len()];
        let indices = self.triangulated_indices();
        for triangle in indices.chunks_exact(3) {
            let (i0, i1, i2) = (
                triangle[0] as usize,
                triangle[1] as usize,
                triangle[2] as usize,
            );
            if i0 >= normals.len() || i1 >= normals.len() || i2 >= normals.len() {
                continue;
            }
            let normal = (self.positions[i1] - self.positions[i0])
                .cross(self.positions[i2] - self.positions[i0]);
            normals[i0] += normal;
            normals[i1] += normal;
            normals[i2] += normal;
        }
        for normal in &mut normals {
            *normal = normal.normalize_or_zero();
        }
        self.normals = normals;
    }

    /// Component-wise position bounds, or `None` for an empty mesh.
    pub fn position_bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.positions.first()?;
        let mut min = first;
        let mut max = first;
        for p in &self.positions[1..] {
            min = min.min(*p);
            max = max.max(*p);
        }
        Some((min, max))
    }
}
