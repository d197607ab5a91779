//! Regular grid terrain mesh
//!
//! Vertex `(x, z)` lives at index `z * (width + 1) + x`. Each cell emits two
//! triangles `(v, v+w+1, v+1)` and `(v+1, v+w+1, v+w+2)`, which wind
//! counter-clockwise when seen from +Y so face normals point up.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use super::biome::{denormalize_index, normalize_index};
use crate::math::Aabb;

/// Render color used for river vertices in place of the biome encoding.
pub const RIVER_COLOR: [f32; 4] = [0.0, 0.0, 1.0, 1.0];

/// Typed per-vertex classification.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VertexAttribute {
    pub biome_index: usize,
    pub blend_weight: f32,
    pub river: bool,
}

impl VertexAttribute {
    /// Packed render color `[blend, normalized_index, river, 1]`.
    ///
    /// River vertices always pack to [`RIVER_COLOR`].
    pub fn packed_color(&self, biome_count: usize) -> [f32; 4] {
        if self.river {
            return RIVER_COLOR;
        }
        [
            self.blend_weight,
            normalize_index(self.biome_index, biome_count),
            0.0,
            1.0,
        ]
    }

    /// Recover `(biome_index, blend_weight)` from a packed color.
    pub fn decode(color: [f32; 4], biome_count: usize) -> (usize, f32) {
        (denormalize_index(color[1], biome_count), color[0])
    }

    /// `(biome_index, blend_weight)` as seen by object placement. River
    /// vertices report what their packed color decodes to: index 0, weight 0.
    pub fn spawn_sample(&self) -> (usize, f32) {
        if self.river {
            (0, 0.0)
        } else {
            (self.biome_index, self.blend_weight)
        }
    }
}

/// Interleaved vertex for GPU upload.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct GpuVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
}

/// Fully built terrain geometry. Rebuilt as a whole on every generation.
#[derive(Clone, Debug)]
pub struct TerrainMesh {
    width: u32,
    depth: u32,
    biome_count: usize,
    vertices: Vec<Vec3>,
    indices: Vec<u32>,
    attributes: Vec<VertexAttribute>,
    normals: Vec<Vec3>,
    bounds: Aabb,
}

impl TerrainMesh {
    /// Assemble a mesh from row-major vertex data, deriving indices,
    /// normals and bounds.
    ///
    /// `vertices` and `attributes` must both hold `(width + 1) * (depth + 1)` entries.
    pub fn from_parts(
        width: u32,
        depth: u32,
        vertices: Vec<Vec3>,
        attributes: Vec<VertexAttribute>,
        biome_count: usize,
    ) -> Self {
        debug_assert_eq!(vertices.len(), grid_vertex_count(width, depth));
        debug_assert_eq!(vertices.len(), attributes.len());

        let indices = grid_indices(width, depth);
        let normals = compute_normals(&vertices, &indices);
        let bounds = Aabb::from_points(&vertices).unwrap_or_default();

        Self {
            width,
            depth,
            biome_count,
            vertices,
            indices,
            attributes,
            normals,
            bounds,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn biome_count(&self) -> usize {
        self.biome_count
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    /// Local-space bounds (before any world offset).
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Index of grid vertex `(x, z)`.
    #[inline]
    pub fn vertex_index(&self, x: u32, z: u32) -> usize {
        z as usize * (self.width as usize + 1) + x as usize
    }

    /// Packed render colors, one per vertex.
    pub fn colors(&self) -> Vec<[f32; 4]> {
        self.attributes
            .iter()
            .map(|a| a.packed_color(self.biome_count))
            .collect()
    }

    /// Number of vertices flagged as river.
    pub fn river_vertex_count(&self) -> usize {
        self.attributes.iter().filter(|a| a.river).count()
    }

    /// Interleaved position/normal/color buffer.
    pub fn gpu_vertices(&self) -> Vec<GpuVertex> {
        self.vertices
            .iter()
            .zip(&self.normals)
            .zip(&self.attributes)
            .map(|((p, n), a)| GpuVertex {
                position: p.to_array(),
                normal: n.to_array(),
                color: a.packed_color(self.biome_count),
            })
            .collect()
    }

    /// Height of the triangulated surface at local `(x, z)`, or `None`
    /// outside the grid.
    pub fn sample_height(&self, x: f32, z: f32) -> Option<f32> {
        if self.width == 0 || self.depth == 0 {
            return None;
        }
        let (w, d) = (self.width as f32, self.depth as f32);
        if !(0.0..=w).contains(&x) || !(0.0..=d).contains(&z) {
            return None;
        }

        let cx = (x.floor() as u32).min(self.width - 1);
        let cz = (z.floor() as u32).min(self.depth - 1);
        let fx = x - cx as f32;
        let fz = z - cz as f32;

        let h = |gx: u32, gz: u32| self.vertices[self.vertex_index(gx, gz)].y;
        let h00 = h(cx, cz);
        let h10 = h(cx + 1, cz);
        let h01 = h(cx, cz + 1);
        let h11 = h(cx + 1, cz + 1);

        // The cell diagonal runs from (x+1, z) to (x, z+1).
        let height = if fx + fz <= 1.0 {
            h00 + (h10 - h00) * fx + (h01 - h00) * fz
        } else {
            h11 + (h01 - h11) * (1.0 - fx) + (h10 - h11) * (1.0 - fz)
        };
        Some(height)
    }
}

/// Vertex count of a `width` x `depth` cell grid.
pub fn grid_vertex_count(width: u32, depth: u32) -> usize {
    (width as usize + 1) * (depth as usize + 1)
}

/// Index buffer for a `width` x `depth` cell grid, in row-major cell order.
pub fn grid_indices(width: u32, depth: u32) -> Vec<u32> {
    let mut indices = Vec::with_capacity(width as usize * depth as usize * 6);
    let row = width + 1;
    for z in 0..depth {
        for x in 0..width {
            let v = z * row + x;
            indices.extend_from_slice(&[
                v,
                v + row,
                v + 1,
                v + 1,
                v + row,
                v + row + 1,
            ]);
        }
    }
    indices
}

/// Per-vertex normals averaged from the area-weighted normals of every
/// adjacent face.
pub fn compute_normals(vertices: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; vertices.len()];
    for tri in indices.chunks_exact(3) {
        let (i0, i1, i2) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let (a, b, c) = (vertices[i0], vertices[i1], vertices[i2]);
        let face = (b - a).cross(c - a);
        normals[i0] += face;
        normals[i1] += face;
        normals[i2] += face;
    }
    for n in &mut normals {
        *n = n.try_normalize().unwrap_or(Vec3::Y);
    }
    normals
}
