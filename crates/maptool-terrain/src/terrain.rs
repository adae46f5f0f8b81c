//! Grid terrain split into square cells.
//!
//! The grid spans `quads_per_side` unit quads along +X and -Z from the
//! origin, so grid row `r` lies at world `z = -r`. Each cell owns a triangle
//! mesh, a line mesh of its bounding box, and the box itself, so it can be
//! culled and drawn on its own. Cells are numbered row-major:
//! `index = row * tile_size + column`, rows advancing toward -Z.

use glam::{Vec3, Vec4};
use thiserror::Error;
use tracing::{debug, info, warn};

use maptool_render::{
    Aabb, DeviceError, Frustum, MeshDesc, MeshHandle, RenderDevice, VertexData,
    VertexPositionColor, VertexPositionNormalUv,
};

use crate::descriptor::{MAX_SIZE, TerrainDescriptor};
use crate::heightmap::HeightmapSampler;

/// Color of the cell boundary lines.
pub const CELL_LINE_COLOR: Vec4 = Vec4::new(1.0, 1.0, 0.0, 1.0);

/// Bounding-box edges as corner index pairs (see [`Aabb::corners`]).
#[rustfmt::skip]
const BOX_EDGES: [[u32; 2]; 12] = [
    [0, 1], [1, 2], [2, 3], [3, 0],
    [4, 5], [5, 6], [6, 7], [7, 4],
    [0, 4], [1, 5], [2, 6], [3, 7],
];

/// Slack added to cell bounds before the ray slab test.
const RAY_BOUNDS_EPSILON: f32 = 1e-3;

/// Errors from building or drawing terrain.
#[derive(Debug, Error)]
pub enum TerrainError {
    #[error(
        "terrain needs at least one quad per cell and one cell per side \
         (cell size {cell_size}, tile size {tile_size})"
    )]
    EmptyGrid { cell_size: u32, tile_size: u32 },

    #[error("terrain sizes are limited to {max} (cell size {cell_size}, tile size {tile_size})")]
    GridTooLarge { cell_size: u32, tile_size: u32, max: u32 },

    #[error("device error on terrain cell {cell}: {source}")]
    Device {
        cell: usize,
        #[source]
        source: DeviceError,
    },

    #[error("terrain has no cell {0}")]
    NoSuchCell(usize),
}

/// Per-frame culling statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Cells tested this frame.
    pub render_count: usize,
    /// Cells that passed the frustum test.
    pub cells_drawn: usize,
    /// Cells rejected by the frustum test.
    pub cells_culled: usize,
}

/// One independently culled piece of the terrain.
#[derive(Clone, Debug)]
pub struct TerrainCell {
    bounds: Aabb,
    mesh: MeshHandle,
    lines: MeshHandle,
    index_count: u32,
    line_index_count: u32,
}

impl TerrainCell {
    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn line_index_count(&self) -> u32 {
        self.line_index_count
    }
}

/// The terrain heightfield and its cell meshes.
#[derive(Debug)]
pub struct Terrain {
    cell_size: u32,
    tile_size: u32,
    heights: Vec<f32>,
    cells: Vec<TerrainCell>,
    stats: RenderStats,
}

impl Terrain {
    /// Generate the heightfield for `desc` and upload every cell.
    ///
    /// If an upload fails, the meshes created so far are released before the
    /// error is returned.
    pub fn new(
        device: &mut dyn RenderDevice,
        desc: &TerrainDescriptor,
    ) -> Result<Self, TerrainError> {
        let (cell_size, tile_size) = (desc.cell_size, desc.tile_size);
        if cell_size == 0 || tile_size == 0 {
            return Err(TerrainError::EmptyGrid { cell_size, tile_size });
        }
        if cell_size > MAX_SIZE || tile_size > MAX_SIZE {
            return Err(TerrainError::GridTooLarge {
                cell_size,
                tile_size,
                max: MAX_SIZE,
            });
        }

        let mut terrain = Self {
            cell_size: desc.cell_size,
            tile_size: desc.tile_size,
            heights: generate_heights(desc),
            cells: Vec::with_capacity(desc.cell_count()),
            stats: RenderStats::default(),
        };

        for index in 0..desc.cell_count() {
            match terrain.build_cell(device, index) {
                Ok(cell) => terrain.cells.push(cell),
                Err(source) => {
                    warn!(
                        cell = index,
                        "terrain cell upload failed, releasing {} cells",
                        terrain.cells.len()
                    );
                    terrain.release(device);
                    return Err(TerrainError::Device { cell: index, source });
                }
            }
        }

        info!(
            cells = terrain.cells.len(),
            quads_per_side = terrain.quads_per_side(),
            "terrain built"
        );
        Ok(terrain)
    }

    /// Free every cell mesh.
    pub fn release(self, device: &mut dyn RenderDevice) {
        for cell in &self.cells {
            for handle in [cell.mesh, cell.lines] {
                if let Err(e) = device.release_mesh(handle) {
                    warn!("failed to release terrain mesh: {e}");
                }
            }
        }
        debug!("released {} terrain cells", self.cells.len());
    }

    pub fn quads_per_side(&self) -> u32 {
        self.cell_size * self.tile_size
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn cells(&self) -> &[TerrainCell] {
        &self.cells
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    /// Start a new frame of statistics.
    pub fn frame(&mut self) {
        self.stats = RenderStats::default();
    }

    /// Frustum-test cell `index` and, if visible, bind its mesh.
    ///
    /// Returns the index count to draw, or `None` when the cell was culled.
    pub fn render_cell(
        &mut self,
        device: &mut dyn RenderDevice,
        index: usize,
        frustum: &Frustum,
    ) -> Result<Option<u32>, TerrainError> {
        let cell = self.cells.get(index).ok_or(TerrainError::NoSuchCell(index))?;
        self.stats.render_count += 1;
        if !frustum.is_visible(&cell.bounds) {
            self.stats.cells_culled += 1;
            return Ok(None);
        }
        device
            .bind_mesh(cell.mesh)
            .map_err(|source| TerrainError::Device { cell: index, source })?;
        self.stats.cells_drawn += 1;
        Ok(Some(cell.index_count))
    }

    /// Bind the boundary lines of cell `index`, returning their index count.
    pub fn render_cell_lines(
        &self,
        device: &mut dyn RenderDevice,
        index: usize,
    ) -> Result<u32, TerrainError> {
        let cell = self.cells.get(index).ok_or(TerrainError::NoSuchCell(index))?;
        device
            .bind_mesh(cell.lines)
            .map_err(|source| TerrainError::Device { cell: index, source })?;
        Ok(cell.line_index_count)
    }

    /// Terrain surface height below world `(x, z)`, `None` outside the grid.
    pub fn height_at_position(&self, x: f32, z: f32) -> Option<f32> {
        let n = self.quads_per_side();
        let extent = n as f32;
        let gz = -z;
        if !(0.0..=extent).contains(&x) || !(0.0..=extent).contains(&gz) {
            return None;
        }
        let qx = (x.floor() as u32).min(n - 1);
        let qz = (gz.floor() as u32).min(n - 1);
        let (fx, fz) = (x - qx as f32, gz - qz as f32);

        let h00 = self.height(qx, qz);
        let h10 = self.height(qx + 1, qz);
        let h01 = self.height(qx, qz + 1);
        let h11 = self.height(qx + 1, qz + 1);

        // Quads are split along the (1,0)-(0,1) diagonal.
        let h = if fx + fz <= 1.0 {
            h00 + fx * (h10 - h00) + fz * (h01 - h00)
        } else {
            h11 + (1.0 - fx) * (h01 - h11) + (1.0 - fz) * (h10 - h11)
        };
        Some(h)
    }

    /// Nearest point where the ray from `origin` along `direction` meets the surface.
    pub fn raycast(&self, origin: Vec3, direction: Vec3) -> Option<Vec3> {
        let direction = direction.try_normalize()?;
        let mut nearest: Option<f32> = None;

        for (index, cell) in self.cells.iter().enumerate() {
            let padded = Aabb::new(
                cell.bounds.min - Vec3::splat(RAY_BOUNDS_EPSILON),
                cell.bounds.max + Vec3::splat(RAY_BOUNDS_EPSILON),
            );
            let Some(entry) = padded.ray_entry(origin, direction) else {
                continue;
            };
            if nearest.is_some_and(|t| t < entry) {
                continue;
            }
            let (col, row) = self.cell_coords(index);
            let c = self.cell_size;
            for qz in row * c..(row + 1) * c {
                for qx in col * c..(col + 1) * c {
                    for [a, b, d] in self.quad_triangles(qx, qz) {
                        if let Some(t) = ray_triangle(origin, direction, a, b, d)
                            && nearest.is_none_or(|best| t < best)
                        {
                            nearest = Some(t);
                        }
                    }
                }
            }
        }

        nearest.map(|t| origin + direction * t)
    }

    fn cell_coords(&self, index: usize) -> (u32, u32) {
        let tile = self.tile_size as usize;
        ((index % tile) as u32, (index / tile) as u32)
    }

    fn height(&self, x: u32, z: u32) -> f32 {
        let stride = self.quads_per_side() as usize + 1;
        self.heights[z as usize * stride + x as usize]
    }

    /// World position of grid vertex `(x, z)`.
    fn position(&self, x: u32, z: u32) -> Vec3 {
        Vec3::new(x as f32, self.height(x, z), -(z as f32))
    }

    fn normal(&self, x: u32, z: u32) -> Vec3 {
        let n = self.quads_per_side();
        let (x0, x1) = (x.saturating_sub(1), (x + 1).min(n));
        let (z0, z1) = (z.saturating_sub(1), (z + 1).min(n));
        let dhdx = (self.height(x1, z) - self.height(x0, z)) / (x1 - x0) as f32;
        // Slope along grid rows, which run toward world -Z.
        let dhdr = (self.height(x, z1) - self.height(x, z0)) / (z1 - z0) as f32;
        Vec3::new(-dhdx, 1.0, dhdr).normalize()
    }

    fn quad_triangles(&self, qx: u32, qz: u32) -> [[Vec3; 3]; 2] {
        let v00 = self.position(qx, qz);
        let v10 = self.position(qx + 1, qz);
        let v01 = self.position(qx, qz + 1);
        let v11 = self.position(qx + 1, qz + 1);
        [[v00, v10, v01], [v10, v11, v01]]
    }

    fn build_cell(
        &self,
        device: &mut dyn RenderDevice,
        index: usize,
    ) -> Result<TerrainCell, DeviceError> {
        let c = self.cell_size;
        let (col, row) = self.cell_coords(index);
        let side = c + 1;

        let mut vertices = Vec::with_capacity((side * side) as usize);
        for lz in 0..=c {
            for lx in 0..=c {
                let (gx, gz) = (col * c + lx, row * c + lz);
                vertices.push(VertexPositionNormalUv {
                    position: self.position(gx, gz).to_array(),
                    normal: self.normal(gx, gz).to_array(),
                    uv: [lx as f32 / c as f32, lz as f32 / c as f32],
                });
            }
        }

        let mut indices = Vec::with_capacity((c * c * 6) as usize);
        for lz in 0..c {
            for lx in 0..c {
                let v00 = lz * side + lx;
                let v10 = v00 + 1;
                let v01 = v00 + side;
                let v11 = v01 + 1;
                // Counter-clockwise seen from above.
                indices.extend_from_slice(&[v00, v10, v01, v10, v11, v01]);
            }
        }

        let bounds = Aabb::from_points(vertices.iter().map(|v| Vec3::from_array(v.position)))
            .unwrap_or(Aabb::new(Vec3::ZERO, Vec3::ZERO));

        let label = format!("terrain cell {index}");
        let mesh = device.create_mesh(&MeshDesc::triangles(
            &label,
            VertexData::PositionNormalUv(&vertices),
            &indices,
        ))?;

        let line_vertices: Vec<VertexPositionColor> = bounds
            .corners()
            .iter()
            .map(|p| VertexPositionColor {
                position: p.to_array(),
                color: CELL_LINE_COLOR.to_array(),
            })
            .collect();
        let line_indices: Vec<u32> = BOX_EDGES.iter().flatten().copied().collect();
        let line_label = format!("terrain cell {index} lines");
        let lines = match device.create_mesh(&MeshDesc::lines(
            &line_label,
            VertexData::PositionColor(&line_vertices),
            &line_indices,
        )) {
            Ok(lines) => lines,
            Err(e) => {
                if let Err(release) = device.release_mesh(mesh) {
                    warn!("failed to release {label}: {release}");
                }
                return Err(e);
            }
        };

        Ok(TerrainCell {
            bounds,
            mesh,
            lines,
            index_count: indices.len() as u32,
            line_index_count: line_indices.len() as u32,
        })
    }
}

fn generate_heights(desc: &TerrainDescriptor) -> Vec<f32> {
    HeightmapSampler::new(desc.seed).grid(desc.quads_per_side() + 1, desc.height_scale)
}

/// Möller-Trumbore ray/triangle test, returning the distance along the ray.
fn ray_triangle(origin: Vec3, direction: Vec3, a: Vec3, b: Vec3, c: Vec3) -> Option<f32> {
    let e1 = b - a;
    let e2 = c - a;
    let p = direction.cross(e2);
    let det = e1.dot(p);
    if det.abs() < 1e-8 {
        return None;
    }
    let inv_det = 1.0 / det;
    let s = origin - a;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(e1);
    let v = direction.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = e2.dot(q) * inv_det;
    (t >= 0.0).then_some(t)
}
