//! Terrain for the map tool: the new-map descriptor, heightmap generation,
//! and a grid mesh split into independently culled cells.

pub mod descriptor;
pub mod heightmap;
pub mod terrain;

pub use descriptor::{
    DescriptorError, MAX_SIZE, NewMapRequest, SIZE_CHOICES, TerrainDescriptor, size_from_choice,
};
pub use heightmap::HeightmapSampler;
pub use terrain::{CELL_LINE_COLOR, RenderStats, Terrain, TerrainCell, TerrainError};
