//! Parameters of a new terrain, as chosen in the new-map dialog.

use thiserror::Error;

use maptool_render::TextureCatalog;

/// Sizes offered by the cell-size and tile-size radio groups, by index.
pub const SIZE_CHOICES: [u32; 5] = [4, 8, 16, 32, 64];

/// Largest cell or tile size a terrain may be built with.
pub const MAX_SIZE: u32 = SIZE_CHOICES[SIZE_CHOICES.len() - 1];

/// Errors raised while confirming a new-map request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("size choice {0} is outside the offered range 0..=4")]
    InvalidSizeChoice(u32),

    #[error("no texture selected")]
    NoTextureSelected,

    #[error("texture '{0}' is not in the texture catalog")]
    UnknownTexture(String),
}

/// Map a radio-group index to a size.
pub fn size_from_choice(choice: u32) -> Result<u32, DescriptorError> {
    SIZE_CHOICES
        .get(choice as usize)
        .copied()
        .ok_or(DescriptorError::InvalidSizeChoice(choice))
}

/// Everything needed to build a terrain.
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainDescriptor {
    /// Quads along each edge of one cell.
    pub cell_size: u32,
    /// Cells along each edge of the terrain.
    pub tile_size: u32,
    /// Index of the selected texture in the texture catalog.
    pub texture_index: usize,
    /// Vertical scale of the generated heights. Zero gives flat ground.
    pub height_scale: f32,
    /// Heightmap noise seed.
    pub seed: u32,
}

impl Default for TerrainDescriptor {
    fn default() -> Self {
        Self {
            cell_size: 8,
            tile_size: 4,
            texture_index: 0,
            height_scale: 0.0,
            seed: 0,
        }
    }
}

impl TerrainDescriptor {
    /// Quads along each edge of the whole terrain.
    pub fn quads_per_side(&self) -> u32 {
        self.cell_size * self.tile_size
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        (self.tile_size as usize).pow(2)
    }
}

/// State of the new-map dialog before the user confirms it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NewMapRequest {
    pub cell_size_choice: u32,
    pub tile_size_choice: u32,
    pub texture: Option<usize>,
    pub height_scale: f32,
    pub seed: u32,
}

impl NewMapRequest {
    /// Select the texture with file name `name` from `catalog`.
    pub fn select_texture(
        &mut self,
        catalog: &TextureCatalog,
        name: &str,
    ) -> Result<(), DescriptorError> {
        let index = catalog
            .position(name)
            .ok_or_else(|| DescriptorError::UnknownTexture(name.to_string()))?;
        self.texture = Some(index);
        Ok(())
    }

    /// Validate the request and produce a descriptor. A texture must be selected.
    pub fn confirm(&self) -> Result<TerrainDescriptor, DescriptorError> {
        let texture_index = self.texture.ok_or(DescriptorError::NoTextureSelected)?;
        Ok(TerrainDescriptor {
            cell_size: size_from_choice(self.cell_size_choice)?,
            tile_size: size_from_choice(self.tile_size_choice)?,
            texture_index,
            height_scale: self.height_scale,
            seed: self.seed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_choices_map_to_powers_of_two() {
        let sizes: Vec<u32> = (0..5).map(|i| size_from_choice(i).unwrap()).collect();
        assert_eq!(sizes, vec![4, 8, 16, 32, 64]);
        assert_eq!(size_from_choice(5), Err(DescriptorError::InvalidSizeChoice(5)));
    }

    #[test]
    fn test_confirm_requires_texture() {
        let request = NewMapRequest::default();
        assert_eq!(request.confirm(), Err(DescriptorError::NoTextureSelected));
    }

    #[test]
    fn test_confirm_builds_descriptor() {
        let catalog =
            TextureCatalog::from_names("t", vec!["dirt.png".into(), "grass.png".into()]);
        let mut request = NewMapRequest {
            cell_size_choice: 2,
            tile_size_choice: 0,
            ..Default::default()
        };
        request.select_texture(&catalog, "grass.png").unwrap();
        let desc = request.confirm().unwrap();
        assert_eq!(desc.cell_size, 16);
        assert_eq!(desc.tile_size, 4);
        assert_eq!(desc.texture_index, 1);
        assert_eq!(desc.quads_per_side(), 64);
        assert_eq!(desc.cell_count(), 16);
    }

    #[test]
    fn test_unknown_texture_rejected() {
        let catalog = TextureCatalog::from_names("t", vec!["dirt.png".into()]);
        let mut request = NewMapRequest::default();
        assert_eq!(
            request.select_texture(&catalog, "snow.png"),
            Err(DescriptorError::UnknownTexture("snow.png".into()))
        );
        assert!(request.texture.is_none());
    }

    #[test]
    fn test_invalid_choice_reported_after_texture() {
        let request = NewMapRequest {
            tile_size_choice: 9,
            texture: Some(0),
            ..Default::default()
        };
        assert_eq!(request.confirm(), Err(DescriptorError::InvalidSizeChoice(9)));
    }
}
