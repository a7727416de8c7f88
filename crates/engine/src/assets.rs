use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use image::ImageReader;
use thiserror::Error;
use tracing::debug;

use crate::animation::{AnimationError, Clip};
use crate::geometry::Vec2;
use crate::sprite::Sprite;
use crate::tilemap::{TileKind, Tilemap};

/// Pixels of exactly this colour are treated as transparent.
pub const COLOR_KEY: [u8; 3] = [0, 0, 0];

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to decode image '{path}': {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("decoded image '{0}' has inconsistent dimensions")]
    Dimensions(PathBuf),
    #[error("image directory '{0}' contains no images")]
    EmptyDirectory(PathBuf),
    #[error("no image for tile {kind} variant {variant}")]
    MissingTileImage { kind: TileKind, variant: u32 },
    #[error("invalid animation in '{path}': {source}")]
    Animation {
        path: PathBuf,
        #[source]
        source: AnimationError,
    },
}

/// Decodes one image and applies the colour key.
pub fn load_image(path: &Path) -> Result<Sprite, AssetError> {
    let reader = ImageReader::open(path).map_err(|source| AssetError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let decoded = reader.decode().map_err(|source| AssetError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let image = decoded.to_rgba8();
    let (width, height) = (image.width(), image.height());
    let mut rgba = image.into_raw();
    apply_color_key(&mut rgba);
    Sprite::from_rgba(width, height, rgba).ok_or_else(|| AssetError::Dimensions(path.to_path_buf()))
}

/// Every image in `dir`, ordered by file name.
pub fn load_images(dir: &Path) -> Result<Vec<Sprite>, AssetError> {
    let read_error = |source| AssetError::Read {
        path: dir.to_path_buf(),
        source,
    };
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_error)? {
        let entry = entry.map_err(read_error)?;
        if entry.file_type().map_err(read_error)?.is_file() {
            paths.push(entry.path());
        }
    }
    if paths.is_empty() {
        return Err(AssetError::EmptyDirectory(dir.to_path_buf()));
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    let sprites = paths
        .iter()
        .map(|path| load_image(path))
        .collect::<Result<Vec<_>, _>>()?;
    debug!(dir = %dir.display(), images = sprites.len(), "images_loaded");
    Ok(sprites)
}

pub fn load_clip(dir: &Path, frame_duration: u32, looping: bool) -> Result<Clip, AssetError> {
    let frames = load_images(dir)?;
    Clip::new(frames, frame_duration, looping).map_err(|source| AssetError::Animation {
        path: dir.to_path_buf(),
        source,
    })
}

fn apply_color_key(rgba: &mut [u8]) {
    for pixel in rgba.chunks_exact_mut(4) {
        if pixel[..3] == COLOR_KEY {
            pixel[3] = 0;
        }
    }
}

/// One image per tile `(kind, variant)`; variants index the kind's image list.
#[derive(Debug, Default, Clone)]
pub struct TileAtlas {
    images: HashMap<TileKind, Vec<Sprite>>,
}

impl TileAtlas {
    /// Loads `tiles_root/<kind>/` for each kind.
    pub fn load(tiles_root: &Path, kinds: &[TileKind]) -> Result<Self, AssetError> {
        let mut atlas = Self::default();
        for &kind in kinds {
            atlas.insert(kind, load_images(&tiles_root.join(kind.as_str()))?);
        }
        Ok(atlas)
    }

    pub fn insert(&mut self, kind: TileKind, images: Vec<Sprite>) {
        self.images.insert(kind, images);
    }

    pub fn sprite(&self, kind: TileKind, variant: u32) -> Option<&Sprite> {
        self.images.get(&kind)?.get(variant as usize)
    }

    pub fn variant_count(&self, kind: TileKind) -> usize {
        self.images.get(&kind).map_or(0, Vec::len)
    }

    /// Drawn size of a tile image, zero when it is unknown.
    pub fn extent(&self, kind: TileKind, variant: u32) -> Vec2 {
        self.sprite(kind, variant).map_or(Vec2::ZERO, |sprite| {
            Vec2::new(sprite.width() as f32, sprite.height() as f32)
        })
    }

    /// Fails on the first tile, on-grid or off-grid, that has no image.
    pub fn validate(&self, tilemap: &Tilemap) -> Result<(), AssetError> {
        let on_grid = tilemap.tiles().map(|tile| (tile.kind, tile.variant));
        let off_grid = tilemap.offgrid().iter().map(|tile| (tile.kind, tile.variant));
        for (kind, variant) in on_grid.chain(off_grid) {
            if self.sprite(kind, variant).is_none() {
                return Err(AssetError::MissingTileImage { kind, variant });
            }
        }
        Ok(())
    }
}
