use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use super::{GridPos, PlacedTile, TileKind, Tilemap};
use crate::atomic_io::write_text_atomic;
use crate::geometry::Vec2;

#[derive(Debug, Error)]
pub enum MapFileError {
    #[error("map file not found: {0}")]
    NotFound(PathBuf),
    #[error("failed to read map file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write map file '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode map file '{path}': {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid map file '{path}': {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: MapFormatError,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapFormatError {
    #[error("malformed json at {at}: {message}")]
    Malformed { at: String, message: String },
    #[error("tilemap key '{key}' is not of the form x;y")]
    InvalidKey { key: String },
    #[error("tilemap key '{key}' does not match tile pos [{}, {}]", pos.x, pos.y)]
    KeyMismatch { key: String, pos: GridPos },
    #[error("tile_size must be greater than zero")]
    ZeroTileSize,
    #[error("offgrid[{index}].pos is not a finite position")]
    NonFinitePosition { index: usize },
}

#[derive(Debug, Serialize, Deserialize)]
struct MapDocument {
    tilemap: BTreeMap<String, GridRecord>,
    tile_size: u32,
    offgrid: Vec<OffgridRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GridRecord {
    #[serde(rename = "type")]
    kind: TileKind,
    variant: u32,
    pos: [i32; 2],
}

#[derive(Debug, Serialize, Deserialize)]
struct OffgridRecord {
    #[serde(rename = "type")]
    kind: TileKind,
    variant: u32,
    pos: [f32; 2],
}

impl Tilemap {
    pub fn save(&self, path: &Path) -> Result<(), MapFileError> {
        let document = MapDocument {
            tilemap: self
                .tiles
                .values()
                .map(|tile| {
                    (
                        tile.pos.key(),
                        GridRecord {
                            kind: tile.kind,
                            variant: tile.variant,
                            pos: [tile.pos.x, tile.pos.y],
                        },
                    )
                })
                .collect(),
            tile_size: self.tile_size,
            offgrid: self
                .offgrid
                .iter()
                .map(|tile| OffgridRecord {
                    kind: tile.kind,
                    variant: tile.variant,
                    pos: [tile.pos.x, tile.pos.y],
                })
                .collect(),
        };

        let json =
            serde_json::to_string_pretty(&document).map_err(|source| MapFileError::Encode {
                path: path.to_path_buf(),
                source,
            })?;
        write_text_atomic(path, &json).map_err(|source| MapFileError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        info!(
            path = %path.display(),
            tiles = self.tiles.len(),
            offgrid = self.offgrid.len(),
            "map_saved"
        );
        Ok(())
    }

    /// Parses a map file into a fresh tilemap.
    pub fn from_path(path: &Path) -> Result<Self, MapFileError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                return Err(MapFileError::NotFound(path.to_path_buf()));
            }
            Err(source) => {
                return Err(MapFileError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let tilemap = Self::from_json(&raw).map_err(|source| MapFileError::Format {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(
            path = %path.display(),
            tiles = tilemap.tile_count(),
            offgrid = tilemap.offgrid_count(),
            "map_parsed"
        );
        Ok(tilemap)
    }

    /// Replaces the whole tilemap with the file contents. On error `self` is untouched.
    pub fn load(&mut self, path: &Path) -> Result<(), MapFileError> {
        *self = Self::from_path(path)?;
        Ok(())
    }

    /// Like [`Tilemap::load`], but a missing file leaves the map as it is and
    /// returns `false`.
    pub fn load_if_exists(&mut self, path: &Path) -> Result<bool, MapFileError> {
        match self.load(path) {
            Ok(()) => Ok(true),
            Err(MapFileError::NotFound(_)) => {
                info!(path = %path.display(), "map_missing_starting_empty");
                Ok(false)
            }
            Err(error) => Err(error),
        }
    }

    pub(crate) fn from_json(raw: &str) -> Result<Self, MapFormatError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        let document: MapDocument = serde_path_to_error::deserialize(&mut deserializer)
            .map_err(|error| {
                let at = error.path().to_string();
                MapFormatError::Malformed {
                    at: if at.is_empty() { ".".to_string() } else { at },
                    message: error.into_inner().to_string(),
                }
            })?;
        Self::from_document(document)
    }

    fn from_document(document: MapDocument) -> Result<Self, MapFormatError> {
        let mut tilemap = Self::new(document.tile_size)?;
        for (key, record) in document.tilemap {
            let pos = GridPos::parse_key(&key)
                .ok_or_else(|| MapFormatError::InvalidKey { key: key.clone() })?;
            let stored = GridPos::new(record.pos[0], record.pos[1]);
            if stored != pos {
                return Err(MapFormatError::KeyMismatch { key, pos: stored });
            }
            tilemap.place(record.kind, record.variant, pos);
        }

        for (index, record) in document.offgrid.into_iter().enumerate() {
            let pos = Vec2::new(record.pos[0], record.pos[1]);
            if !pos.is_finite() {
                return Err(MapFormatError::NonFinitePosition { index });
            }
            tilemap.place_offgrid(PlacedTile {
                kind: record.kind,
                variant: record.variant,
                pos,
            });
        }

        Ok(tilemap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_map() -> Tilemap {
        let mut map = Tilemap::default();
        map.place(TileKind::Grass, 1, GridPos::new(-2, 7));
        map.place(TileKind::Spawners, 0, GridPos::new(3, 4));
        map.place_offgrid(PlacedTile {
            kind: TileKind::LargeDecor,
            variant: 2,
            pos: Vec2::new(41.5, -8.25),
        });
        map
    }

    #[test]
    fn save_then_load_restores_the_same_map() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("maps").join("0.json");
        let map = sample_map();

        map.save(&path).expect("save");
        let loaded = Tilemap::from_path(&path).expect("load");

        assert_eq!(loaded, map);
    }

    #[test]
    fn saved_document_uses_key_and_type_fields() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("map.json");
        sample_map().save(&path).expect("save");

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).expect("read")).expect("json");
        assert_eq!(value["tile_size"], 16);
        assert_eq!(value["tilemap"]["-2;7"]["type"], "grass");
        assert_eq!(value["tilemap"]["-2;7"]["pos"], serde_json::json!([-2, 7]));
        assert_eq!(value["offgrid"][0]["type"], "large_decor");
    }

    #[test]
    fn accepts_integer_offgrid_positions() {
        let raw = r#"{
            "tilemap": {"0;1": {"type": "stone", "variant": 3, "pos": [0, 1]}},
            "tile_size": 16,
            "offgrid": [{"type": "decor", "variant": 0, "pos": [12, 40]}]
        }"#;
        let map = Tilemap::from_json(raw).expect("parse");

        assert_eq!(map.tile_at(GridPos::new(0, 1)).expect("tile").variant, 3);
        assert_eq!(map.offgrid()[0].pos, Vec2::new(12.0, 40.0));
    }

    #[test]
    fn malformed_record_reports_json_path() {
        let raw = r#"{
            "tilemap": {"0;0": {"type": "lava", "variant": 0, "pos": [0, 0]}},
            "tile_size": 16,
            "offgrid": []
        }"#;
        match Tilemap::from_json(raw).expect_err("unknown kind") {
            MapFormatError::Malformed { at, .. } => assert_eq!(at, "tilemap.0;0.type"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_key_that_disagrees_with_pos() {
        let raw = r#"{
            "tilemap": {"1;1": {"type": "grass", "variant": 0, "pos": [1, 2]}},
            "tile_size": 16,
            "offgrid": []
        }"#;
        assert_eq!(
            Tilemap::from_json(raw).expect_err("mismatch"),
            MapFormatError::KeyMismatch {
                key: "1;1".to_string(),
                pos: GridPos::new(1, 2),
            }
        );
    }

    #[test]
    fn second_spelling_of_a_key_is_rejected_instead_of_overwriting() {
        let raw = r#"{
            "tilemap": {
                "1;2": {"type": "grass", "variant": 0, "pos": [1, 2]},
                "01;2": {"type": "stone", "variant": 0, "pos": [1, 2]}
            },
            "tile_size": 16,
            "offgrid": []
        }"#;

        assert_eq!(
            Tilemap::from_json(raw).expect_err("duplicate cell"),
            MapFormatError::InvalidKey {
                key: "01;2".to_string()
            }
        );
    }

    #[test]
    fn rejects_bad_key_and_zero_tile_size() {
        let bad_key = r#"{"tilemap": {"oops": {"type": "grass", "variant": 0, "pos": [0, 0]}}, "tile_size": 16, "offgrid": []}"#;
        assert!(matches!(
            Tilemap::from_json(bad_key),
            Err(MapFormatError::InvalidKey { .. })
        ));

        let zero = r#"{"tilemap": {}, "tile_size": 0, "offgrid": []}"#;
        assert_eq!(
            Tilemap::from_json(zero).expect_err("zero"),
            MapFormatError::ZeroTileSize
        );
    }

    #[test]
    fn failed_load_leaves_existing_map_untouched() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").expect("write");
        let mut map = sample_map();

        let error = map.load(&path).expect_err("broken");

        assert!(matches!(error, MapFileError::Format { .. }));
        assert!(error.to_string().contains("broken.json"));
        assert_eq!(map, sample_map());
    }

    #[test]
    fn load_if_exists_keeps_empty_map_for_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut map = Tilemap::default();

        let loaded = map
            .load_if_exists(&dir.path().join("map.json"))
            .expect("missing is fine");

        assert!(!loaded);
        assert_eq!(map.tile_count(), 0);
    }

    #[test]
    fn from_path_reports_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(matches!(
            Tilemap::from_path(&dir.path().join("7.json")),
            Err(MapFileError::NotFound(_))
        ));
    }
}
