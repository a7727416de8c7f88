mod autotile;
mod map_file;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::{Rect, Vec2};

pub use autotile::AUTOTILE_RULES;
pub use map_file::{MapFileError, MapFormatError};

pub const DEFAULT_TILE_SIZE: u32 = 16;

/// 3x3 neighborhood scanned row by row, left to right, top to bottom.
const NEIGHBOR_OFFSETS: [(i32, i32); 9] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (0, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    Grass,
    Stone,
    Decor,
    LargeDecor,
    Spawners,
}

impl TileKind {
    pub const ALL: [TileKind; 5] = [
        TileKind::Grass,
        TileKind::Stone,
        TileKind::Decor,
        TileKind::LargeDecor,
        TileKind::Spawners,
    ];

    /// Participates in rectangle collision resolution.
    pub const fn is_solid(self) -> bool {
        matches!(self, TileKind::Grass | TileKind::Stone)
    }

    pub const fn is_autotiled(self) -> bool {
        matches!(self, TileKind::Grass | TileKind::Stone)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            TileKind::Grass => "grass",
            TileKind::Stone => "stone",
            TileKind::Decor => "decor",
            TileKind::LargeDecor => "large_decor",
            TileKind::Spawners => "spawners",
        }
    }
}

impl fmt::Display for TileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridPos {
    pub x: i32,
    pub y: i32,
}

impl GridPos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// `None` when the neighbor would fall outside the `i32` grid.
    pub fn offset(self, dx: i32, dy: i32) -> Option<Self> {
        Some(Self {
            x: self.x.checked_add(dx)?,
            y: self.y.checked_add(dy)?,
        })
    }

    /// Map file key, `"x;y"`.
    pub fn key(self) -> String {
        format!("{};{}", self.x, self.y)
    }

    /// Accepts only the form `key` writes, so two spellings never name one cell.
    pub fn parse_key(key: &str) -> Option<Self> {
        let (x, y) = key.split_once(';')?;
        let pos = Self {
            x: x.parse().ok()?,
            y: y.parse().ok()?,
        };
        (pos.key() == key).then_some(pos)
    }
}

/// On-grid tile. `pos` is in cell units and always equals its storage key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    pub kind: TileKind,
    pub variant: u32,
    pub pos: GridPos,
}

/// Tile positioned in pixel space: off-grid decoration, or an extracted copy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedTile {
    pub kind: TileKind,
    pub variant: u32,
    pub pos: Vec2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tilemap {
    tile_size: u32,
    tiles: BTreeMap<GridPos, Tile>,
    offgrid: Vec<PlacedTile>,
}

impl Default for Tilemap {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            tiles: BTreeMap::new(),
            offgrid: Vec::new(),
        }
    }
}

impl Tilemap {
    /// Empty map with `tile_size` pixel cells. Zero is rejected, as in map files.
    pub fn new(tile_size: u32) -> Result<Self, MapFormatError> {
        if tile_size == 0 {
            return Err(MapFormatError::ZeroTileSize);
        }
        Ok(Self {
            tile_size,
            ..Self::default()
        })
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn grid_pos_at(&self, pixel: Vec2) -> GridPos {
        let size = self.tile_size as f32;
        GridPos {
            x: (pixel.x / size).floor() as i32,
            y: (pixel.y / size).floor() as i32,
        }
    }

    /// Pixel-space top-left corner of a cell.
    pub fn cell_origin(&self, pos: GridPos) -> Vec2 {
        let size = self.tile_size as f32;
        Vec2::new(pos.x as f32 * size, pos.y as f32 * size)
    }

    pub fn cell_rect(&self, pos: GridPos) -> Rect {
        let origin = self.cell_origin(pos);
        let size = self.tile_size as f32;
        Rect::new(origin.x, origin.y, size, size)
    }

    /// Inserts a tile, replacing whatever occupied the cell.
    pub fn place(&mut self, kind: TileKind, variant: u32, pos: GridPos) -> Option<Tile> {
        self.tiles.insert(pos, Tile { kind, variant, pos })
    }

    pub fn remove(&mut self, pos: GridPos) -> Option<Tile> {
        self.tiles.remove(&pos)
    }

    pub fn tile_at(&self, pos: GridPos) -> Option<&Tile> {
        self.tiles.get(&pos)
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn offgrid(&self) -> &[PlacedTile] {
        &self.offgrid
    }

    pub fn offgrid_count(&self) -> usize {
        self.offgrid.len()
    }

    pub fn place_offgrid(&mut self, tile: PlacedTile) {
        self.offgrid.push(tile);
    }

    /// Removes every off-grid tile whose image rectangle contains `point`.
    /// `extent_of` reports the drawn size of a `(kind, variant)`.
    pub fn remove_offgrid_at(
        &mut self,
        point: Vec2,
        extent_of: impl Fn(TileKind, u32) -> Vec2,
    ) -> usize {
        let before = self.offgrid.len();
        self.offgrid.retain(|tile| {
            let extent = extent_of(tile.kind, tile.variant);
            !Rect::new(tile.pos.x, tile.pos.y, extent.x, extent.y).contains_point(point)
        });
        before - self.offgrid.len()
    }

    /// Every tile in the 3x3 cell block around the cell holding `pixel`.
    pub fn neighbors_of(&self, pixel: Vec2) -> Vec<&Tile> {
        let center = self.grid_pos_at(pixel);
        NEIGHBOR_OFFSETS
            .iter()
            .filter_map(|&(dx, dy)| self.tiles.get(&center.offset(dx, dy)?))
            .collect()
    }

    pub fn solid_neighbors_of(&self, pixel: Vec2) -> Vec<Rect> {
        self.neighbors_of(pixel)
            .into_iter()
            .filter(|tile| tile.kind.is_solid())
            .map(|tile| self.cell_rect(tile.pos))
            .collect()
    }

    /// The tile in the exact cell holding `pixel`, if it is solid.
    pub fn solid_check(&self, pixel: Vec2) -> Option<&Tile> {
        self.tiles
            .get(&self.grid_pos_at(pixel))
            .filter(|tile| tile.kind.is_solid())
    }

    /// Collects every tile matching one of `pairs`, off-grid first. Returned
    /// copies are in pixel space. With `keep == false` the matches are removed.
    pub fn extract_and_remove(&mut self, pairs: &[(TileKind, u32)], keep: bool) -> Vec<PlacedTile> {
        let matches_pair = |kind: TileKind, variant: u32| pairs.contains(&(kind, variant));
        let mut matches = Vec::new();

        for tile in &self.offgrid {
            if matches_pair(tile.kind, tile.variant) {
                matches.push(*tile);
            }
        }
        if !keep {
            self.offgrid
                .retain(|tile| !matches_pair(tile.kind, tile.variant));
        }

        let mut matched_cells = Vec::new();
        for tile in self.tiles.values() {
            if matches_pair(tile.kind, tile.variant) {
                matches.push(PlacedTile {
                    kind: tile.kind,
                    variant: tile.variant,
                    pos: self.cell_origin(tile.pos),
                });
                matched_cells.push(tile.pos);
            }
        }
        if !keep {
            for pos in matched_cells {
                self.tiles.remove(&pos);
            }
        }

        matches
    }

    pub fn clear(&mut self) {
        self.tiles.clear();
        self.offgrid.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map_with(tiles: &[(TileKind, u32, i32, i32)]) -> Tilemap {
        let mut map = Tilemap::default();
        for &(kind, variant, x, y) in tiles {
            map.place(kind, variant, GridPos::new(x, y));
        }
        map
    }

    #[test]
    fn key_round_trips_including_negatives() {
        let pos = GridPos::new(-3, 12);
        assert_eq!(pos.key(), "-3;12");
        assert_eq!(GridPos::parse_key("-3;12"), Some(pos));
        assert_eq!(GridPos::parse_key("3,12"), None);
        assert_eq!(GridPos::parse_key("a;1"), None);
    }

    #[test]
    fn only_canonical_keys_parse() {
        for key in ["01;2", "+1;2", " 1;2", "1; 2", "-0;0"] {
            assert_eq!(GridPos::parse_key(key), None, "{key}");
        }
        assert_eq!(GridPos::parse_key("0;-7"), Some(GridPos::new(0, -7)));
    }

    #[test]
    fn neighbors_at_the_grid_edge_skip_missing_cells() {
        let mut map = Tilemap::new(1).expect("tile size");
        map.place(TileKind::Stone, 0, GridPos::new(i32::MAX, i32::MAX));
        map.place(TileKind::Stone, 0, GridPos::new(i32::MAX - 1, i32::MAX));

        let found = map.neighbors_of(Vec2::new(i32::MAX as f32, i32::MAX as f32));

        assert_eq!(found.len(), 2);
        assert_eq!(GridPos::new(i32::MAX, 0).offset(1, 0), None);
        assert_eq!(
            GridPos::new(i32::MIN, 0).offset(1, -1),
            Some(GridPos::new(i32::MIN + 1, -1))
        );
    }

    #[test]
    fn grid_pos_uses_floor_division() {
        let map = Tilemap::default();
        assert_eq!(map.grid_pos_at(Vec2::new(15.9, 16.0)), GridPos::new(0, 1));
        assert_eq!(map.grid_pos_at(Vec2::new(-0.5, -16.0)), GridPos::new(-1, -1));
        assert_eq!(map.grid_pos_at(Vec2::new(-16.5, 0.0)), GridPos::new(-2, 0));
    }

    #[test]
    fn grid_round_trip_is_idempotent() {
        let map = Tilemap::default();
        for pixel in [
            Vec2::new(0.0, 0.0),
            Vec2::new(37.2, -5.5),
            Vec2::new(-100.25, 250.0),
            Vec2::new(-0.001, 15.999),
        ] {
            let cell = map.grid_pos_at(pixel);
            let origin = map.cell_origin(cell);
            assert_eq!(map.grid_pos_at(origin), cell, "pixel={pixel:?}");
        }
    }

    #[test]
    fn place_overwrites_by_key() {
        let mut map = Tilemap::default();
        assert!(map.place(TileKind::Grass, 0, GridPos::new(1, 1)).is_none());
        let previous = map
            .place(TileKind::Stone, 2, GridPos::new(1, 1))
            .expect("previous");

        assert_eq!(previous.kind, TileKind::Grass);
        assert_eq!(map.tile_count(), 1);
        let tile = map.tile_at(GridPos::new(1, 1)).expect("tile");
        assert_eq!(tile.kind, TileKind::Stone);
        assert_eq!(tile.pos, GridPos::new(1, 1));
    }

    #[test]
    fn neighbors_scan_row_major_order() {
        let map = map_with(&[
            (TileKind::Decor, 0, 1, 1),
            (TileKind::Grass, 0, -1, -1),
            (TileKind::Stone, 0, 0, 0),
            (TileKind::Grass, 1, 1, -1),
            (TileKind::Grass, 2, 5, 5),
        ]);
        let positions: Vec<GridPos> = map
            .neighbors_of(Vec2::new(8.0, 8.0))
            .into_iter()
            .map(|tile| tile.pos)
            .collect();

        assert_eq!(
            positions,
            vec![
                GridPos::new(-1, -1),
                GridPos::new(1, -1),
                GridPos::new(0, 0),
                GridPos::new(1, 1),
            ]
        );
    }

    #[test]
    fn solid_neighbors_filter_kind_and_convert_to_pixels() {
        let map = map_with(&[
            (TileKind::Grass, 0, 0, 1),
            (TileKind::Decor, 0, 1, 1),
            (TileKind::Stone, 0, 1, 0),
        ]);
        let rects = map.solid_neighbors_of(Vec2::new(4.0, 4.0));

        assert_eq!(
            rects,
            vec![
                Rect::new(16.0, 0.0, 16.0, 16.0),
                Rect::new(0.0, 16.0, 16.0, 16.0),
            ]
        );
    }

    #[test]
    fn solid_check_only_reports_exact_solid_cell() {
        let map = map_with(&[(TileKind::Stone, 0, 2, 0), (TileKind::Decor, 0, 3, 0)]);

        assert!(map.solid_check(Vec2::new(33.0, 1.0)).is_some());
        assert!(map.solid_check(Vec2::new(49.0, 1.0)).is_none());
        assert!(map.solid_check(Vec2::new(17.0, 1.0)).is_none());
    }

    #[test]
    fn extract_with_keep_leaves_stores_untouched() {
        let mut map = map_with(&[
            (TileKind::Spawners, 0, 2, 3),
            (TileKind::Grass, 0, 0, 0),
        ]);
        map.place_offgrid(PlacedTile {
            kind: TileKind::LargeDecor,
            variant: 2,
            pos: Vec2::new(40.5, 12.0),
        });

        let found = map.extract_and_remove(
            &[(TileKind::Spawners, 0), (TileKind::LargeDecor, 2)],
            true,
        );

        assert_eq!(found.len(), 2);
        assert_eq!(found[0].pos, Vec2::new(40.5, 12.0));
        assert_eq!(found[1].pos, Vec2::new(32.0, 48.0));
        assert_eq!(map.tile_count(), 2);
        assert_eq!(map.offgrid_count(), 1);
        assert_eq!(
            map.tile_at(GridPos::new(2, 3)).expect("kept").pos,
            GridPos::new(2, 3)
        );
    }

    #[test]
    fn extract_without_keep_removes_exactly_the_matches() {
        let mut map = map_with(&[
            (TileKind::Spawners, 0, 2, 3),
            (TileKind::Spawners, 1, 4, 3),
            (TileKind::Spawners, 7, 5, 3),
            (TileKind::Grass, 0, 0, 0),
        ]);
        map.place_offgrid(PlacedTile {
            kind: TileKind::Spawners,
            variant: 1,
            pos: Vec2::new(3.0, 4.0),
        });
        map.place_offgrid(PlacedTile {
            kind: TileKind::Decor,
            variant: 1,
            pos: Vec2::new(5.0, 4.0),
        });

        let found = map.extract_and_remove(&[(TileKind::Spawners, 0), (TileKind::Spawners, 1)], false);

        assert_eq!(found.len(), 3);
        assert_eq!(map.tile_count(), 2);
        assert!(map.tile_at(GridPos::new(5, 3)).is_some());
        assert!(map.tile_at(GridPos::new(0, 0)).is_some());
        assert_eq!(map.offgrid(), &[PlacedTile {
            kind: TileKind::Decor,
            variant: 1,
            pos: Vec2::new(5.0, 4.0),
        }]);
    }

    #[test]
    fn remove_offgrid_at_uses_image_extent() {
        let mut map = Tilemap::default();
        map.place_offgrid(PlacedTile {
            kind: TileKind::Decor,
            variant: 0,
            pos: Vec2::new(10.0, 10.0),
        });
        map.place_offgrid(PlacedTile {
            kind: TileKind::LargeDecor,
            variant: 0,
            pos: Vec2::new(100.0, 10.0),
        });

        let removed = map.remove_offgrid_at(Vec2::new(14.0, 14.0), |_, _| Vec2::new(8.0, 8.0));

        assert_eq!(removed, 1);
        assert_eq!(map.offgrid()[0].kind, TileKind::LargeDecor);
    }

    #[test]
    fn zero_tile_size_is_rejected() {
        assert_eq!(Tilemap::new(0), Err(MapFormatError::ZeroTileSize));
        assert_eq!(Tilemap::new(8).map(|map| map.tile_size()), Ok(8));
    }
}
