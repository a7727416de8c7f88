use std::collections::HashSet;

use tracing::warn;

use super::surface::Surface;
use crate::assets::TileAtlas;
use crate::tilemap::{GridPos, TileKind, Tilemap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellRange {
    x_min: i32,
    x_max: i32,
    y_min: i32,
    y_max: i32,
}

/// Cells that can intersect a `size` view scrolled by `offset`, inclusive.
fn visible_cells(offset: (i32, i32), size: (u32, u32), tile_size: u32) -> CellRange {
    let ts = tile_size.max(1) as i32;
    CellRange {
        x_min: offset.0.div_euclid(ts),
        x_max: (offset.0 + size.0 as i32).div_euclid(ts),
        y_min: offset.1.div_euclid(ts),
        y_max: (offset.1 + size.1 as i32).div_euclid(ts),
    }
}

/// Draws tilemaps and remembers which missing images it already reported.
#[derive(Debug, Default)]
pub struct TilemapPainter {
    warned_missing: HashSet<(TileKind, u32)>,
}

impl TilemapPainter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Off-grid tiles first, then the on-grid cells covering the view.
    pub fn draw(
        &mut self,
        target: &mut Surface,
        tilemap: &Tilemap,
        atlas: &TileAtlas,
        offset: (i32, i32),
    ) -> usize {
        let mut drawn = 0;
        for tile in tilemap.offgrid() {
            let x = (tile.pos.x - offset.0 as f32).floor() as i32;
            let y = (tile.pos.y - offset.1 as f32).floor() as i32;
            if self.draw_one(target, atlas, tile.kind, tile.variant, x, y) {
                drawn += 1;
            }
        }

        let ts = tilemap.tile_size() as i32;
        let range = visible_cells(
            offset,
            (target.width(), target.height()),
            tilemap.tile_size(),
        );
        for cell_x in range.x_min..=range.x_max {
            for cell_y in range.y_min..=range.y_max {
                let Some(tile) = tilemap.tile_at(GridPos::new(cell_x, cell_y)) else {
                    continue;
                };
                let x = cell_x * ts - offset.0;
                let y = cell_y * ts - offset.1;
                if self.draw_one(target, atlas, tile.kind, tile.variant, x, y) {
                    drawn += 1;
                }
            }
        }
        drawn
    }

    fn draw_one(
        &mut self,
        target: &mut Surface,
        atlas: &TileAtlas,
        kind: TileKind,
        variant: u32,
        x: i32,
        y: i32,
    ) -> bool {
        match atlas.sprite(kind, variant) {
            Some(sprite) => {
                target.blit_sprite(sprite, x, y, false);
                true
            }
            None => {
                if self.warned_missing.insert((kind, variant)) {
                    warn!(kind = %kind, variant, "tile_image_missing_skipping_draw");
                }
                false
            }
        }
    }
}
