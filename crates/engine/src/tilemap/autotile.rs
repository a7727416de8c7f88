use super::{GridPos, Tilemap};

const ORTHOGONAL: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, -1), (0, 1)];

/// Same-kind neighbor direction sets, each sorted lexicographically, and the
/// variant they select.
pub const AUTOTILE_RULES: [(&[(i32, i32)], u32); 9] = [
    (&[(0, 1), (1, 0)], 0),
    (&[(-1, 0), (0, 1), (1, 0)], 1),
    (&[(-1, 0), (0, 1)], 2),
    (&[(-1, 0), (0, -1), (0, 1)], 3),
    (&[(-1, 0), (0, -1)], 4),
    (&[(-1, 0), (0, -1), (1, 0)], 5),
    (&[(0, -1), (1, 0)], 6),
    (&[(0, -1), (0, 1), (1, 0)], 7),
    (&[(-1, 0), (0, -1), (0, 1), (1, 0)], 8),
];

fn variant_for(directions: &[(i32, i32)]) -> Option<u32> {
    AUTOTILE_RULES
        .iter()
        .find(|(rule, _)| *rule == directions)
        .map(|&(_, variant)| variant)
}

impl Tilemap {
    /// Re-derives the variant of every autotiled tile from its orthogonal
    /// same-kind neighbors. Sets missing from the table keep their variant.
    /// Returns how many tiles changed.
    pub fn classify_for_autotile(&mut self) -> usize {
        let mut updates: Vec<(GridPos, u32)> = Vec::new();
        for tile in self.tiles.values() {
            if !tile.kind.is_autotiled() {
                continue;
            }
            let mut directions: Vec<(i32, i32)> = ORTHOGONAL
                .iter()
                .copied()
                .filter(|&(dx, dy)| {
                    tile.pos
                        .offset(dx, dy)
                        .and_then(|pos| self.tiles.get(&pos))
                        .is_some_and(|neighbor| neighbor.kind == tile.kind)
                })
                .collect();
            directions.sort_unstable();

            if let Some(variant) = variant_for(&directions) {
                if variant != tile.variant {
                    updates.push((tile.pos, variant));
                }
            }
        }

        for &(pos, variant) in &updates {
            if let Some(tile) = self.tiles.get_mut(&pos) {
                tile.variant = variant;
            }
        }
        if !updates.is_empty() {
            tracing::debug!(changed = updates.len(), "autotile_classified");
        }
        updates.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tilemap::TileKind;

    fn variant_at(map: &Tilemap, x: i32, y: i32) -> u32 {
        map.tile_at(GridPos::new(x, y)).expect("tile").variant
    }

    #[test]
    fn right_and_down_neighbors_select_top_left_corner() {
        let mut map = Tilemap::default();
        map.place(TileKind::Grass, 4, GridPos::new(0, 0));
        map.place(TileKind::Grass, 4, GridPos::new(1, 0));
        map.place(TileKind::Grass, 4, GridPos::new(0, 1));

        map.classify_for_autotile();

        assert_eq!(variant_at(&map, 0, 0), 0);
    }

    #[test]
    fn rule_table_is_sorted_and_distinct() {
        for (index, (rule, variant)) in AUTOTILE_RULES.iter().enumerate() {
            let mut sorted = rule.to_vec();
            sorted.sort_unstable();
            assert_eq!(sorted.as_slice(), *rule);
            assert_eq!(*variant, index as u32);
        }
    }

    #[test]
    fn filled_block_classifies_every_position() {
        let mut map = Tilemap::default();
        for y in 0..3 {
            for x in 0..3 {
                map.place(TileKind::Stone, 99, GridPos::new(x, y));
            }
        }

        map.classify_for_autotile();

        let expected = [[0, 1, 2], [7, 8, 3], [6, 5, 4]];
        for (y, row) in expected.iter().enumerate() {
            for (x, &variant) in row.iter().enumerate() {
                assert_eq!(variant_at(&map, x as i32, y as i32), variant, "cell {x},{y}");
            }
        }
    }

    #[test]
    fn unmatched_sets_and_other_kinds_are_left_alone() {
        let mut map = Tilemap::default();
        map.place(TileKind::Grass, 7, GridPos::new(0, 0));
        map.place(TileKind::Grass, 3, GridPos::new(1, 0));
        map.place(TileKind::Stone, 5, GridPos::new(0, 1));
        map.place(TileKind::Decor, 2, GridPos::new(5, 5));
        map.place(TileKind::Decor, 2, GridPos::new(6, 5));

        let changed = map.classify_for_autotile();

        assert_eq!(changed, 0);
        assert_eq!(variant_at(&map, 0, 0), 7);
        assert_eq!(variant_at(&map, 1, 0), 3);
        assert_eq!(variant_at(&map, 0, 1), 5);
        assert_eq!(variant_at(&map, 5, 5), 2);
    }

    #[test]
    fn tiles_on_the_outer_edge_of_the_grid_classify() {
        let mut map = Tilemap::default();
        map.place(TileKind::Grass, 4, GridPos::new(i32::MAX, 0));
        map.place(TileKind::Grass, 4, GridPos::new(i32::MAX - 1, 0));
        map.place(TileKind::Grass, 4, GridPos::new(i32::MAX, 1));
        map.place(TileKind::Grass, 4, GridPos::new(i32::MIN, 0));

        map.classify_for_autotile();

        assert_eq!(variant_at(&map, i32::MAX, 0), 2);
        assert_eq!(variant_at(&map, i32::MIN, 0), 4);
    }

    #[test]
    fn classification_is_idempotent() {
        let mut map = Tilemap::default();
        for (x, y) in [(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1), (4, 4), (4, 5)] {
            map.place(TileKind::Grass, 0, GridPos::new(x, y));
        }

        map.classify_for_autotile();
        let first: Vec<u32> = map.tiles().map(|tile| tile.variant).collect();
        let changed = map.classify_for_autotile();
        let second: Vec<u32> = map.tiles().map(|tile| tile.variant).collect();

        assert_eq!(changed, 0);
        assert_eq!(first, second);
    }
}
