use platformer_engine::{EntityKind, Layer, TileKind};

/// What a `spawners` tile variant turns into when a level loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SpawnerKind {
    Player,
    Enemy,
    Trap,
    Prize,
    Catnip,
    Button,
}

impl SpawnerKind {
    pub(crate) const ALL: [SpawnerKind; 6] = [
        SpawnerKind::Player,
        SpawnerKind::Enemy,
        SpawnerKind::Trap,
        SpawnerKind::Prize,
        SpawnerKind::Catnip,
        SpawnerKind::Button,
    ];

    pub(crate) fn from_variant(variant: u32) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.variant() == variant)
    }

    pub(crate) const fn variant(self) -> u32 {
        match self {
            SpawnerKind::Player => 0,
            SpawnerKind::Enemy => 1,
            SpawnerKind::Trap => 2,
            SpawnerKind::Prize => 3,
            SpawnerKind::Catnip => 4,
            SpawnerKind::Button => 5,
        }
    }

    pub(crate) const fn entity_kind(self) -> EntityKind {
        match self {
            SpawnerKind::Player => EntityKind::Player,
            SpawnerKind::Enemy => EntityKind::Enemy,
            SpawnerKind::Trap => EntityKind::Trap,
            SpawnerKind::Prize => EntityKind::Prize,
            SpawnerKind::Catnip => EntityKind::Catnip,
            SpawnerKind::Button => EntityKind::Button,
        }
    }

    /// Hitbox size in pixels.
    pub(crate) const fn body_size(self) -> (u32, u32) {
        match self {
            SpawnerKind::Player => (13, 17),
            SpawnerKind::Enemy => (16, 13),
            SpawnerKind::Trap => (15, 17),
            SpawnerKind::Prize => (17, 100),
            SpawnerKind::Catnip => (16, 16),
            SpawnerKind::Button => (8, 16),
        }
    }

    /// Layer the body is drawn on.
    pub(crate) const fn layer(self) -> Layer {
        match self {
            SpawnerKind::Player | SpawnerKind::Trap | SpawnerKind::Catnip => Layer::Terrain,
            SpawnerKind::Enemy => Layer::Actors,
            SpawnerKind::Prize | SpawnerKind::Button => Layer::Background,
        }
    }

    /// `(TileKind::Spawners, variant)` pairs for every known spawner.
    pub(crate) fn marker_pairs() -> Vec<(TileKind, u32)> {
        Self::ALL
            .iter()
            .map(|kind| (TileKind::Spawners, kind.variant()))
            .collect()
    }
}
