use std::path::Path;

use platformer_engine::{
    load_clip, load_image, Action, AnimationError, AssetError, ClipLibrary, ClipSet, EntityKind,
    Sprite, TileAtlas, TileKind, DEFAULT_FRAME_DURATION_TICKS,
};
use thiserror::Error;
use tracing::info;

/// Tile kinds drawn in the game. Spawner markers are consumed at load.
pub(crate) const DRAWN_TILE_KINDS: [TileKind; 4] = [
    TileKind::Decor,
    TileKind::Grass,
    TileKind::LargeDecor,
    TileKind::Stone,
];

/// `(kind, action, directory under images/, ticks per image)`.
const CLIP_SOURCES: [(EntityKind, Action, &str, u32); 15] = [
    (EntityKind::Player, Action::Idle, "entities/player/idle", 6),
    (EntityKind::Player, Action::Run, "entities/player/run", 6),
    (EntityKind::Player, Action::Jump, "entities/player/jump", DEFAULT_FRAME_DURATION_TICKS),
    (EntityKind::Player, Action::Slide, "entities/player/slide", DEFAULT_FRAME_DURATION_TICKS),
    (
        EntityKind::Player,
        Action::WallSlide,
        "entities/player/wall_slide",
        DEFAULT_FRAME_DURATION_TICKS,
    ),
    (EntityKind::Enemy, Action::Idle, "entities/cat/idle", 8),
    (EntityKind::Enemy, Action::Run, "entities/cat/run", 8),
    (EntityKind::Enemy, Action::Stun, "entities/cat/stun", DEFAULT_FRAME_DURATION_TICKS),
    (EntityKind::Enemy, Action::Shoot, "entities/cat/shoot", 4),
    (EntityKind::Trap, Action::Idle, "entities/trap/idle", DEFAULT_FRAME_DURATION_TICKS),
    (EntityKind::Prize, Action::Idle, "entities/prize/idle", DEFAULT_FRAME_DURATION_TICKS),
    (EntityKind::Prize, Action::Wind, "entities/prize/wind", DEFAULT_FRAME_DURATION_TICKS),
    (EntityKind::Catnip, Action::Idle, "entities/catnip/catnip", DEFAULT_FRAME_DURATION_TICKS),
    (EntityKind::Button, Action::Idle, "entities/button/idle", DEFAULT_FRAME_DURATION_TICKS),
    (EntityKind::Button, Action::On, "entities/button/on", DEFAULT_FRAME_DURATION_TICKS),
];

const BACKGROUND_IMAGE: &str = "background.png";

#[derive(Debug, Error)]
pub(crate) enum GameAssetError {
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    Animation(#[from] AnimationError),
}

/// Clip sets for every entity kind, resolved once.
#[derive(Debug, Clone)]
pub(crate) struct EntityClips {
    pub(crate) player: ClipSet,
    pub(crate) enemy: ClipSet,
    pub(crate) trap: ClipSet,
    pub(crate) prize: ClipSet,
    pub(crate) catnip: ClipSet,
    pub(crate) button: ClipSet,
}

impl EntityClips {
    pub(crate) fn resolve(library: &ClipLibrary) -> Result<Self, AnimationError> {
        Ok(Self {
            player: library.resolve(EntityKind::Player)?,
            enemy: library.resolve(EntityKind::Enemy)?,
            trap: library.resolve(EntityKind::Trap)?,
            prize: library.resolve(EntityKind::Prize)?,
            catnip: library.resolve(EntityKind::Catnip)?,
            button: library.resolve(EntityKind::Button)?,
        })
    }

    pub(crate) fn for_kind(&self, kind: EntityKind) -> &ClipSet {
        match kind {
            EntityKind::Player => &self.player,
            EntityKind::Enemy => &self.enemy,
            EntityKind::Trap => &self.trap,
            EntityKind::Prize => &self.prize,
            EntityKind::Catnip => &self.catnip,
            EntityKind::Button => &self.button,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct GameAssets {
    pub(crate) tiles: TileAtlas,
    pub(crate) clips: EntityClips,
    pub(crate) background: Option<Sprite>,
}

impl GameAssets {
    pub(crate) fn load(images_dir: &Path) -> Result<Self, GameAssetError> {
        let tiles = TileAtlas::load(&images_dir.join("tiles"), &DRAWN_TILE_KINDS)?;

        let mut library = ClipLibrary::default();
        for (kind, action, dir, frame_duration) in CLIP_SOURCES {
            let clip = load_clip(&images_dir.join(dir), frame_duration, true)?;
            library.insert(kind, action, clip);
        }
        let clips = EntityClips::resolve(&library)?;

        let background_path = images_dir.join(BACKGROUND_IMAGE);
        let background = if background_path.is_file() {
            Some(load_image(&background_path)?)
        } else {
            None
        };

        info!(
            images_dir = %images_dir.display(),
            clips = library.len(),
            has_background = background.is_some(),
            "game_assets_loaded"
        );
        Ok(Self {
            tiles,
            clips,
            background,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use image::{Rgba, RgbaImage};

    use super::*;

    fn write_png(dir: &Path, name: &str) {
        fs::create_dir_all(dir).expect("mkdir");
        RgbaImage::from_pixel(4, 4, Rgba([120, 80, 40, 255]))
            .save(dir.join(name))
            .expect("write png");
    }

    fn seed_images(root: &Path) {
        for kind in DRAWN_TILE_KINDS {
            write_png(&root.join("tiles").join(kind.as_str()), "0.png");
        }
        for (_, _, dir, _) in CLIP_SOURCES {
            write_png(&root.join(dir), "0.png");
            write_png(&root.join(dir), "1.png");
        }
    }

    #[test]
    fn loads_every_clip_and_tile_kind() {
        let dir = tempfile::tempdir().expect("tempdir");
        seed_images(dir.path());

        let assets = GameAssets::load(dir.path()).expect("assets");

        assert!(assets.background.is_none());
        assert_eq!(assets.tiles.variant_count(TileKind::Stone), 1);
        let idle = assets
            .clips
            .player
            .clip(Action::Idle)
            .expect("player idle");
        assert_eq!(idle.frame_duration(), 6);
        assert_eq!(idle.frames().len(), 2);
        let shoot = assets.clips.enemy.clip(Action::Shoot).expect("enemy shoot");
        assert_eq!(shoot.frame_duration(), 4);
        assert_eq!(
            assets.clips.for_kind(EntityKind::Button).kind(),
            EntityKind::Button
        );
    }

    #[test]
    fn background_is_loaded_when_present() {
        let dir = tempfile::tempdir().expect("tempdir");
        seed_images(dir.path());
        write_png(dir.path(), BACKGROUND_IMAGE);

        let assets = GameAssets::load(dir.path()).expect("assets");

        let background = assets.background.expect("background");
        assert_eq!((background.width(), background.height()), (4, 4));
    }

    #[test]
    fn missing_clip_directory_fails_the_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        seed_images(dir.path());
        fs::remove_dir_all(dir.path().join("entities/prize/wind")).expect("rm");

        let error = GameAssets::load(dir.path()).expect_err("missing clip");

        assert!(matches!(
            error,
            GameAssetError::Asset(AssetError::Read { .. })
        ));
    }
}
