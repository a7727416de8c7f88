use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod animation;
pub mod app;
pub mod assets;
mod atomic_io;
pub mod camera;
pub mod geometry;
pub mod physics;
pub mod sprite;
pub mod tilemap;

pub use animation::{
    Action, AnimationCursor, AnimationError, Clip, ClipLibrary, ClipSet, EntityKind,
    DEFAULT_FRAME_DURATION_TICKS,
};
pub use app::{
    run_app, AppError, Compositor, InputAction, InputSnapshot, Layer, LoopConfig, Renderer, Scene,
    SceneCommand, SceneLoadError, Surface, TilemapPainter, TRANSITION_SPAN,
};
pub use assets::{load_clip, load_image, load_images, AssetError, TileAtlas};
pub use camera::Camera;
pub use geometry::{Rect, Vec2};
pub use physics::{CollisionFlags, PhysicsBody};
pub use sprite::Sprite;
pub use tilemap::{
    GridPos, MapFileError, MapFormatError, PlacedTile, Tile, TileKind, Tilemap, DEFAULT_TILE_SIZE,
};

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub data_dir: PathBuf,
    pub maps_dir: PathBuf,
    pub images_dir: PathBuf,
}

impl AppPaths {
    pub fn from_root(root: PathBuf) -> Self {
        let data_dir = root.join("data");
        Self {
            maps_dir: data_dir.join("maps"),
            images_dir: data_dir.join("images"),
            data_dir,
            root,
        }
    }

    /// `data/maps/<level>.json`
    pub fn map_path(&self, level: usize) -> PathBuf {
        self.maps_dir.join(format!("{level}.json"))
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("cannot locate the running executable: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("executable '{0}' has no parent directory")]
    ExeHasNoParent(PathBuf),
    #[error(
        "could not detect project root by walking upward from {start_dir}\n\
expected a directory containing Cargo.toml and either data/ or crates/"
    )]
    RootNotFound { start_dir: PathBuf },
}

pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
    let exe_dir = exe
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| StartupError::ExeHasNoParent(exe.clone()))?;

    find_root_from(&exe_dir)
        .map(AppPaths::from_root)
        .ok_or_else(|| StartupError::RootNotFound {
            start_dir: normalize_path(&exe_dir),
        })
}

fn find_root_from(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|candidate| is_repo_marker(candidate))
        .map(normalize_path)
}

/// A project root holds `Cargo.toml` next to `data/` or `crates/`.
fn is_repo_marker(path: &Path) -> bool {
    path.join("Cargo.toml").is_file()
        && ["data", "crates"]
            .iter()
            .any(|dir| path.join(dir).is_dir())
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
