use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use platformer_engine::{
    Action, AnimationError, AppPaths, AssetError, Camera, Compositor, InputSnapshot, Layer,
    MapFileError, PhysicsBody, Scene, SceneCommand, SceneLoadError, TileKind, Tilemap,
    TilemapPainter, Vec2, TRANSITION_SPAN,
};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::assets::{EntityClips, GameAssets};

mod context;
mod player;
mod props;
mod spawn;

use context::LevelContext;
use player::{Player, PlayerEvent};
use props::Prop;
use spawn::SpawnerKind;

const SCENE_NAME: &str = "level";
/// Death and completion counters run this many ticks before the next load.
const FADE_OUT_TICKS: u32 = 40;
/// Death counter value at which the wipe starts closing.
const DEATH_WIPE_DELAY: u32 = 10;

#[derive(Debug, Error)]
pub(crate) enum LevelLoadError {
    #[error(transparent)]
    Map(#[from] MapFileError),
    #[error("level '{path}' cannot be drawn: {source}")]
    Tiles {
        path: PathBuf,
        #[source]
        source: AssetError,
    },
    #[error("level '{path}' has unknown spawner variant {variant} at {pos:?}")]
    UnknownSpawner {
        path: PathBuf,
        variant: u32,
        pos: Vec2,
    },
    #[error("level '{path}' has no player spawner")]
    MissingPlayer { path: PathBuf },
    #[error("level '{path}' cannot spawn its entities: {source}")]
    Clips {
        path: PathBuf,
        #[source]
        source: AnimationError,
    },
    #[error("failed to list maps in '{path}': {source}")]
    ListMaps {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LevelOutcome {
    Continue,
    Restart,
    Advance,
}

/// Everything one loaded map owns. Replaced as a whole on every load.
#[derive(Debug)]
pub(crate) struct Level {
    index: usize,
    tilemap: Tilemap,
    player: Player,
    props: Vec<Prop>,
    camera: Camera,
    context: LevelContext,
    transition: i32,
    dead: u32,
    completed: u32,
}

impl Level {
    pub(crate) fn load(
        path: &Path,
        index: usize,
        assets: &GameAssets,
        viewport: (u32, u32),
    ) -> Result<Self, LevelLoadError> {
        let mut tilemap = Tilemap::from_path(path)?;

        let markers = tilemap.extract_and_remove(&SpawnerKind::marker_pairs(), false);
        if let Some(unknown) = first_spawner_marker(&tilemap) {
            return Err(LevelLoadError::UnknownSpawner {
                path: path.to_path_buf(),
                variant: unknown.0,
                pos: unknown.1,
            });
        }
        assets
            .tiles
            .validate(&tilemap)
            .map_err(|source| LevelLoadError::Tiles {
                path: path.to_path_buf(),
                source,
            })?;

        let mut player = None;
        let mut props = Vec::new();
        for marker in markers {
            let Some(kind) = SpawnerKind::from_variant(marker.variant) else {
                continue;
            };
            let body = spawn_body(kind, marker.pos, &assets.clips, path)?;
            if kind == SpawnerKind::Player {
                if player.is_some() {
                    warn!(
                        path = %path.display(),
                        pos = ?marker.pos,
                        "extra_player_spawner_replaces_previous"
                    );
                }
                player = Some(Player::new(body));
            } else {
                props.push(Prop::new(kind, body));
            }
        }
        let player = player.ok_or_else(|| LevelLoadError::MissingPlayer {
            path: path.to_path_buf(),
        })?;

        let mut camera = Camera::new(viewport);
        camera.snap_to(player.body().center());

        info!(
            level = index,
            tiles = tilemap.tile_count(),
            offgrid = tilemap.offgrid_count(),
            props = props.len(),
            "level_loaded"
        );
        Ok(Self {
            index,
            tilemap,
            player,
            props,
            camera,
            context: LevelContext::default(),
            transition: -TRANSITION_SPAN,
            dead: 0,
            completed: 0,
        })
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn tick(&mut self, input: &InputSnapshot) -> LevelOutcome {
        if self.completed > 0 {
            self.completed += 1;
            self.close_wipe();
            if self.completed > FADE_OUT_TICKS {
                return LevelOutcome::Advance;
            }
        }
        if self.dead > 0 {
            self.dead += 1;
            if self.dead >= DEATH_WIPE_DELAY {
                self.close_wipe();
            }
            if self.dead > FADE_OUT_TICKS {
                return LevelOutcome::Restart;
            }
        }
        if self.transition < 0 {
            self.transition += 1;
        }

        self.camera.follow(self.player.body().center());

        let player_rect = self.player.body().rect();
        let mut wind = false;
        for button in self
            .props
            .iter_mut()
            .filter(|prop| prop.kind() == SpawnerKind::Button)
        {
            wind |= button.update_button(&self.tilemap, &player_rect);
        }
        self.context.set_wind(wind);
        for prop in self
            .props
            .iter_mut()
            .filter(|prop| prop.kind() != SpawnerKind::Button)
        {
            prop.update(&self.tilemap, &self.context);
        }

        if self.dead == 0 && self.completed == 0 {
            self.update_player(input);
        }
        LevelOutcome::Continue
    }

    fn update_player(&mut self, input: &InputSnapshot) {
        if input.jump_pressed() {
            self.player.jump();
        }
        if input.dash_pressed() {
            self.player.dash();
        }
        let movement = Vec2::new(input.horizontal_intent(), 0.0);
        if self.player.update(&self.tilemap, movement) == PlayerEvent::FellToDeath {
            self.kill_player("fell");
            return;
        }

        let rect = self.player.body().rect();
        if self.player.is_dash_attacking() {
            let before = self.props.len();
            self.props
                .retain(|prop| !(prop.kind() == SpawnerKind::Enemy && prop.overlaps(&rect)));
            let defeated = before - self.props.len();
            if defeated > 0 {
                debug!(level = self.index, defeated, "enemies_defeated");
            }
        } else if self
            .props
            .iter()
            .any(|prop| prop.kind() == SpawnerKind::Trap && prop.overlaps(&rect))
        {
            self.kill_player("trap");
            return;
        }

        if self
            .props
            .iter()
            .any(|prop| prop.kind() == SpawnerKind::Prize && prop.overlaps(&rect))
        {
            self.completed = 1;
            info!(level = self.index, "level_completed");
        }
    }

    fn kill_player(&mut self, cause: &'static str) {
        if self.dead == 0 {
            self.dead = 1;
            info!(level = self.index, cause, "player_died");
        }
    }

    fn close_wipe(&mut self) {
        self.transition = (self.transition + 1).min(TRANSITION_SPAN);
    }

    pub(crate) fn render(
        &self,
        compositor: &mut Compositor,
        assets: &GameAssets,
        painter: &mut TilemapPainter,
    ) {
        let offset = self.camera.render_offset();
        if let Some(background) = &assets.background {
            compositor
                .layer_mut(Layer::Background)
                .blit_sprite(background, 0, 0, false);
        }
        painter.draw(
            compositor.layer_mut(Layer::Terrain),
            &self.tilemap,
            &assets.tiles,
            offset,
        );
        for prop in &self.props {
            draw_body(compositor, prop.kind().layer(), prop.body(), offset);
        }
        if self.dead == 0 && self.player.is_visible() {
            draw_body(
                compositor,
                SpawnerKind::Player.layer(),
                self.player.body(),
                offset,
            );
        }
        compositor.set_transition(self.transition);
    }
}

fn draw_body(compositor: &mut Compositor, layer: Layer, body: &PhysicsBody, offset: (i32, i32)) {
    let origin = body.sprite_origin(offset);
    compositor.layer_mut(layer).blit_sprite(
        body.current_sprite(),
        origin.x as i32,
        origin.y as i32,
        body.facing_flipped(),
    );
}

fn spawn_body(
    kind: SpawnerKind,
    pos: Vec2,
    clips: &EntityClips,
    path: &Path,
) -> Result<PhysicsBody, LevelLoadError> {
    let entity = kind.entity_kind();
    PhysicsBody::new(clips.for_kind(entity).clone(), pos, kind.body_size()).ok_or_else(|| {
        LevelLoadError::Clips {
            path: path.to_path_buf(),
            source: AnimationError::MissingClip {
                kind: entity,
                action: Action::Idle,
            },
        }
    })
}

/// Variant and pixel position of a spawner marker left after extraction.
fn first_spawner_marker(tilemap: &Tilemap) -> Option<(u32, Vec2)> {
    let off_grid = tilemap
        .offgrid()
        .iter()
        .find(|tile| tile.kind == TileKind::Spawners)
        .map(|tile| (tile.variant, tile.pos));
    off_grid.or_else(|| {
        tilemap
            .tiles()
            .find(|tile| tile.kind == TileKind::Spawners)
            .map(|tile| (tile.variant, tilemap.cell_origin(tile.pos)))
    })
}

/// Number of `<n>.json` maps in `maps_dir`.
fn count_levels(maps_dir: &Path) -> Result<usize, LevelLoadError> {
    let list_error = |source| LevelLoadError::ListMaps {
        path: maps_dir.to_path_buf(),
        source,
    };
    let mut count = 0;
    for entry in fs::read_dir(maps_dir).map_err(list_error)? {
        let path = entry.map_err(list_error)?.path();
        if !path.is_file() {
            continue;
        }
        let is_json = path.extension().is_some_and(|ext| ext == "json");
        let numbered = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .is_some_and(|stem| stem.parse::<usize>().is_ok());
        if is_json && numbered {
            count += 1;
        }
    }
    Ok(count)
}

pub(crate) struct LevelScene {
    paths: AppPaths,
    viewport: (u32, u32),
    level_count: usize,
    assets: Option<GameAssets>,
    level: Option<Level>,
    painter: TilemapPainter,
}

impl LevelScene {
    pub(crate) fn new(paths: AppPaths, viewport: (u32, u32)) -> Self {
        Self {
            paths,
            viewport,
            level_count: 0,
            assets: None,
            level: None,
            painter: TilemapPainter::new(),
        }
    }

    /// Builds the level at `index` and swaps it in only if every step succeeded.
    fn load_level(&mut self, index: usize) -> Result<(), LevelLoadError> {
        let Some(assets) = &self.assets else {
            return Ok(());
        };
        let path = self.paths.map_path(index);
        let level = Level::load(&path, index, assets, self.viewport)?;
        self.level = Some(level);
        Ok(())
    }

    fn last_level(&self) -> usize {
        self.level_count.saturating_sub(1)
    }
}

impl Scene for LevelScene {
    fn name(&self) -> &str {
        SCENE_NAME
    }

    fn load(&mut self) -> Result<(), SceneLoadError> {
        let assets = GameAssets::load(&self.paths.images_dir)
            .map_err(|err| SceneLoadError::new(SCENE_NAME, err))?;
        self.assets = Some(assets);
        self.level_count = count_levels(&self.paths.maps_dir)
            .map_err(|err| SceneLoadError::new(SCENE_NAME, err))?;
        info!(levels = self.level_count, "levels_found");
        self.load_level(0)
            .map_err(|err| SceneLoadError::new(SCENE_NAME, err))
    }

    fn update(&mut self, input: &InputSnapshot) -> SceneCommand {
        if input.quit_requested() {
            return SceneCommand::Quit;
        }
        let Some(level) = self.level.as_mut() else {
            return SceneCommand::None;
        };
        let index = level.index();
        let next = match level.tick(input) {
            LevelOutcome::Continue => return SceneCommand::None,
            LevelOutcome::Restart => index,
            LevelOutcome::Advance => (index + 1).min(self.last_level()),
        };
        if let Err(err) = self.load_level(next) {
            error!(level = next, error = %err, "level_load_failed");
            return SceneCommand::Quit;
        }
        SceneCommand::None
    }

    fn render(&mut self, compositor: &mut Compositor) {
        if let (Some(level), Some(assets)) = (&self.level, &self.assets) {
            level.render(compositor, assets, &mut self.painter);
        }
    }

    fn unload(&mut self) {
        self.level = None;
        info!("level_scene_unloaded");
    }
}
