use platformer_engine::{Action, PhysicsBody, Rect, Tilemap, Vec2};

use super::context::LevelContext;
use super::spawn::SpawnerKind;

/// A non-player body: falls under gravity and plays its kind's clips.
///
/// Bodies taller than two cells reach past the 3x3 collision scan around their
/// top-left corner, so they stay where they spawned and only animate.
#[derive(Debug, Clone)]
pub(crate) struct Prop {
    kind: SpawnerKind,
    body: PhysicsBody,
}

impl Prop {
    pub(crate) fn new(kind: SpawnerKind, body: PhysicsBody) -> Self {
        Self { kind, body }
    }

    pub(crate) fn kind(&self) -> SpawnerKind {
        self.kind
    }

    pub(crate) fn body(&self) -> &PhysicsBody {
        &self.body
    }

    pub(crate) fn overlaps(&self, other: &Rect) -> bool {
        self.body.rect().overlaps(other)
    }

    fn is_anchored(&self, tilemap: &Tilemap) -> bool {
        self.body.size().1 > tilemap.tile_size() * 2
    }

    fn step(&mut self, tilemap: &Tilemap) {
        if self.is_anchored(tilemap) {
            self.body.velocity = Vec2::ZERO;
        }
        self.body.update(tilemap, Vec2::ZERO);
    }

    /// Buttons only. Latches on the first touch by the player and stays on for
    /// the rest of the level. Returns whether it is on.
    pub(crate) fn update_button(&mut self, tilemap: &Tilemap, player: &Rect) -> bool {
        self.step(tilemap);
        let on = self.body.action() == Action::On || self.overlaps(player);
        if on {
            self.body.set_action(Action::On);
        }
        on
    }

    pub(crate) fn update(&mut self, tilemap: &Tilemap, context: &LevelContext) {
        self.step(tilemap);
        if self.kind == SpawnerKind::Prize {
            self.body.set_action(if context.wind() {
                Action::Wind
            } else {
                Action::Idle
            });
        }
    }
}
