use std::sync::Arc;

use tracing::warn;

use crate::animation::{Action, AnimationCursor, ClipSet, EntityKind};
use crate::geometry::{Rect, Vec2};
use crate::sprite::Sprite;
use crate::tilemap::Tilemap;

pub const GRAVITY_PER_TICK: f32 = 0.1;
pub const TERMINAL_FALL_SPEED: f32 = 5.0;
pub const HORIZONTAL_DRAG_PER_TICK: f32 = 0.1;
/// Sprites are padded around the hitbox by this much.
pub const SPRITE_OFFSET: Vec2 = Vec2::new(-3.0, -3.0);

/// Contacts found during the most recent tick only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionFlags {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl CollisionFlags {
    pub fn any(&self) -> bool {
        self.up || self.down || self.left || self.right
    }

    pub fn horizontal(&self) -> bool {
        self.left || self.right
    }
}

#[derive(Debug, Clone)]
pub struct PhysicsBody {
    position: Vec2,
    size: (u32, u32),
    pub velocity: Vec2,
    collisions: CollisionFlags,
    facing_flipped: bool,
    action: Action,
    clips: ClipSet,
    cursor: AnimationCursor,
    last_movement: Vec2,
}

impl PhysicsBody {
    /// New body at `position` (top-left), playing its idle clip.
    pub fn new(clips: ClipSet, position: Vec2, size: (u32, u32)) -> Option<Self> {
        let idle = Arc::clone(clips.clip(Action::Idle)?);
        Some(Self {
            position,
            size,
            velocity: Vec2::ZERO,
            collisions: CollisionFlags::default(),
            facing_flipped: false,
            action: Action::Idle,
            clips,
            cursor: AnimationCursor::new(idle),
            last_movement: Vec2::ZERO,
        })
    }

    pub fn kind(&self) -> EntityKind {
        self.clips.kind()
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn rect(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.size.0 as f32,
            self.size.1 as f32,
        )
    }

    pub fn center(&self) -> Vec2 {
        self.rect().center()
    }

    /// Moves the body without collision checks.
    pub fn teleport(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn collisions(&self) -> CollisionFlags {
        self.collisions
    }

    pub fn facing_flipped(&self) -> bool {
        self.facing_flipped
    }

    pub fn set_facing_flipped(&mut self, flipped: bool) {
        self.facing_flipped = flipped;
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn cursor(&self) -> &AnimationCursor {
        &self.cursor
    }

    pub fn last_movement(&self) -> Vec2 {
        self.last_movement
    }

    pub fn current_sprite(&self) -> &Sprite {
        self.cursor.current_sprite()
    }

    /// Switches to `action` with a fresh cursor. Returns `false` when the action
    /// was already current or has no clip for this kind.
    pub fn set_action(&mut self, action: Action) -> bool {
        if action == self.action {
            return false;
        }
        let Some(clip) = self.clips.clip(action) else {
            warn!(kind = %self.kind(), action = %action, "animation_action_unresolved");
            return false;
        };
        self.cursor = AnimationCursor::new(Arc::clone(clip));
        self.action = action;
        true
    }

    /// One simulation tick: resolve X against nearby solids, then Y against the
    /// corrected position, then gravity and animation.
    pub fn update(&mut self, tilemap: &Tilemap, movement: Vec2) {
        self.collisions = CollisionFlags::default();
        let motion = movement + self.velocity;

        self.position.x += motion.x;
        let mut rect = self.rect();
        for solid in tilemap.solid_neighbors_of(self.position) {
            if rect.overlaps(&solid) {
                if motion.x > 0.0 {
                    rect.set_right(solid.left());
                    self.collisions.right = true;
                }
                if motion.x < 0.0 {
                    rect.set_left(solid.right());
                    self.collisions.left = true;
                }
                self.position.x = rect.x;
            }
        }

        self.position.y += motion.y;
        let mut rect = self.rect();
        for solid in tilemap.solid_neighbors_of(self.position) {
            if rect.overlaps(&solid) {
                if motion.y > 0.0 {
                    rect.set_bottom(solid.top());
                    self.collisions.down = true;
                }
                if motion.y < 0.0 {
                    rect.set_top(solid.bottom());
                    self.collisions.up = true;
                }
                self.position.y = rect.y;
            }
        }

        if movement.x > 0.0 {
            self.facing_flipped = false;
        }
        if movement.x < 0.0 {
            self.facing_flipped = true;
        }
        self.last_movement = movement;

        self.velocity.y = (self.velocity.y + GRAVITY_PER_TICK).min(TERMINAL_FALL_SPEED);
        if self.collisions.down || self.collisions.up {
            self.velocity.y = 0.0;
        }

        self.cursor.advance();
    }

    /// Steps horizontal velocity toward zero without crossing it.
    pub fn decay_horizontal_velocity(&mut self) {
        if self.velocity.x > 0.0 {
            self.velocity.x = (self.velocity.x - HORIZONTAL_DRAG_PER_TICK).max(0.0);
        } else {
            self.velocity.x = (self.velocity.x + HORIZONTAL_DRAG_PER_TICK).min(0.0);
        }
    }

    /// Screen-space top-left for the current sprite given the camera offset.
    pub fn sprite_origin(&self, offset: (i32, i32)) -> Vec2 {
        Vec2::new(
            self.position.x - offset.0 as f32 + SPRITE_OFFSET.x,
            self.position.y - offset.1 as f32 + SPRITE_OFFSET.y,
        )
    }
}
