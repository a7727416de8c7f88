use platformer_engine::{Action, PhysicsBody, Tilemap, Vec2};

/// Airborne ticks after which the player counts as jumping or wall sliding.
const AIRBORNE_GRACE_TICKS: u32 = 4;
/// Airborne ticks after which a fall is fatal.
const FATAL_AIR_TIME: u32 = 120;
const WALL_SLIDE_MAX_FALL_SPEED: f32 = 0.5;
const JUMP_SPEED: f32 = 3.0;
const WALL_JUMP_SPEED: Vec2 = Vec2::new(3.5, -2.5);
const DASH_TICKS: i32 = 60;
/// Ticks remaining at which the dash burst ends.
const DASH_BURST_END: i32 = 50;
const DASH_SPEED: f32 = 8.0;
const DASH_EXIT_FACTOR: f32 = 0.1;

/// Outcome of a player tick the level has to react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PlayerEvent {
    None,
    FellToDeath,
}

#[derive(Debug, Clone)]
pub(crate) struct Player {
    body: PhysicsBody,
    air_time: u32,
    jumps: u32,
    wall_slide: bool,
    /// Signed dash countdown; the sign is the dash direction.
    dashing: i32,
}

impl Player {
    pub(crate) fn new(body: PhysicsBody) -> Self {
        Self {
            body,
            air_time: 0,
            jumps: 1,
            wall_slide: false,
            dashing: 0,
        }
    }

    pub(crate) fn body(&self) -> &PhysicsBody {
        &self.body
    }

    #[cfg(test)]
    pub(crate) fn body_mut(&mut self) -> &mut PhysicsBody {
        &mut self.body
    }

    #[cfg(test)]
    pub(crate) fn air_time(&self) -> u32 {
        self.air_time
    }

    #[cfg(test)]
    pub(crate) fn jumps(&self) -> u32 {
        self.jumps
    }

    #[cfg(test)]
    pub(crate) fn is_wall_sliding(&self) -> bool {
        self.wall_slide
    }

    #[cfg(test)]
    pub(crate) fn dashing(&self) -> i32 {
        self.dashing
    }

    /// True while the dash burst makes the player invulnerable to traps.
    pub(crate) fn is_dash_attacking(&self) -> bool {
        self.dashing.abs() >= DASH_BURST_END
    }

    /// Hidden during the fast part of a dash.
    pub(crate) fn is_visible(&self) -> bool {
        self.dashing.abs() <= DASH_BURST_END
    }

    pub(crate) fn update(&mut self, tilemap: &Tilemap, movement: Vec2) -> PlayerEvent {
        self.body.update(tilemap, movement);

        self.air_time += 1;
        let event = if self.air_time > FATAL_AIR_TIME {
            PlayerEvent::FellToDeath
        } else {
            PlayerEvent::None
        };

        let collisions = self.body.collisions();
        if collisions.down {
            self.air_time = 0;
            self.jumps = 1;
        }

        self.wall_slide = false;
        if collisions.horizontal() && self.air_time > AIRBORNE_GRACE_TICKS {
            self.wall_slide = true;
            self.body.velocity.y = self.body.velocity.y.min(WALL_SLIDE_MAX_FALL_SPEED);
            self.body.set_facing_flipped(!collisions.right);
            self.body.set_action(Action::WallSlide);
        }

        if !self.wall_slide {
            let action = if self.air_time > AIRBORNE_GRACE_TICKS {
                Action::Jump
            } else if movement.x != 0.0 {
                Action::Run
            } else {
                Action::Idle
            };
            self.body.set_action(action);
        }

        if self.dashing > 0 {
            self.dashing -= 1;
        } else if self.dashing < 0 {
            self.dashing += 1;
        }
        if self.dashing.abs() > DASH_BURST_END {
            self.body.velocity.x = self.dashing.signum() as f32 * DASH_SPEED;
            if self.dashing.abs() == DASH_BURST_END + 1 {
                self.body.velocity.x *= DASH_EXIT_FACTOR;
            }
        }

        self.body.decay_horizontal_velocity();
        event
    }

    /// Wall jump while sliding toward the wall, otherwise a regular jump if one
    /// is left. Returns whether a jump happened.
    pub(crate) fn jump(&mut self) -> bool {
        if self.wall_slide {
            let flipped = self.body.facing_flipped();
            let last_x = self.body.last_movement().x;
            let direction = if flipped && last_x < 0.0 {
                1.0
            } else if !flipped && last_x > 0.0 {
                -1.0
            } else {
                return false;
            };
            self.body.velocity.x = direction * WALL_JUMP_SPEED.x;
            self.body.velocity.y = WALL_JUMP_SPEED.y;
            self.air_time = AIRBORNE_GRACE_TICKS + 1;
            self.jumps = self.jumps.saturating_sub(1);
            return true;
        }
        if self.jumps > 0 {
            self.body.velocity.y = -JUMP_SPEED;
            self.jumps -= 1;
            self.air_time = AIRBORNE_GRACE_TICKS + 1;
            return true;
        }
        false
    }

    /// Starts a dash in the facing direction unless one is running.
    pub(crate) fn dash(&mut self) -> bool {
        if self.dashing != 0 {
            return false;
        }
        self.dashing = if self.body.facing_flipped() {
            -DASH_TICKS
        } else {
            DASH_TICKS
        };
        true
    }
}
