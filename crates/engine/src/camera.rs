use crate::geometry::Vec2;

/// Fraction of the remaining distance closed per tick is `1 / FOLLOW_DIVISOR`.
pub const FOLLOW_DIVISOR: f32 = 30.0;

/// Smoothed scroll that trails a target point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    scroll: Vec2,
    viewport: (u32, u32),
}

impl Camera {
    pub fn new(viewport: (u32, u32)) -> Self {
        Self {
            scroll: Vec2::ZERO,
            viewport,
        }
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn scroll(&self) -> Vec2 {
        self.scroll
    }

    fn desired_scroll(&self, target_center: Vec2) -> Vec2 {
        Vec2::new(
            target_center.x - self.viewport.0 as f32 / 2.0,
            target_center.y - self.viewport.1 as f32 / 2.0,
        )
    }

    /// Moves a fixed fraction of the way toward centring `target_center`.
    pub fn follow(&mut self, target_center: Vec2) {
        let desired = self.desired_scroll(target_center);
        self.scroll.x += (desired.x - self.scroll.x) / FOLLOW_DIVISOR;
        self.scroll.y += (desired.y - self.scroll.y) / FOLLOW_DIVISOR;
    }

    pub fn snap_to(&mut self, target_center: Vec2) {
        self.scroll = self.desired_scroll(target_center);
    }

    /// Integer offset used for drawing. Truncates toward zero.
    pub fn render_offset(&self) -> (i32, i32) {
        (self.scroll.x as i32, self.scroll.y as i32)
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        let (ox, oy) = self.render_offset();
        Vec2::new(world.x - ox as f32, world.y - oy as f32)
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        let (ox, oy) = self.render_offset();
        Vec2::new(screen.x + ox as f32, screen.y + oy as f32)
    }
}
