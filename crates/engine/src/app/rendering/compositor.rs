use super::surface::Surface;

pub const SILHOUETTE_COLOR: [u8; 4] = [0, 0, 0, 180];
pub const TRANSITION_COLOR: [u8; 4] = [0, 0, 0, 255];
/// Transition values run from `-TRANSITION_SPAN` to `TRANSITION_SPAN`.
pub const TRANSITION_SPAN: i32 = 30;
const TRANSITION_RADIUS_SCALE: i32 = 8;
const TERRAIN_OUTLINE_PX: i32 = 2;
const ACTORS_OUTLINE_PX: i32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    /// Opaque backdrop. Receives the outlines of the other two layers.
    Background,
    Terrain,
    Actors,
}

/// Three layers flattened into one frame each render.
#[derive(Debug)]
pub struct Compositor {
    background: Surface,
    terrain: Surface,
    actors: Surface,
    transition: i32,
}

impl Compositor {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            background: Surface::new(width, height),
            terrain: Surface::new(width, height),
            actors: Surface::new(width, height),
            transition: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.background.width()
    }

    pub fn height(&self) -> u32 {
        self.background.height()
    }

    /// Clears the terrain and actors layers and resets the background to `backdrop`.
    pub fn begin_frame(&mut self, backdrop: [u8; 4]) {
        self.background.fill(backdrop);
        self.terrain.clear();
        self.actors.clear();
        self.transition = 0;
    }

    pub fn layer_mut(&mut self, layer: Layer) -> &mut Surface {
        match layer {
            Layer::Background => &mut self.background,
            Layer::Terrain => &mut self.terrain,
            Layer::Actors => &mut self.actors,
        }
    }

    pub fn set_transition(&mut self, transition: i32) {
        self.transition = transition.clamp(-TRANSITION_SPAN, TRANSITION_SPAN);
    }

    pub fn transition(&self) -> i32 {
        self.transition
    }

    /// Flattens the layers into the background and returns it.
    pub fn composite(&mut self) -> &Surface {
        stamp_outline(&mut self.background, &self.terrain, TERRAIN_OUTLINE_PX);
        stamp_outline(&mut self.background, &self.actors, ACTORS_OUTLINE_PX);

        if self.transition != 0 {
            let center = (
                self.actors.width() as i32 / 2,
                self.actors.height() as i32 / 2,
            );
            let radius = (TRANSITION_SPAN - self.transition.abs()) * TRANSITION_RADIUS_SCALE;
            self.actors
                .fill_outside_circle(center, radius, TRANSITION_COLOR);
        }

        self.background.blit(&self.terrain, 0, 0);
        self.background.blit(&self.actors, 0, 0);
        &self.background
    }
}

fn stamp_outline(target: &mut Surface, layer: &Surface, spread: i32) {
    let shadow = layer.silhouette(SILHOUETTE_COLOR);
    target.blit(&shadow, 0, 0);
    for (dx, dy) in [(-spread, 0), (spread, 0), (0, -spread), (0, spread)] {
        target.blit(&shadow, dx, dy);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: [u8; 4] = [255, 255, 255, 255];

    #[test]
    fn actors_draw_over_terrain_over_background() {
        let mut compositor = Compositor::new(8, 8);
        compositor.begin_frame([10, 10, 10, 255]);
        compositor
            .layer_mut(Layer::Terrain)
            .fill_rect(2, 2, 2, 2, [0, 255, 0, 255]);
        compositor
            .layer_mut(Layer::Actors)
            .fill_rect(3, 3, 1, 1, [255, 0, 0, 255]);

        let frame = compositor.composite();

        assert_eq!(frame.pixel(2, 2), Some([0, 255, 0, 255]));
        assert_eq!(frame.pixel(3, 3), Some([255, 0, 0, 255]));
        assert_eq!(frame.pixel(7, 7), Some([10, 10, 10, 255]));
    }

    #[test]
    fn terrain_outline_reaches_two_pixels_and_actor_outline_one() {
        let mut compositor = Compositor::new(16, 16);
        compositor.begin_frame(WHITE);
        compositor.layer_mut(Layer::Terrain).fill_rect(4, 4, 1, 1, WHITE);
        compositor.layer_mut(Layer::Actors).fill_rect(12, 4, 1, 1, WHITE);

        let frame = compositor.composite().clone();

        let darkened = |x: i32, y: i32| frame.pixel(x, y).expect("pixel")[0] < 255;
        assert!(darkened(6, 4));
        assert!(darkened(2, 4));
        assert!(!darkened(5, 4));
        assert!(darkened(13, 4));
        assert!(!darkened(14, 4));
        assert!(!darkened(12, 6));
    }

    #[test]
    fn zero_transition_draws_no_wipe() {
        let mut compositor = Compositor::new(8, 8);
        compositor.begin_frame(WHITE);
        compositor.set_transition(0);

        assert_eq!(compositor.composite().pixel(0, 0), Some(WHITE));
    }

    #[test]
    fn wipe_blacks_out_everything_outside_the_circle() {
        let mut compositor = Compositor::new(320, 240);
        compositor.begin_frame(WHITE);
        compositor.set_transition(-25);

        let frame = compositor.composite();

        assert_eq!(frame.pixel(160, 120), Some(WHITE));
        assert_eq!(frame.pixel(200, 120), Some(WHITE));
        assert_eq!(frame.pixel(201, 120), Some(TRANSITION_COLOR));
        assert_eq!(frame.pixel(0, 0), Some(TRANSITION_COLOR));
    }

    #[test]
    fn full_transition_covers_the_frame() {
        let mut compositor = Compositor::new(32, 32);
        compositor.begin_frame(WHITE);
        compositor.set_transition(45);
        assert_eq!(compositor.transition(), TRANSITION_SPAN);

        let frame = compositor.composite();
        assert_eq!(frame.pixel(16, 16), Some([0, 0, 0, 255]));
    }

    #[test]
    fn begin_frame_clears_previous_layers() {
        let mut compositor = Compositor::new(4, 4);
        compositor.begin_frame(WHITE);
        compositor
            .layer_mut(Layer::Actors)
            .fill_rect(0, 0, 4, 4, [255, 0, 0, 255]);
        compositor.composite();

        compositor.begin_frame(WHITE);
        let frame = compositor.composite();
        assert_eq!(frame.pixel(1, 1), Some(WHITE));
    }
}
