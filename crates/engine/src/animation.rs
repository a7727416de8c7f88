use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::sprite::Sprite;

pub const DEFAULT_FRAME_DURATION_TICKS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Player,
    Enemy,
    Trap,
    Prize,
    Catnip,
    Button,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Idle,
    Run,
    Jump,
    Slide,
    WallSlide,
    Stun,
    Shoot,
    On,
    Wind,
}

impl EntityKind {
    pub const ALL: [EntityKind; 6] = [
        EntityKind::Player,
        EntityKind::Enemy,
        EntityKind::Trap,
        EntityKind::Prize,
        EntityKind::Catnip,
        EntityKind::Button,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            EntityKind::Player => "player",
            EntityKind::Enemy => "enemy",
            EntityKind::Trap => "trap",
            EntityKind::Prize => "prize",
            EntityKind::Catnip => "catnip",
            EntityKind::Button => "button",
        }
    }

    /// Actions that must have a clip before a body of this kind can exist.
    pub const fn actions(self) -> &'static [Action] {
        match self {
            EntityKind::Player => &[
                Action::Idle,
                Action::Run,
                Action::Jump,
                Action::Slide,
                Action::WallSlide,
            ],
            EntityKind::Enemy => &[Action::Idle, Action::Run, Action::Stun, Action::Shoot],
            EntityKind::Trap | EntityKind::Catnip => &[Action::Idle],
            EntityKind::Prize => &[Action::Idle, Action::Wind],
            EntityKind::Button => &[Action::Idle, Action::On],
        }
    }
}

impl Action {
    pub const fn as_str(self) -> &'static str {
        match self {
            Action::Idle => "idle",
            Action::Run => "run",
            Action::Jump => "jump",
            Action::Slide => "slide",
            Action::WallSlide => "wall_slide",
            Action::Stun => "stun",
            Action::Shoot => "shoot",
            Action::On => "on",
            Action::Wind => "wind",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnimationError {
    #[error("animation clip must contain at least one frame")]
    EmptyClip,
    #[error("animation frame duration must be at least one tick")]
    ZeroFrameDuration,
    #[error("no animation clip registered for {kind}/{action}")]
    MissingClip { kind: EntityKind, action: Action },
}

/// Immutable frame sequence. Shared behind `Arc` by every cursor playing it.
#[derive(Debug)]
pub struct Clip {
    frames: Vec<Sprite>,
    frame_duration: u32,
    looping: bool,
}

impl Clip {
    pub fn new(
        frames: Vec<Sprite>,
        frame_duration: u32,
        looping: bool,
    ) -> Result<Self, AnimationError> {
        if frames.is_empty() {
            return Err(AnimationError::EmptyClip);
        }
        if frame_duration == 0 {
            return Err(AnimationError::ZeroFrameDuration);
        }
        Ok(Self {
            frames,
            frame_duration,
            looping,
        })
    }

    pub fn frames(&self) -> &[Sprite] {
        &self.frames
    }

    pub fn frame_duration(&self) -> u32 {
        self.frame_duration
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Total ticks for one pass through the clip.
    pub fn length_ticks(&self) -> u32 {
        self.frame_duration.saturating_mul(self.frames.len() as u32)
    }
}

/// Per-entity progress into a shared clip.
#[derive(Debug, Clone)]
pub struct AnimationCursor {
    clip: Arc<Clip>,
    frame: u32,
    done: bool,
}

impl AnimationCursor {
    pub fn new(clip: Arc<Clip>) -> Self {
        Self {
            clip,
            frame: 0,
            done: false,
        }
    }

    pub fn advance(&mut self) {
        let length = self.clip.length_ticks();
        if self.clip.looping {
            self.frame = (self.frame + 1) % length;
        } else {
            let last = length - 1;
            self.frame = (self.frame + 1).min(last);
            if self.frame >= last {
                self.done = true;
            }
        }
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn image_index(&self) -> usize {
        (self.frame / self.clip.frame_duration) as usize
    }

    pub fn current_sprite(&self) -> &Sprite {
        let index = self.image_index().min(self.clip.frames.len() - 1);
        &self.clip.frames[index]
    }

    pub fn clip(&self) -> &Arc<Clip> {
        &self.clip
    }
}

/// Clip table keyed by `(EntityKind, Action)`, filled by the asset collaborator.
#[derive(Debug, Default, Clone)]
pub struct ClipLibrary {
    clips: HashMap<(EntityKind, Action), Arc<Clip>>,
}

impl ClipLibrary {
    pub fn insert(&mut self, kind: EntityKind, action: Action, clip: Clip) {
        self.clips.insert((kind, action), Arc::new(clip));
    }

    pub fn get(&self, kind: EntityKind, action: Action) -> Option<&Arc<Clip>> {
        self.clips.get(&(kind, action))
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    /// Resolves every action `kind` declares into a set bodies can share.
    pub fn resolve(&self, kind: EntityKind) -> Result<ClipSet, AnimationError> {
        let mut clips = HashMap::with_capacity(kind.actions().len());
        for &action in kind.actions() {
            let clip = self
                .get(kind, action)
                .ok_or(AnimationError::MissingClip { kind, action })?;
            clips.insert(action, Arc::clone(clip));
        }
        Ok(ClipSet {
            kind,
            clips: Arc::new(clips),
        })
    }
}

/// All clips of one entity kind, resolved once at level load.
#[derive(Debug, Clone)]
pub struct ClipSet {
    kind: EntityKind,
    clips: Arc<HashMap<Action, Arc<Clip>>>,
}

impl ClipSet {
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn clip(&self, action: Action) -> Option<&Arc<Clip>> {
        self.clips.get(&action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(count: usize) -> Vec<Sprite> {
        (0..count)
            .map(|index| Sprite::solid(1, 1, [index as u8, 0, 0, 255]))
            .collect()
    }

    fn library_for(kind: EntityKind) -> ClipLibrary {
        let mut library = ClipLibrary::default();
        for &action in kind.actions() {
            library.insert(kind, action, Clip::new(frames(2), 5, true).expect("clip"));
        }
        library
    }

    #[test]
    fn looping_clip_wraps_after_last_tick() {
        let clip = Arc::new(Clip::new(frames(3), 5, true).expect("clip"));
        let mut cursor = AnimationCursor::new(clip);
        for _ in 0..14 {
            cursor.advance();
        }
        assert_eq!(cursor.frame(), 14);
        assert_eq!(cursor.image_index(), 2);

        cursor.advance();
        assert_eq!(cursor.frame(), 0);
        assert!(!cursor.is_done());
    }

    #[test]
    fn non_looping_clip_sticks_on_last_tick_and_reports_done() {
        let clip = Arc::new(Clip::new(frames(3), 5, false).expect("clip"));
        let mut cursor = AnimationCursor::new(clip);
        for _ in 0..13 {
            cursor.advance();
        }
        assert!(!cursor.is_done());

        cursor.advance();
        assert_eq!(cursor.frame(), 14);
        assert!(cursor.is_done());

        cursor.advance();
        assert_eq!(cursor.frame(), 14);
        assert!(cursor.is_done());
    }

    #[test]
    fn image_index_is_frame_divided_by_duration() {
        let clip = Arc::new(Clip::new(frames(4), 6, true).expect("clip"));
        let mut cursor = AnimationCursor::new(clip);
        for _ in 0..11 {
            cursor.advance();
        }
        assert_eq!(cursor.image_index(), 1);
        assert_eq!(cursor.current_sprite().pixel(0, 0), Some([1, 0, 0, 255]));
    }

    #[test]
    fn cursors_share_frames_but_not_progress() {
        let clip = Arc::new(Clip::new(frames(2), 1, true).expect("clip"));
        let mut first = AnimationCursor::new(Arc::clone(&clip));
        let second = AnimationCursor::new(Arc::clone(&clip));
        first.advance();

        assert_eq!(first.frame(), 1);
        assert_eq!(second.frame(), 0);
        assert!(Arc::ptr_eq(first.clip(), second.clip()));
        assert_eq!(Arc::strong_count(&clip), 3);
    }

    #[test]
    fn clip_rejects_empty_frames_and_zero_duration() {
        assert_eq!(
            Clip::new(Vec::new(), 5, true).expect_err("empty"),
            AnimationError::EmptyClip
        );
        assert_eq!(
            Clip::new(frames(1), 0, true).expect_err("zero"),
            AnimationError::ZeroFrameDuration
        );
    }

    #[test]
    fn resolve_reports_first_missing_action() {
        let mut library = ClipLibrary::default();
        library.insert(
            EntityKind::Button,
            Action::Idle,
            Clip::new(frames(1), 5, true).expect("clip"),
        );
        let error = library.resolve(EntityKind::Button).expect_err("missing");
        assert_eq!(
            error,
            AnimationError::MissingClip {
                kind: EntityKind::Button,
                action: Action::On,
            }
        );
    }

    #[test]
    fn resolved_sets_share_clip_allocations() {
        let library = library_for(EntityKind::Prize);
        let a = library.resolve(EntityKind::Prize).expect("set");
        let b = library.resolve(EntityKind::Prize).expect("set");
        let clip_a = a.clip(Action::Wind).expect("wind");
        let clip_b = b.clip(Action::Wind).expect("wind");
        assert!(Arc::ptr_eq(clip_a, clip_b));
        assert!(a.clip(Action::Run).is_none());
    }
}
