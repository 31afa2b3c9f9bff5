/// Entities: Player, Obstacle (spike), Portal, and the per-frame input snapshot.
///
/// All positions are in playfield units (800×400, y grows downward).
/// Spikes are anchored at their base; portals and the player at their top-left.

use crate::config::PhysicsConfig;
use super::physics::Rect;

// ── Playfield geometry ──

pub const FIELD_WIDTH: f32 = 800.0;
pub const FIELD_HEIGHT: f32 = 400.0;
pub const FLOOR_Y: f32 = 360.0;
pub const CEILING_Y: f32 = 50.0;

pub const PLAYER_X: f32 = 100.0;
pub const PLAYER_START_Y: f32 = 300.0;
pub const PLAYER_SIZE: f32 = 30.0;

pub const SPIKE_WIDTH: f32 = 30.0;
pub const SPIKE_HEIGHT: f32 = 45.0;
pub const PORTAL_SIZE: f32 = 30.0;

// ── Input ──

/// Logical actions. Physical keys and gamepad buttons map onto these.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
    Jump,
    Descend,
    SelectPrev,
    SelectNext,
    Confirm,
}

impl Action {
    #[inline]
    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// A small set of actions.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct ActionSet(u8);

impl ActionSet {
    pub const EMPTY: ActionSet = ActionSet(0);

    pub fn insert(&mut self, action: Action) {
        self.0 |= action.bit();
    }

    #[allow(dead_code)]
    pub fn with(mut self, action: Action) -> Self {
        self.insert(action);
        self
    }

    pub fn contains(self, action: Action) -> bool {
        self.0 & action.bit() != 0
    }
}

impl FromIterator<Action> for ActionSet {
    fn from_iter<I: IntoIterator<Item = Action>>(iter: I) -> Self {
        let mut set = ActionSet::EMPTY;
        for a in iter {
            set.insert(a);
        }
        set
    }
}

/// Frame input: held actions drive physics (level-triggered),
/// fresh presses drive menu navigation (edge-triggered).
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInput {
    pub held: ActionSet,
    pub pressed: ActionSet,
}

impl FrameInput {
    #[allow(dead_code)]
    pub fn holding(held: ActionSet) -> Self {
        FrameInput { held, pressed: ActionSet::EMPTY }
    }

    #[allow(dead_code)]
    pub fn pressing(pressed: ActionSet) -> Self {
        FrameInput { held: pressed, pressed }
    }

    #[inline]
    pub fn held(&self, action: Action) -> bool {
        self.held.contains(action)
    }

    #[inline]
    pub fn pressed(&self, action: Action) -> bool {
        self.pressed.contains(action)
    }
}

// ── Player ──

#[derive(Clone, Debug)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub dy: f32,
    pub on_ground: bool,
    pub flying: bool,
    pub fly_start_ms: u64,
    pub max_fly_ms: u64,
    /// Horizontal scroll speed applied to the world each frame.
    pub speed: f32,
    pub gravity: f32,
    pub jump_force: f32,
    pub fly_speed: f32,
}

impl Player {
    pub fn new(physics: &PhysicsConfig) -> Self {
        Player {
            x: PLAYER_X,
            y: PLAYER_START_Y,
            width: PLAYER_SIZE,
            height: PLAYER_SIZE,
            dy: 0.0,
            on_ground: false,
            flying: false,
            fly_start_ms: 0,
            max_fly_ms: physics.max_fly_ms,
            speed: physics.scroll_speed,
            gravity: physics.gravity,
            jump_force: physics.jump_force,
            fly_speed: physics.fly_speed,
        }
    }

    /// Back to the level start position. Tuning constants are kept.
    pub fn reset(&mut self) {
        self.y = PLAYER_START_Y;
        self.dy = 0.0;
        self.on_ground = false;
        self.flying = false;
        self.fly_start_ms = 0;
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    /// Milliseconds of flight left, or None when not flying.
    pub fn flight_remaining_ms(&self, now_ms: u64) -> Option<u64> {
        if !self.flying {
            return None;
        }
        let elapsed = now_ms.saturating_sub(self.fly_start_ms);
        Some(self.max_fly_ms.saturating_sub(elapsed))
    }
}

// ── Obstacles ──

/// Triangular spike. `y` is the base line; the apex sits `height` above it.
#[derive(Clone, Debug, PartialEq)]
pub struct Obstacle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Obstacle {
    pub fn new(x: f32) -> Self {
        Obstacle { x, y: FLOOR_Y, width: SPIKE_WIDTH, height: SPIKE_HEIGHT }
    }

    /// Hitbox: the triangle's bounding box, not the triangle itself.
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y - self.height, self.x + self.width, self.y)
    }

    pub fn apex(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y - self.height)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PortalKind {
    /// Grants timed flight.
    Fly,
    /// Cosmetic glow only.
    Speed,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Portal {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub kind: PortalKind,
}

impl Portal {
    /// A portal resting on the floor.
    pub fn new(x: f32, kind: PortalKind) -> Self {
        Portal {
            x,
            y: FLOOR_Y - PORTAL_SIZE,
            width: PORTAL_SIZE,
            height: PORTAL_SIZE,
            kind,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_set_membership() {
        let set = ActionSet::EMPTY.with(Action::Jump).with(Action::Confirm);
        assert!(set.contains(Action::Jump));
        assert!(set.contains(Action::Confirm));
        assert!(!set.contains(Action::Descend));
        assert_ne!(set, ActionSet::EMPTY);
        assert_eq!(ActionSet::default(), ActionSet::EMPTY);

        let collected: ActionSet = [Action::SelectPrev, Action::SelectNext].into_iter().collect();
        assert!(collected.contains(Action::SelectPrev));
        assert!(collected.contains(Action::SelectNext));
        assert!(!collected.contains(Action::Jump));
    }

    #[test]
    fn player_reset_keeps_tuning() {
        let mut p = Player::new(&PhysicsConfig::default());
        p.y = 120.0;
        p.dy = -4.0;
        p.on_ground = true;
        p.flying = true;
        p.fly_start_ms = 999;
        p.reset();
        assert_eq!(p.y, PLAYER_START_Y);
        assert_eq!(p.dy, 0.0);
        assert!(!p.on_ground);
        assert!(!p.flying);
        assert_eq!(p.fly_start_ms, 0);
        assert_eq!(p.gravity, 0.8);
        assert_eq!(p.jump_force, -13.0);
        assert_eq!(p.max_fly_ms, 60_000);
    }

    #[test]
    fn spike_hitbox_is_bounding_box() {
        let o = Obstacle::new(400.0);
        let b = o.bounds();
        assert_eq!((b.left, b.top, b.right, b.bottom), (400.0, 315.0, 430.0, 360.0));
        assert_eq!(o.apex(), (415.0, 315.0));
    }

    #[test]
    fn portal_sits_on_floor() {
        let p = Portal::new(50.0, PortalKind::Fly);
        assert_eq!(p.y + p.height, FLOOR_Y);
    }

    #[test]
    fn flight_remaining_counts_down() {
        let mut p = Player::new(&PhysicsConfig::default());
        assert_eq!(p.flight_remaining_ms(10), None);
        p.flying = true;
        p.fly_start_ms = 1_000;
        assert_eq!(p.flight_remaining_ms(1_000), Some(60_000));
        assert_eq!(p.flight_remaining_ms(31_000), Some(30_000));
        assert_eq!(p.flight_remaining_ms(90_000), Some(0));
    }
}
