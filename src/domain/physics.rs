/// Physics layer: pure per-frame rules for the player and scrolling entities.
///
/// ## Vertical motion
///
/// Each playing frame applies, in order:
///   1. Jump     — on the ground and jump held: `dy = jump_force`
///   2. Flight   — while flying: `dy` is set directly from input
///   3. Gravity  — when not flying: `dy += gravity` (no terminal velocity)
///   4. Integrate — `y += dy`
///   5. Bounds   — ceiling clamp, floor snap
///
/// ## Collision
///
/// Everything is an axis-aligned box. Spikes use their bounding box.
/// Overlap is strict: boxes that only share an edge do not collide.

use super::entity::{FrameInput, Action, Obstacle, Player, Portal, PortalKind, CEILING_Y, FLOOR_Y};

/// Axis-aligned box, `left < right`, `top < bottom`.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Rect { left, top, right, bottom }
    }

    /// Strict overlap test. Touching edges do not count.
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left < other.right
            && self.right > other.left
            && self.top < other.bottom
            && self.bottom > other.top
    }
}

/// What the flight step did this frame.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FlightUpdate {
    NotFlying,
    Steering,
    Expired,
}

// ══════════════════════════════════════════════════════════════
// Vertical motion
// ══════════════════════════════════════════════════════════════

/// Level-triggered: fires every frame the player stands on the ground
/// with jump held. Returns true if the impulse was applied.
pub fn apply_jump(player: &mut Player, input: &FrameInput) -> bool {
    if !player.flying && input.held(Action::Jump) && player.on_ground {
        player.dy = player.jump_force;
        true
    } else {
        false
    }
}

/// Steer while the flight window is open; drop out of flight once it closes.
pub fn update_flight(player: &mut Player, input: &FrameInput, now_ms: u64) -> FlightUpdate {
    if !player.flying {
        return FlightUpdate::NotFlying;
    }

    if now_ms.saturating_sub(player.fly_start_ms) < player.max_fly_ms {
        player.dy = if input.held(Action::Jump) {
            -player.fly_speed
        } else if input.held(Action::Descend) {
            player.fly_speed
        } else {
            0.0
        };
        FlightUpdate::Steering
    } else {
        player.flying = false;
        // Fall resumes at once; not accumulated on top of the old dy.
        player.dy = player.gravity;
        FlightUpdate::Expired
    }
}

pub fn apply_gravity(player: &mut Player) {
    if !player.flying {
        player.dy += player.gravity;
    }
}

pub fn integrate(player: &mut Player) {
    player.y += player.dy;
}

/// Clamp to the ceiling and snap to the floor.
///
/// While flying above the floor `on_ground` is left untouched, so it can
/// still read true after flying off the floor.
pub fn clamp_to_bounds(player: &mut Player) {
    if player.y < CEILING_Y {
        player.y = CEILING_Y;
    }
    if player.y + player.height > FLOOR_Y {
        player.y = FLOOR_Y - player.height;
        player.dy = 0.0;
        player.on_ground = true;
    } else if !player.flying {
        player.on_ground = false;
    }
}

// ══════════════════════════════════════════════════════════════
// Scrolling
// ══════════════════════════════════════════════════════════════

/// Move everything left by `speed` and drop what has fully left the screen.
pub fn scroll(obstacles: &mut Vec<Obstacle>, portals: &mut Vec<Portal>, speed: f32) {
    for o in obstacles.iter_mut() {
        o.x -= speed;
    }
    for p in portals.iter_mut() {
        p.x -= speed;
    }
    obstacles.retain(|o| o.x + o.width > 0.0);
    portals.retain(|p| p.x + p.width > 0.0);
}

// ══════════════════════════════════════════════════════════════
// Collision
// ══════════════════════════════════════════════════════════════

/// Does the player overlap any spike's hitbox?
pub fn hits_hazard(player: &Player, obstacles: &[Obstacle]) -> bool {
    let body = player.bounds();
    obstacles.iter().any(|o| body.overlaps(&o.bounds()))
}

/// Remove every portal the player overlaps and return their kinds, in list order.
pub fn take_touched_portals(player: &Player, portals: &mut Vec<Portal>) -> Vec<PortalKind> {
    let body = player.bounds();
    let mut touched = Vec::new();
    portals.retain(|p| {
        if body.overlaps(&p.bounds()) {
            touched.push(p.kind);
            false
        } else {
            true
        }
    });
    touched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PhysicsConfig;
    use crate::domain::entity::{ActionSet, PLAYER_SIZE};

    fn player() -> Player {
        Player::new(&PhysicsConfig::default())
    }

    fn grounded() -> Player {
        let mut p = player();
        p.y = FLOOR_Y - p.height;
        p.on_ground = true;
        p
    }

    fn hold(actions: &[Action]) -> FrameInput {
        FrameInput::holding(actions.iter().copied().collect::<ActionSet>())
    }

    // ── Rect ──

    #[test]
    fn rects_overlap_strictly() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps(&Rect::new(5.0, 5.0, 15.0, 15.0)));
        assert!(a.overlaps(&Rect::new(2.0, 2.0, 3.0, 3.0)));
    }

    #[test]
    fn touching_edges_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(!a.overlaps(&Rect::new(10.0, 0.0, 20.0, 10.0)));
        assert!(!a.overlaps(&Rect::new(-10.0, 0.0, 0.0, 10.0)));
        assert!(!a.overlaps(&Rect::new(0.0, 10.0, 10.0, 20.0)));
        assert!(!a.overlaps(&Rect::new(0.0, -10.0, 10.0, 0.0)));
    }

    // ── Jump ──

    #[test]
    fn jump_from_ground() {
        let mut p = grounded();
        assert!(apply_jump(&mut p, &hold(&[Action::Jump])));
        assert_eq!(p.dy, -13.0);
    }

    #[test]
    fn no_jump_in_air_or_while_flying() {
        let mut p = player();
        assert!(!apply_jump(&mut p, &hold(&[Action::Jump])));
        assert_eq!(p.dy, 0.0);

        let mut p = grounded();
        p.flying = true;
        assert!(!apply_jump(&mut p, &hold(&[Action::Jump])));
    }

    #[test]
    fn no_jump_without_input() {
        let mut p = grounded();
        assert!(!apply_jump(&mut p, &FrameInput::default()));
        assert_eq!(p.dy, 0.0);
    }

    // ── Flight ──

    #[test]
    fn flight_steering() {
        let mut p = player();
        p.flying = true;
        p.fly_start_ms = 1_000;

        assert_eq!(update_flight(&mut p, &hold(&[Action::Jump]), 2_000), FlightUpdate::Steering);
        assert_eq!(p.dy, -7.0);
        assert_eq!(update_flight(&mut p, &hold(&[Action::Descend]), 2_000), FlightUpdate::Steering);
        assert_eq!(p.dy, 7.0);
        assert_eq!(update_flight(&mut p, &FrameInput::default(), 2_000), FlightUpdate::Steering);
        assert_eq!(p.dy, 0.0);
    }

    #[test]
    fn jump_wins_over_descend_in_flight() {
        let mut p = player();
        p.flying = true;
        update_flight(&mut p, &hold(&[Action::Jump, Action::Descend]), 0);
        assert_eq!(p.dy, -7.0);
    }

    #[test]
    fn flight_expires_at_max_duration() {
        let mut p = player();
        p.flying = true;
        p.fly_start_ms = 1_000;
        p.dy = -7.0;

        assert_eq!(update_flight(&mut p, &FrameInput::default(), 60_999), FlightUpdate::Steering);
        assert!(p.flying);
        assert_eq!(update_flight(&mut p, &FrameInput::default(), 61_000), FlightUpdate::Expired);
        assert!(!p.flying);
        assert_eq!(p.dy, p.gravity);
    }

    #[test]
    fn flight_noop_when_grounded() {
        let mut p = grounded();
        p.dy = 3.0;
        assert_eq!(update_flight(&mut p, &hold(&[Action::Jump]), 0), FlightUpdate::NotFlying);
        assert_eq!(p.dy, 3.0);
    }

    // ── Gravity / integration ──

    #[test]
    fn gravity_accumulates_without_cap() {
        let mut p = player();
        for _ in 0..100 {
            apply_gravity(&mut p);
        }
        assert!((p.dy - 80.0).abs() < 1e-2);
    }

    #[test]
    fn gravity_skipped_while_flying() {
        let mut p = player();
        p.flying = true;
        apply_gravity(&mut p);
        assert_eq!(p.dy, 0.0);
    }

    #[test]
    fn integrate_moves_by_dy() {
        let mut p = player();
        p.dy = -2.5;
        integrate(&mut p);
        assert_eq!(p.y, 297.5);
    }

    // ── Bounds ──

    #[test]
    fn ceiling_clamp() {
        let mut p = player();
        p.y = 10.0;
        p.dy = -13.0;
        clamp_to_bounds(&mut p);
        assert_eq!(p.y, CEILING_Y);
        // Ceiling does not zero velocity.
        assert_eq!(p.dy, -13.0);
        assert!(!p.on_ground);
    }

    #[test]
    fn floor_snap() {
        let mut p = player();
        p.y = 345.0;
        p.dy = 9.0;
        clamp_to_bounds(&mut p);
        assert_eq!(p.y, FLOOR_Y - PLAYER_SIZE);
        assert_eq!(p.dy, 0.0);
        assert!(p.on_ground);
    }

    #[test]
    fn resting_exactly_on_floor_is_airborne() {
        // y + height == floor is not "exceeding" the floor.
        let mut p = grounded();
        p.dy = 0.0;
        clamp_to_bounds(&mut p);
        assert!(!p.on_ground);
    }

    #[test]
    fn on_ground_goes_stale_while_flying() {
        let mut p = grounded();
        p.flying = true;
        p.y = 200.0;
        clamp_to_bounds(&mut p);
        assert!(p.on_ground);
    }

    // ── Scrolling ──

    #[test]
    fn scroll_moves_and_culls() {
        let mut obstacles = vec![Obstacle::new(-24.0), Obstacle::new(-26.0), Obstacle::new(300.0)];
        let mut portals = vec![Portal::new(-25.0, PortalKind::Fly), Portal::new(10.0, PortalKind::Speed)];
        scroll(&mut obstacles, &mut portals, 5.0);

        // -24 → -29: right edge at 1, kept. -26 → -31: right edge at -1, gone.
        assert_eq!(obstacles.len(), 2);
        assert_eq!(obstacles[0].x, -29.0);
        assert_eq!(obstacles[1].x, 295.0);
        // -25 → -30: right edge exactly 0, gone.
        assert_eq!(portals.len(), 1);
        assert_eq!(portals[0].x, 5.0);
    }

    // ── Collision ──

    #[test]
    fn hazard_hit_and_miss() {
        let p = grounded(); // x 100..130, y 330..360
        assert!(hits_hazard(&p, &[Obstacle::new(110.0)]));
        assert!(!hits_hazard(&p, &[Obstacle::new(130.0)]));
        assert!(!hits_hazard(&p, &[Obstacle::new(70.0)]));
        assert!(!hits_hazard(&p, &[]));
    }

    #[test]
    fn hazard_bounding_box_catches_corner() {
        // Visible triangle would miss here; its bounding box does not.
        let mut p = player();
        p.y = 290.0; // bottom edge at 320, spike top at 315
        assert!(hits_hazard(&p, &[Obstacle::new(128.0)]));
    }

    #[test]
    fn hazard_clear_when_bottom_meets_apex() {
        let mut p = player();
        p.y = 285.0; // bottom edge exactly at spike top
        assert!(!hits_hazard(&p, &[Obstacle::new(110.0)]));
    }

    #[test]
    fn touched_portals_are_removed() {
        let p = grounded();
        let mut portals = vec![
            Portal::new(90.0, PortalKind::Fly),
            Portal::new(500.0, PortalKind::Speed),
            Portal::new(120.0, PortalKind::Speed),
        ];
        let touched = take_touched_portals(&p, &mut portals);
        assert_eq!(touched, vec![PortalKind::Fly, PortalKind::Speed]);
        assert_eq!(portals.len(), 1);
        assert_eq!(portals[0].x, 500.0);

        assert!(take_touched_portals(&p, &mut portals).is_empty());
    }
}
