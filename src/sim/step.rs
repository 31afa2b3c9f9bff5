/// The step function: advances the world by one playing frame.
///
/// Processing order:
///   1. Jump (level-triggered while on the ground)
///   2. Flight steering / expiry
///   3. Gravity
///   4. Integration
///   5. Ceiling / floor bounds
///   6. Scrolling + off-screen cull
///   7. Steady-state spawn
///   8. Spike collision → Dead
///   9. Portal collision (one-shot)
///  10. Score
///
/// A spike hit flips the phase to Dead but the rest of the frame still runs,
/// so the crash frame is scored. Menu / Dead frames do nothing here.
///
/// Wall-clock time comes in as `now_ms`; flight length is measured against it,
/// not against frame count.

use log::{debug, info};

use crate::domain::entity::{FrameInput, PortalKind, FIELD_WIDTH};
use crate::domain::physics::{self, FlightUpdate};
use crate::domain::spawn::{self, Dice};
use super::event::GameEvent;
use super::world::{Phase, WorldState};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step<D: Dice + ?Sized>(
    world: &mut WorldState,
    input: &FrameInput,
    now_ms: u64,
    dice: &mut D,
) -> Vec<GameEvent> {
    if world.phase != Phase::Playing { return vec![]; }

    let mut events: Vec<GameEvent> = Vec::new();
    world.tick += 1;

    resolve_player_motion(world, input, now_ms, &mut events);
    physics::scroll(&mut world.obstacles, &mut world.portals, world.player.speed);
    resolve_spawn(world, dice, &mut events);
    resolve_hazards(world, &mut events);
    resolve_portals(world, now_ms, &mut events);
    world.score = world.score.saturating_add(1);

    events
}

// ══════════════════════════════════════════════════════════════
// Player
// ══════════════════════════════════════════════════════════════

fn resolve_player_motion(
    world: &mut WorldState,
    input: &FrameInput,
    now_ms: u64,
    events: &mut Vec<GameEvent>,
) {
    let p = &mut world.player;

    // Fires again every frame the player is grounded with jump held.
    if physics::apply_jump(p, input) {
        events.push(GameEvent::Jumped);
    }

    if physics::update_flight(p, input, now_ms) == FlightUpdate::Expired {
        debug!("flight expired at {now_ms} ms");
        events.push(GameEvent::FlightEnded);
    }

    physics::apply_gravity(p);
    physics::integrate(p);
    physics::clamp_to_bounds(p);
}

// ══════════════════════════════════════════════════════════════
// World
// ══════════════════════════════════════════════════════════════

fn resolve_spawn<D: Dice + ?Sized>(world: &mut WorldState, dice: &mut D, events: &mut Vec<GameEvent>) {
    if let Some(x) = spawn::extend(&mut world.obstacles, &mut world.portals, FIELD_WIDTH, dice) {
        events.push(GameEvent::ObstacleSpawned { x });
    }
}

// ══════════════════════════════════════════════════════════════
// Collisions
// ══════════════════════════════════════════════════════════════

fn resolve_hazards(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if world.phase == Phase::Playing && physics::hits_hazard(&world.player, &world.obstacles) {
        world.phase = Phase::Dead;
        info!("crashed after {} frames, score {}", world.tick, world.score);
        events.push(GameEvent::PlayerCrashed { score: world.score });
    }
}

fn resolve_portals(world: &mut WorldState, now_ms: u64, events: &mut Vec<GameEvent>) {
    for kind in physics::take_touched_portals(&world.player, &mut world.portals) {
        debug!("portal {kind:?} entered at {now_ms} ms");
        events.push(GameEvent::PortalEntered { kind });
        match kind {
            PortalKind::Fly => {
                // A second fly portal restarts the clock.
                world.player.flying = true;
                world.player.fly_start_ms = now_ms;
                events.push(GameEvent::FlightStarted { at_ms: now_ms });
            }
            // Cosmetic; the renderer picks it up from the event.
            PortalKind::Speed => {}
        }
    }
}
