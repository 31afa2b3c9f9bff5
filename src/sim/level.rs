/// Level selector and level (re)start.
///
/// ## Phase transitions handled here
///   Menu / Dead + SelectPrev / SelectNext → cursor moves (wraps), no transition
///   Menu / Dead + Confirm                 → `start_level` → Playing
///
/// Playing → Dead happens inside `step()` on a spike hit.
/// The level name is cosmetic; every level plays the same.

use log::info;

use crate::domain::entity::{Action, FrameInput};
use crate::domain::spawn::{self, Dice, FIRST_OBSTACLE_X, INITIAL_OBSTACLES};
use super::event::GameEvent;
use super::world::{Phase, WorldState};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct LevelInfo {
    pub name: &'static str,
    pub icon: char,
}

pub const LEVELS: &[LevelInfo] = &[
    LevelInfo { name: "Easy", icon: '🔹' },
    LevelInfo { name: "Medium", icon: '🔸' },
    LevelInfo { name: "Hard", icon: '🔺' },
];

// ══════════════════════════════════════════════════════════════
// Public API
// ══════════════════════════════════════════════════════════════

pub fn current_level(world: &WorldState) -> &'static LevelInfo {
    &LEVELS[world.select_cursor % LEVELS.len()]
}

/// Reset the player, regenerate the field, zero the score, and enter Playing.
pub fn start_level<D: Dice + ?Sized>(world: &mut WorldState, dice: &mut D) -> GameEvent {
    world.phase = Phase::Playing;
    world.player.reset();

    let (obstacles, portals) = spawn::populate(FIRST_OBSTACLE_X, INITIAL_OBSTACLES, dice);
    world.obstacles = obstacles;
    world.portals = portals;

    world.score = 0;
    world.tick = 0;

    info!(
        "level '{}' started: {} spikes, {} portals",
        current_level(world).name,
        world.obstacles.len(),
        world.portals.len(),
    );
    GameEvent::LevelStarted { level: world.select_cursor }
}

pub fn select_prev(world: &mut WorldState) {
    world.select_cursor = (world.select_cursor + LEVELS.len() - 1) % LEVELS.len();
}

pub fn select_next(world: &mut WorldState) {
    world.select_cursor = (world.select_cursor + 1) % LEVELS.len();
}

/// Menu / Dead screen input. Ignored while playing.
/// Returns `LevelStarted` when confirm (re)starts the level.
pub fn handle_select_input<D: Dice + ?Sized>(
    world: &mut WorldState,
    input: &FrameInput,
    dice: &mut D,
) -> Option<GameEvent> {
    if !world.phase.is_selecting() {
        return None;
    }

    if input.pressed(Action::SelectPrev) {
        select_prev(world);
    }
    if input.pressed(Action::SelectNext) {
        select_next(world);
    }
    if input.pressed(Action::Confirm) {
        return Some(start_level(world, dice));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PhysicsConfig;
    use crate::domain::entity::{ActionSet, PLAYER_START_Y};
    use crate::domain::spawn::ScriptedDice;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn world() -> WorldState {
        WorldState::new(&PhysicsConfig::default())
    }

    fn press(a: Action) -> FrameInput {
        FrameInput::pressing(ActionSet::EMPTY.with(a))
    }

    #[test]
    fn cursor_wraps_both_ways() {
        let mut w = world();
        select_prev(&mut w);
        assert_eq!(w.select_cursor, 2);
        assert_eq!(current_level(&w).name, "Hard");
        select_next(&mut w);
        assert_eq!(w.select_cursor, 0);
        select_next(&mut w);
        select_next(&mut w);
        select_next(&mut w);
        assert_eq!(w.select_cursor, 0);
    }

    #[test]
    fn selection_does_not_change_phase() {
        let mut w = world();
        let mut dice = ScriptedDice::new(&[], &[]);
        assert_eq!(handle_select_input(&mut w, &press(Action::SelectNext), &mut dice), None);
        assert_eq!(w.phase, Phase::Menu);
        assert_eq!(w.select_cursor, 1);

        w.phase = Phase::Dead;
        assert_eq!(handle_select_input(&mut w, &press(Action::SelectPrev), &mut dice), None);
        assert_eq!(w.phase, Phase::Dead);
        assert_eq!(w.select_cursor, 0);
    }

    #[test]
    fn confirm_from_menu_starts_level() {
        let mut w = world();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let ev = handle_select_input(&mut w, &press(Action::Confirm), &mut rng);
        assert_eq!(ev, Some(GameEvent::LevelStarted { level: 0 }));
        assert_eq!(w.phase, Phase::Playing);
        assert_eq!(w.obstacles.len(), 10);
        assert_eq!(w.obstacles[0].x, 400.0);
        assert_eq!(w.portals.len(), 2);
    }

    #[test]
    fn confirm_from_dead_resets_everything() {
        let mut w = world();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        start_level(&mut w, &mut rng);

        w.phase = Phase::Dead;
        w.score = 812;
        w.tick = 812;
        w.player.y = 77.0;
        w.player.dy = 4.0;
        w.player.on_ground = true;
        w.player.flying = true;
        w.player.fly_start_ms = 5_000;
        w.obstacles.truncate(3);
        w.portals.clear();

        let ev = handle_select_input(&mut w, &press(Action::Confirm), &mut rng);
        assert!(matches!(ev, Some(GameEvent::LevelStarted { .. })));
        assert_eq!(w.phase, Phase::Playing);
        assert_eq!(w.score, 0);
        assert_eq!(w.tick, 0);
        assert_eq!(w.player.y, PLAYER_START_Y);
        assert_eq!(w.player.dy, 0.0);
        assert!(!w.player.on_ground);
        assert!(!w.player.flying);
        assert_eq!(w.player.fly_start_ms, 0);
        assert_eq!(w.obstacles.len(), 10);
        assert_eq!(w.portals.len(), 2);
    }

    #[test]
    fn ignored_while_playing() {
        let mut w = world();
        w.phase = Phase::Playing;
        let mut dice = ScriptedDice::new(&[], &[]);
        let input = FrameInput::pressing(
            [Action::Confirm, Action::SelectNext].into_iter().collect(),
        );
        assert_eq!(handle_select_input(&mut w, &input, &mut dice), None);
        assert_eq!(w.select_cursor, 0);
        assert!(w.obstacles.is_empty());
    }

    #[test]
    fn held_without_fresh_press_does_nothing() {
        let mut w = world();
        let mut dice = ScriptedDice::new(&[], &[]);
        let input = FrameInput::holding(ActionSet::EMPTY.with(Action::Confirm));
        assert_eq!(handle_select_input(&mut w, &input, &mut dice), None);
        assert_eq!(w.phase, Phase::Menu);
    }

    #[test]
    fn chosen_level_is_reported() {
        let mut w = world();
        let mut dice = ScriptedDice::new(&[], &[]);
        select_next(&mut w);
        select_next(&mut w);
        assert_eq!(start_level(&mut w, &mut dice), GameEvent::LevelStarted { level: 2 });
        assert_eq!(current_level(&w).icon, '🔺');
    }
}
