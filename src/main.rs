/// Entry point and game loop.

mod config;
mod domain;
mod logging;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use log::{debug, info, warn};

use config::GameConfig;
use domain::entity::{Action, ActionSet, FrameInput};
use sim::level;
use sim::step;
use sim::world::WorldState;
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::renderer::Renderer;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

fn main() {
    let config = GameConfig::load();

    if let Err(e) = logging::init(&config.general) {
        eprintln!("Logging disabled: {e}");
    }

    let mut world = WorldState::new(&config.physics);
    let mut renderer = Renderer::new();

    let honor_release = match renderer.init() {
        Ok(enhanced) => enhanced,
        Err(e) => {
            eprintln!("Terminal init failed: {e}");
            return;
        }
    };
    info!("terminal ready (release events: {honor_release})");

    let result = game_loop(&mut world, &mut renderer, honor_release, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        warn!("game loop aborted: {e}");
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Spike Run!");
    println!("Final Score: {}", world.score);
}

fn game_loop(
    world: &mut WorldState,
    renderer: &mut Renderer,
    honor_release: bool,
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    kb.honor_release = honor_release;
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);

    let mut rng = rand::thread_rng();
    let clock = Instant::now();
    let mut last_tick = Instant::now();
    let tick_rate = Duration::from_millis(config.speed.tick_rate_ms);

    loop {
        kb.drain_events();
        gp.update();
        renderer.pad_connected = gp.connected;

        if kb.ctrl_c_pressed() || quit_requested(&kb, &gp) {
            break;
        }

        let input = read_frame_input(&kb, &gp);
        let now_ms = clock.elapsed().as_millis() as u64;

        // Level select reacts to every fresh press, not only on tick boundaries.
        if let Some(event) = level::handle_select_input(world, &input, &mut rng) {
            debug!("{event:?}");
            renderer.on_step(std::slice::from_ref(&event));
        }

        if last_tick.elapsed() >= tick_rate {
            let events = step::step(world, &input, now_ms, &mut rng);
            for event in &events {
                debug!("{event:?}");
            }
            renderer.on_step(&events);
            last_tick = Instant::now();
        }

        renderer.render(world, now_ms)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    info!("quit with score {}", world.score);
    Ok(())
}

// ── Key Constants ──

const KEYS_JUMP: &[KeyCode] = &[KeyCode::Char(' '), KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_DESCEND: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_PREV: &[KeyCode] = &[KeyCode::Left];
const KEYS_NEXT: &[KeyCode] = &[KeyCode::Right];
const KEYS_CONFIRM: &[KeyCode] = KEYS_JUMP;
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];

fn quit_requested(kb: &InputState, gp: &GamepadState) -> bool {
    kb.any_pressed(KEYS_QUIT) || gp.quit_pressed()
}

/// Merge keyboard and gamepad into one logical frame input.
fn read_frame_input(kb: &InputState, gp: &GamepadState) -> FrameInput {
    let mut held = ActionSet::EMPTY;
    // A fresh press counts as held for that frame, so taps shorter than a poll still jump.
    if kb.any_held(KEYS_JUMP) || kb.any_pressed(KEYS_JUMP) || gp.jump_held() || gp.jump_pressed() {
        held.insert(Action::Jump);
    }
    let descend = kb.any_held(KEYS_DESCEND) || kb.any_pressed(KEYS_DESCEND)
        || gp.descend_held() || gp.descend_pressed();
    if descend {
        held.insert(Action::Descend);
    }

    let mut pressed = ActionSet::EMPTY;
    if kb.any_pressed(KEYS_PREV) || gp.prev_pressed() {
        pressed.insert(Action::SelectPrev);
    }
    if kb.any_pressed(KEYS_NEXT) || gp.next_pressed() {
        pressed.insert(Action::SelectNext);
    }
    if kb.any_pressed(KEYS_CONFIRM) || gp.confirm_pressed() {
        pressed.insert(Action::Confirm);
    }

    FrameInput { held, pressed }
}
