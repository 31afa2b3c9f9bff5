/// WorldState: the complete snapshot of a running game.
///
/// One value owns everything that changes: the player, the scrolling
/// spikes and portals, score, phase, and the level-selector cursor.
/// `step()` and the menu handler take it by `&mut`; the renderer reads it.

use crate::config::PhysicsConfig;
use crate::domain::entity::{Obstacle, Player, Portal};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Menu,
    Playing,
    Dead,
}

impl Phase {
    /// Menu and Dead share the level-select screen and its input handling.
    pub fn is_selecting(self) -> bool {
        matches!(self, Phase::Menu | Phase::Dead)
    }
}

pub struct WorldState {
    // ── Entities ──
    pub player: Player,
    pub obstacles: Vec<Obstacle>,
    pub portals: Vec<Portal>,

    // ── Meta ──
    pub phase: Phase,
    pub score: u64,
    /// Playing frames since the last level start.
    pub tick: u64,

    // ── Level select ──
    pub select_cursor: usize,
}

impl WorldState {
    pub fn new(physics: &PhysicsConfig) -> Self {
        WorldState {
            player: Player::new(physics),
            obstacles: vec![],
            portals: vec![],
            phase: Phase::Menu,
            score: 0,
            tick: 0,
            select_cursor: 0,
        }
    }
}
