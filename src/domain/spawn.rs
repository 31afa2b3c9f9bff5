/// World generator: places spikes and portals ahead of the player.
///
/// Spacing between consecutive spikes is `250 + roll(200)` units.
/// The initial batch puts a portal in the middle of every 4th gap;
/// steady-state spawning adds one spike at a time with a 25% portal chance.
///
/// Randomness comes in through `Dice`, so tests can script exact layouts.

use rand::Rng;

use super::entity::{Obstacle, Portal, PortalKind};

pub const FIRST_OBSTACLE_X: f32 = 400.0;
pub const INITIAL_OBSTACLES: usize = 10;

const BASE_SPACING: f32 = 250.0;
const SPACING_JITTER: u32 = 200;
const PORTAL_EVERY: usize = 4;
const STEADY_PORTAL_CHANCE: f64 = 0.25;
const STEADY_PORTAL_OFFSET: f32 = 50.0;

/// Source of randomness for world generation.
pub trait Dice {
    /// Uniform integer in `0..n`.
    fn roll(&mut self, n: u32) -> u32;
    /// `true` with probability `p`.
    fn chance(&mut self, p: f64) -> bool;
}

impl<R: Rng + ?Sized> Dice for R {
    fn roll(&mut self, n: u32) -> u32 {
        self.gen_range(0..n)
    }

    fn chance(&mut self, p: f64) -> bool {
        self.gen_bool(p)
    }
}

fn next_spacing<D: Dice + ?Sized>(dice: &mut D) -> f32 {
    BASE_SPACING + dice.roll(SPACING_JITTER) as f32
}

fn coin_kind<D: Dice + ?Sized>(dice: &mut D) -> PortalKind {
    if dice.chance(0.5) { PortalKind::Fly } else { PortalKind::Speed }
}

/// Build the opening layout: `count` spikes starting at `start_x`.
pub fn populate<D: Dice + ?Sized>(start_x: f32, count: usize, dice: &mut D) -> (Vec<Obstacle>, Vec<Portal>) {
    let mut obstacles = Vec::with_capacity(count);
    let mut portals = Vec::with_capacity(count / PORTAL_EVERY);
    let mut x = start_x;

    for i in 0..count {
        let spacing = next_spacing(dice);
        obstacles.push(Obstacle::new(x));
        if i % PORTAL_EVERY == PORTAL_EVERY - 1 {
            portals.push(Portal::new(x + spacing / 2.0, coin_kind(dice)));
        }
        x += spacing;
    }

    (obstacles, portals)
}

/// Steady-state spawn. Once the rightmost spike has scrolled into view,
/// append exactly one more behind it. Returns the new spike's x, if any.
///
/// An empty spike list never regrows.
pub fn extend<D: Dice + ?Sized>(
    obstacles: &mut Vec<Obstacle>,
    portals: &mut Vec<Portal>,
    view_width: f32,
    dice: &mut D,
) -> Option<f32> {
    let last_x = match obstacles.last() {
        Some(o) if o.x < view_width => o.x,
        _ => return None,
    };

    let x = last_x + next_spacing(dice);
    obstacles.push(Obstacle::new(x));
    if dice.chance(STEADY_PORTAL_CHANCE) {
        portals.push(Portal::new(x + STEADY_PORTAL_OFFSET, coin_kind(dice)));
    }
    Some(x)
}

/// Replays fixed rolls and coin flips, then falls back to 0 / false.
#[cfg(test)]
pub(crate) struct ScriptedDice {
    rolls: std::collections::VecDeque<u32>,
    chances: std::collections::VecDeque<bool>,
}

#[cfg(test)]
impl ScriptedDice {
    pub(crate) fn new(rolls: &[u32], chances: &[bool]) -> Self {
        ScriptedDice {
            rolls: rolls.iter().copied().collect(),
            chances: chances.iter().copied().collect(),
        }
    }
}

#[cfg(test)]
impl Dice for ScriptedDice {
    fn roll(&mut self, n: u32) -> u32 {
        self.rolls.pop_front().unwrap_or(0).min(n - 1)
    }

    fn chance(&mut self, _p: f64) -> bool {
        self.chances.pop_front().unwrap_or(false)
    }
}
