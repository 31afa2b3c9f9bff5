/// Events emitted during a simulation step.
/// The presentation layer consumes these for effects and logging.

use crate::domain::entity::PortalKind;

#[allow(dead_code)]
#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    LevelStarted { level: usize },
    Jumped,
    PortalEntered { kind: PortalKind },
    FlightStarted { at_ms: u64 },
    FlightEnded,
    ObstacleSpawned { x: f32 },
    PlayerCrashed { score: u64 },
}
