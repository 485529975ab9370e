/// Events emitted during a simulation step or by a bound action.
/// The loop consumes these for narration, sound and logging.

#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    Jumped,
    Landed,
    HideStarted,
    HideEnded,
    Collided { index: usize },
    PlayerSpotted { enemy: usize },
    PickupCollected { x: f32, cloak: f32 },
}
