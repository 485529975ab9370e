/// Win / lose evaluation.
///
/// Checked by the loop after every playing tick. All three conditions are
/// tested in order and the last one that matches decides the text, so
/// running out of cloak on the winning tick still reads "Game Over!".

use super::event::GameEvent;
use super::world::WorldState;

/// Distance from the right edge of the background that counts as the goal.
pub const GOAL_MARGIN: f32 = 50.0;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Narration {
    Win,
    Lose,
}

impl Narration {
    pub fn text(self) -> &'static str {
        match self {
            Narration::Win => "You Win!",
            Narration::Lose => "Game Over!",
        }
    }
}

/// Decide whether this tick ends the session.
pub fn check_outcome(world: &WorldState, events: &[GameEvent]) -> Option<Narration> {
    let mut outcome = None;
    if events.iter().any(|e| matches!(e, GameEvent::PlayerSpotted { .. })) {
        outcome = Some(Narration::Lose);
    }
    if world.player_reached_goal(GOAL_MARGIN) {
        outcome = Some(Narration::Win);
    }
    if world.player.cloak <= 0.0 {
        outcome = Some(Narration::Lose);
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::{FrameInput, Player};
    use crate::domain::physics::Bounds;
    use crate::sim::step::step;

    fn world() -> WorldState {
        let bounds = Bounds { width: 3000.0, height: 720.0, floor: 200.0 };
        WorldState::new(bounds, 1280.0, -2.0, Player::new(0.0, 200.0, 40.0, 80.0))
    }

    #[test]
    fn nothing_happens_mid_level() {
        assert_eq!(check_outcome(&world(), &[]), None);
    }

    #[test]
    fn spotted_loses() {
        let events = [GameEvent::PlayerSpotted { enemy: 2 }];
        assert_eq!(check_outcome(&world(), &events), Some(Narration::Lose));
    }

    #[test]
    fn reaching_the_edge_wins() {
        let mut w = world();
        w.place_player(2950.0, 200.0);
        let outcome = check_outcome(&w, &[]);
        assert_eq!(outcome, Some(Narration::Win));
        assert_eq!(outcome.map(Narration::text), Some("You Win!"));
    }

    #[test]
    fn win_overrides_spotted() {
        let mut w = world();
        w.place_player(2950.0, 200.0);
        let events = [GameEvent::PlayerSpotted { enemy: 0 }];
        assert_eq!(check_outcome(&w, &events), Some(Narration::Win));
    }

    #[test]
    fn empty_cloak_overrides_win() {
        let mut w = world();
        w.place_player(2950.0, 200.0);
        w.player.cloak = 0.0;
        assert_eq!(check_outcome(&w, &[]), Some(Narration::Lose));
    }

    #[test]
    fn hiding_past_empty_is_game_over() {
        let mut w = world();
        w.player.cloak = 0.4;
        let events = step(&mut w, FrameInput { hiding: true });
        let outcome = check_outcome(&w, &events);
        assert_eq!(outcome.map(Narration::text), Some("Game Over!"));
    }
}
