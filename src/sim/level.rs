/// Level setup: the one scrolling stage.
///
/// ## Layout (world coordinates, y-up)
///
///   - Floor band: `y in [0, floor)` across the whole background
///   - Player: spawns at the left edge, standing on the floor
///   - Enemies: `enemy_count` patrollers at `enemy_spacing * i` (i = 1..)
///   - Pickups: two, at one third and two thirds of the background width
///   - Trophy: `TROPHY_INSET` from the right edge, just behind the goal line
///
/// Entity sizes come from the decoded sprites, so the sim stays independent
/// of the image types; the loader hands over `LevelSizes` only.

use crate::config::WorldConfig;
use crate::domain::entity::{Enemy, Pickup, Player};
use crate::domain::physics::Bounds;
use crate::sim::world::WorldState;

/// Distance of the trophy's left edge from the background's right edge.
pub const TROPHY_INSET: f32 = 100.0;

/// Pixel dimensions of the sprites that take part in the simulation.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct LevelSizes {
    pub background: (f32, f32),
    pub player: (f32, f32),
    pub enemy: (f32, f32),
}

/// Decoration that takes no part in the simulation.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Scenery {
    pub trophy: (f32, f32),
}

/// Build a fresh session world.
pub fn build_world(sizes: &LevelSizes, config: &WorldConfig, view_w: f32) -> (WorldState, Scenery) {
    let (bg_w, bg_h) = sizes.background;
    let bounds = Bounds { width: bg_w, height: bg_h, floor: config.floor };

    let player = Player::new(0.0, 0.0, sizes.player.0, sizes.player.1);
    let mut world = WorldState::new(bounds, view_w, config.gravity, player);

    let (ew, eh) = sizes.enemy;
    world.enemies = (1..=config.enemy_count)
        .map(|i| {
            Enemy::patrolling(
                config.enemy_spacing * i as f32,
                config.floor,
                ew,
                eh,
                config.view_distance,
                config.patrol_distance,
            )
        })
        .collect();

    world.pickups = vec![
        Pickup { x: bg_w / 3.0, y: config.floor },
        Pickup { x: 2.0 * (bg_w / 3.0), y: config.floor },
    ];

    log::info!(
        "Level built: {}x{} background, {} enemies, {} pickups",
        bg_w, bg_h, world.enemies.len(), world.pickups.len()
    );

    let scenery = Scenery { trophy: (bg_w - TROPHY_INSET, config.floor) };
    (world, scenery)
}
