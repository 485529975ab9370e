/// The step function: advances the world by one tick.
///
/// Processing order:
///   1. Gravity (airborne player falls, lands on the floor)
///   2. Hiding (visibility + cloak drain)
///   3. Static obstacle collision
///   4. Enemies (patrol, then vision check)
///   5. Pickups
///
/// Win / lose is not decided here: the loop reads the returned events and
/// the world afterwards (see `narration::check_outcome`).

use crate::domain::ai;
use crate::domain::entity::{FrameInput, Sprite, CLOAK_PICKUP};
use crate::domain::physics::clamp_scroll;
use super::event::GameEvent;
use super::world::WorldState;

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut WorldState, input: FrameInput) -> Vec<GameEvent> {
    let mut events: Vec<GameEvent> = Vec::new();
    world.tick += 1;

    resolve_gravity(world, &mut events);
    resolve_hiding(world, input.hiding, &mut events);
    resolve_statics(world, &mut events);
    resolve_enemies(world, &mut events);
    resolve_pickups(world, &mut events);

    debug_assert_eq!(
        world.camera.x,
        clamp_scroll(world.camera.x, world.camera.view_w, world.bounds.width)
    );

    events
}

// ══════════════════════════════════════════════════════════════
// Gravity
// ══════════════════════════════════════════════════════════════

fn resolve_gravity(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    if !world.bounds.is_airborne(&world.player.body) {
        return;
    }
    log::trace!("In air");
    let dy = world.player.body.dy;
    world.move_player(0.0, dy);
    world.player.body.dy += world.gravity;

    if world.bounds.is_grounded(&world.player.body) {
        log::debug!("Landed");
        world.player.body.dy = 0.0;
        world.player.body.jumping = false;
        events.push(GameEvent::Landed);
    }
}

// ══════════════════════════════════════════════════════════════
// Hiding
// ══════════════════════════════════════════════════════════════

fn resolve_hiding(world: &mut WorldState, hiding: bool, events: &mut Vec<GameEvent>) {
    let was_visible = world.player.visible;
    if hiding {
        world.player.hide();
        if was_visible {
            log::debug!("Hiding, cloak {:.1}", world.player.cloak);
            events.push(GameEvent::HideStarted);
        }
    } else {
        world.player.reveal();
        if !was_visible {
            log::debug!("Revealed, cloak {:.1}", world.player.cloak);
            events.push(GameEvent::HideEnded);
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Static obstacles
// ══════════════════════════════════════════════════════════════

fn resolve_statics(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    for i in 0..world.statics.len() {
        let Some((x, y)) = world.statics[i].colliding(&world.player.body) else {
            continue;
        };
        log::debug!("Collision with static {i}");
        if world.player.body.y != y {
            world.player.body.dy = 0.0;
            world.player.body.jumping = false;
        }
        world.place_player(x, y);
        events.push(GameEvent::Collided { index: i });
    }
}

// ══════════════════════════════════════════════════════════════
// Enemies
// ══════════════════════════════════════════════════════════════

fn resolve_enemies(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let player = &world.player;
    for (i, enemy) in world.enemies.iter_mut().enumerate() {
        ai::advance(enemy);
        if ai::can_see(enemy, player) {
            log::debug!("Player spotted by enemy {i} at x={}", enemy.body.x);
            enemy.sprite = Sprite::Detected;
            events.push(GameEvent::PlayerSpotted { enemy: i });
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Pickups
// ══════════════════════════════════════════════════════════════

fn resolve_pickups(world: &mut WorldState, events: &mut Vec<GameEvent>) {
    let reach = world.player.body.right();
    let mut i = 0;
    while i < world.pickups.len() {
        if reach >= world.pickups[i].x {
            let pickup = world.pickups.remove(i);
            world.player.restore_cloak(CLOAK_PICKUP);
            log::debug!("Pickup at x={} collected, cloak {:.1}", pickup.x, world.player.cloak);
            events.push(GameEvent::PickupCollected { x: pickup.x, cloak: world.player.cloak });
        } else {
            i += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::{Enemy, Facing, Pickup, Player, StaticRect};
    use crate::domain::physics::Bounds;
    use proptest::prelude::*;

    fn world() -> WorldState {
        let bounds = Bounds { width: 10000.0, height: 720.0, floor: 200.0 };
        WorldState::new(bounds, 1280.0, -2.0, Player::new(0.0, 200.0, 40.0, 80.0))
    }

    fn idle() -> FrameInput {
        FrameInput::default()
    }

    fn hide() -> FrameInput {
        FrameInput { hiding: true }
    }

    // ── gravity ──

    #[test]
    fn grounded_player_stays_put() {
        let mut w = world();
        let events = step(&mut w, idle());
        assert!(events.is_empty());
        assert_eq!(w.player.body.y, 200.0);
        assert_eq!(w.tick, 1);
    }

    #[test]
    fn jump_arc_lands_back_on_floor() {
        let mut w = world();
        w.player_jump();
        let mut landed = false;
        for _ in 0..100 {
            let events = step(&mut w, idle());
            assert!(w.player.body.y >= 200.0);
            if events.contains(&GameEvent::Landed) {
                landed = true;
                break;
            }
        }
        assert!(landed);
        assert_eq!(w.player.body.y, 200.0);
        assert_eq!(w.player.body.dy, 0.0);
        assert!(!w.player.body.jumping);
    }

    #[test]
    fn first_airborne_tick_applies_impulse_then_gravity() {
        let mut w = world();
        w.player_jump();
        step(&mut w, idle());
        assert_eq!(w.player.body.y, 260.0);
        assert_eq!(w.player.body.dy, 28.0);
    }

    // ── hiding ──

    #[test]
    fn hiding_drains_cloak_and_hides() {
        let mut w = world();
        let events = step(&mut w, hide());
        assert!(!w.player.visible);
        assert_eq!(w.player.cloak, 99.5);
        assert_eq!(events, vec![GameEvent::HideStarted]);

        let events = step(&mut w, idle());
        assert!(w.player.visible);
        assert_eq!(events, vec![GameEvent::HideEnded]);
    }

    #[test]
    fn cloak_goes_negative_when_hiding_on_empty() {
        let mut w = world();
        w.player.cloak = 0.4;
        step(&mut w, hide());
        assert!((w.player.cloak - (-0.1)).abs() < 1e-6);
    }

    // ── statics ──

    #[test]
    fn landing_on_static_cancels_jump() {
        let mut w = world();
        w.statics.push(StaticRect::new(0.0, 200.0, 100.0, 50.0));
        w.player.body.jumping = true;
        w.player.body.dy = -4.0;
        w.place_player(10.0, 240.0);
        let events = step(&mut w, idle());
        assert!(events.contains(&GameEvent::Collided { index: 0 }));
        assert_eq!(w.player.body.y, 250.0);
        assert_eq!(w.player.body.dy, 0.0);
        assert!(!w.player.body.jumping);
    }

    #[test]
    fn side_collision_keeps_vertical_motion() {
        let mut w = world();
        // Low block to the right, inside the player's vertical span.
        w.statics.push(StaticRect::new(100.0, 210.0, 50.0, 50.0));
        w.place_player(70.0, 200.0);
        let events = step(&mut w, idle());
        assert_eq!(events, vec![GameEvent::Collided { index: 0 }]);
        assert_eq!(w.player.body.x, 60.0);
        assert_eq!(w.player.body.y, 200.0);
    }

    // ── enemies ──

    #[test]
    fn spotted_player_flags_enemy() {
        let mut w = world();
        let mut e = Enemy::patrolling(500.0, 200.0, 50.0, 90.0, 300.0, 300.0);
        e.body.facing = Facing::Right;
        w.enemies.push(e);
        w.place_player(600.0, 200.0);
        let events = step(&mut w, idle());
        assert!(events.contains(&GameEvent::PlayerSpotted { enemy: 0 }));
        assert_eq!(w.enemies[0].sprite, Sprite::Detected);
    }

    #[test]
    fn hidden_player_is_not_spotted() {
        let mut w = world();
        let mut e = Enemy::patrolling(500.0, 200.0, 50.0, 90.0, 300.0, 300.0);
        e.body.facing = Facing::Right;
        w.enemies.push(e);
        w.place_player(600.0, 200.0);
        let events = step(&mut w, hide());
        assert!(!events.iter().any(|e| matches!(e, GameEvent::PlayerSpotted { .. })));
        assert_eq!(w.enemies[0].sprite, Sprite::Normal);
    }

    #[test]
    fn enemies_patrol_every_tick() {
        let mut w = world();
        w.enemies.push(Enemy::patrolling(2000.0, 200.0, 50.0, 90.0, 300.0, 300.0));
        step(&mut w, idle());
        assert_eq!(w.enemies[0].body.x, 1993.0);
    }

    // ── pickups ──

    #[test]
    fn pickup_restores_once() {
        let mut w = world();
        w.pickups.push(Pickup { x: 30.0, y: 200.0 });
        w.player.cloak = 20.0;
        let events = step(&mut w, idle());
        assert_eq!(events, vec![GameEvent::PickupCollected { x: 30.0, cloak: 70.0 }]);
        assert!(w.pickups.is_empty());

        let events = step(&mut w, idle());
        assert!(events.is_empty());
        assert_eq!(w.player.cloak, 70.0);
    }

    #[test]
    fn pickup_caps_cloak() {
        let mut w = world();
        w.pickups.push(Pickup { x: 40.0, y: 200.0 });
        w.player.cloak = 90.0;
        step(&mut w, idle());
        assert_eq!(w.player.cloak, 100.0);
    }

    #[test]
    fn pickup_out_of_reach_stays() {
        let mut w = world();
        w.pickups.push(Pickup { x: 41.0, y: 200.0 });
        let events = step(&mut w, idle());
        assert!(events.is_empty());
        assert_eq!(w.pickups.len(), 1);
    }

    proptest! {
        #[test]
        fn player_stays_in_bounds(
            moves in proptest::collection::vec((0u8..4, any::<bool>()), 1..200),
        ) {
            let mut w = world();
            w.statics.push(StaticRect::new(300.0, 200.0, 100.0, 60.0));
            for (m, hiding) in moves {
                match m {
                    0 => w.player_walk(Facing::Left),
                    1 => w.player_walk(Facing::Right),
                    2 => { w.player_jump(); }
                    _ => {}
                }
                step(&mut w, FrameInput { hiding });
                let p = &w.player.body;
                prop_assert!(p.x >= 0.0 && p.right() <= w.bounds.width);
                prop_assert!(p.y >= w.bounds.floor && p.top() <= w.bounds.height);
                prop_assert!(w.camera.x >= 0.0 && w.camera.x <= w.bounds.width - w.camera.view_w);
            }
        }
    }
}
