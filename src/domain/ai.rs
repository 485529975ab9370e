/// Enemy AI: fixed patrol plus a line-of-sight cone check.
///
/// Patrol is a two-state machine encoded in `facing`: an enemy that has left
/// its patrol bounds turns around (mirroring its sprite), then advances by
/// `speed` in the facing direction. It never stops.
///
/// Vision is a horizontal band in front of the enemy, `view_distance` long and
/// 60 units tall either side of the enemy's y. A hidden player is never seen.

use super::entity::{Enemy, EnemyKind, Facing, Player, Sprite};

/// Vertical half-height of the vision band.
pub const VISION_BAND: f32 = 60.0;

/// Advance an enemy by one tick of its behavior.
pub fn advance(enemy: &mut Enemy) {
    match enemy.kind {
        EnemyKind::Patrolling { bounds } => {
            let body = &mut enemy.body;
            if body.x < bounds.left || body.x > bounds.right {
                body.turn();
            }
            body.x += body.facing.sign() * body.speed;
        }
    }
}

/// Is `player` inside this enemy's vision cone?
///
/// A failed check also reverts a "detected" sprite back to normal.
pub fn can_see(enemy: &mut Enemy, player: &Player) -> bool {
    if in_cone(enemy, player) {
        return true;
    }
    if enemy.sprite != Sprite::Normal {
        enemy.sprite = Sprite::Normal;
    }
    false
}

fn in_cone(enemy: &Enemy, player: &Player) -> bool {
    if !player.visible {
        return false;
    }
    let e = &enemy.body;
    let p = &player.body;
    if (p.y - e.y).abs() >= VISION_BAND {
        return false;
    }

    let (near, far) = match e.facing {
        Facing::Left => (e.x - enemy.view_distance, e.x),
        Facing::Right => (e.x, e.x + enemy.view_distance),
    };
    let inside = |v: f32| near < v && v < far;
    inside(p.x) || inside(p.right())
}

/// World-space rectangle `(x, y, w, h)` covered by the vision cone.
pub fn vision_rect(enemy: &Enemy) -> (f32, f32, f32, f32) {
    let e = &enemy.body;
    match e.facing {
        Facing::Left => (e.x - enemy.view_distance, e.y, enemy.view_distance, e.height),
        Facing::Right => (e.right(), e.y, enemy.view_distance, e.height),
    }
}
