/// WorldState: everything that exists inside a running session.
///
/// ## Ownership
///
/// The world exclusively owns the player, enemies, static obstacles and
/// pickups. Nothing outside holds references into it; the loop mutates it
/// through `step()` and the player actions below.
///
/// ## Camera / Viewport
///
/// World and screen coordinates are separate:
///   - `camera.x`: world x of the left edge of the viewport
///   - `camera.view_w`: viewport width in world pixels
///   - Renderer maps: `screen_x = world_x - camera.x`
///   - The camera keeps the player inside the middle third of the viewport
///   - `0 <= camera.x <= bounds.width - view_w` always holds

use crate::domain::entity::{Enemy, Facing, Pickup, Player, StaticRect};
use crate::domain::physics::{self, Bounds};

use super::event::GameEvent;

/// Camera: a horizontal window into the background.
#[derive(Clone, Debug)]
pub struct Camera {
    pub x: f32,
    /// Vertical offset; the background is never taller than the viewport, so this stays 0.
    pub y: f32,
    pub view_w: f32,
}

impl Camera {
    pub fn new(view_w: f32) -> Self {
        Camera { x: 0.0, y: 0.0, view_w }
    }

    /// Scroll so the target span stays within the middle third of the viewport.
    pub fn follow(&mut self, target_x: f32, target_w: f32, world_w: f32) {
        self.x = physics::scroll_to_follow(self.x, target_x, target_w, self.view_w, world_w);
    }
}

pub struct WorldState {
    // ── Entities ──
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub statics: Vec<StaticRect>,
    pub pickups: Vec<Pickup>,

    // ── Geometry ──
    pub bounds: Bounds,
    pub gravity: f32,

    // ── Camera / Viewport ──
    pub camera: Camera,

    pub tick: u64,
}

impl WorldState {
    pub fn new(bounds: Bounds, view_w: f32, gravity: f32, player: Player) -> Self {
        let mut world = WorldState {
            player,
            enemies: vec![],
            statics: vec![],
            pickups: vec![],
            bounds,
            gravity,
            camera: Camera::new(view_w),
            tick: 0,
        };
        // Settle the spawn point and camera before the first frame.
        world.move_player(0.0, 0.0);
        world
    }

    /// Move the player by a delta, clamp it into the background and scroll
    /// the camera after it.
    pub fn move_player(&mut self, dx: f32, dy: f32) {
        let body = &mut self.player.body;
        body.x += dx;
        body.y += dy;
        if self.bounds.clamp(body) {
            log::trace!("Limiting player movement to ({}, {})", body.x, body.y);
        }
        self.camera.follow(body.x, body.width, self.bounds.width);
    }

    /// Place the player at an absolute position (same clamping as `move_player`).
    pub fn place_player(&mut self, x: f32, y: f32) {
        let dx = x - self.player.body.x;
        let dy = y - self.player.body.y;
        self.move_player(dx, dy);
    }

    /// Walk one step. Hidden players cannot walk.
    pub fn player_walk(&mut self, direction: Facing) {
        if !self.player.visible {
            return;
        }
        self.move_player(direction.sign() * self.player.body.speed, 0.0);
        if direction != self.player.body.facing {
            self.player.body.turn();
        }
    }

    /// Start a jump if grounded-or-falling-but-not-jumping and visible.
    pub fn player_jump(&mut self) -> Option<GameEvent> {
        let p = &self.player;
        if p.body.jumping || !p.visible {
            return None;
        }
        log::debug!("Jump");
        let impulse = physics::jump_impulse(self.gravity);
        self.player.body.dy = impulse;
        self.player.body.jumping = true;
        self.move_player(0.0, impulse);
        Some(GameEvent::Jumped)
    }

    /// Has the player's leading edge reached the goal zone?
    pub fn player_reached_goal(&self, margin: f32) -> bool {
        self.player.body.right() > self.bounds.width - margin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> WorldState {
        let bounds = Bounds { width: 3000.0, height: 720.0, floor: 200.0 };
        WorldState::new(bounds, 1280.0, -2.0, Player::new(0.0, 0.0, 40.0, 80.0))
    }

    #[test]
    fn spawn_is_settled_on_floor() {
        let w = world();
        assert_eq!(w.player.body.y, 200.0);
        assert_eq!(w.camera.x, 0.0);
    }

    #[test]
    fn walk_right_one_tick() {
        let mut w = world();
        w.player_walk(Facing::Right);
        assert_eq!(w.player.body.x, 15.0);
    }

    #[test]
    fn walk_left_at_origin_clamps() {
        let mut w = world();
        w.player_walk(Facing::Left);
        assert_eq!(w.player.body.x, 0.0);
        assert_eq!(w.player.body.facing, Facing::Left);
        assert!(w.player.body.mirrored);
    }

    #[test]
    fn hidden_player_cannot_walk_or_jump() {
        let mut w = world();
        w.player.visible = false;
        w.player_walk(Facing::Right);
        assert_eq!(w.player.body.x, 0.0);
        assert_eq!(w.player_jump(), None);
        assert!(!w.player.body.jumping);
    }

    #[test]
    fn jump_lifts_and_sets_flag() {
        let mut w = world();
        assert_eq!(w.player_jump(), Some(GameEvent::Jumped));
        assert!(w.player.body.jumping);
        assert_eq!(w.player.body.dy, 30.0);
        assert_eq!(w.player.body.y, 230.0);
    }

    #[test]
    fn no_double_jump() {
        let mut w = world();
        w.player_jump();
        assert_eq!(w.player_jump(), None);
        assert_eq!(w.player.body.y, 230.0);
    }

    #[test]
    fn camera_follows_right() {
        let mut w = world();
        for _ in 0..100 {
            w.player_walk(Facing::Right);
        }
        // player at 1500; right edge pinned at 2/3 of the viewport
        let expected = 1500.0 + 40.0 - 1280.0 * 2.0 / 3.0;
        assert!((w.camera.x - expected).abs() < 1e-3);
    }

    #[test]
    fn goal_zone() {
        let mut w = world();
        w.place_player(2900.0, 200.0);
        assert!(!w.player_reached_goal(50.0));
        w.place_player(2915.0, 200.0);
        assert!(w.player_reached_goal(50.0));
    }
}
