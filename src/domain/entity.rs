/// Entities: Player, Enemy, StaticRect, Pickup.
///
/// Coordinates are world pixels with y measured upward from the bottom of
/// the background, so the floor is a small positive y and jumping increases y.
/// Sprites are referenced by dimensions and a variant tag only; the bitmaps
/// themselves live with the renderer.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Facing {
    Left,
    Right,
}

impl Facing {
    /// Direction sign: -1 for Left, +1 for Right.
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Facing::Left => -1.0,
            Facing::Right => 1.0,
        }
    }

    pub fn flipped(self) -> Facing {
        match self {
            Facing::Left => Facing::Right,
            Facing::Right => Facing::Left,
        }
    }
}

/// Frame input consumed by the step: only the continuously polled hide key.
/// Walking and jumping arrive as bound actions before the step runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameInput {
    pub hiding: bool,
}

/// Shared body of every moving actor.
#[derive(Clone, Debug)]
pub struct Character {
    pub x: f32,
    pub y: f32,
    pub dy: f32,
    pub width: f32,
    pub height: f32,
    pub speed: f32,
    pub facing: Facing,
    pub jumping: bool,
    /// Sprite drawn mirrored relative to the source art.
    pub mirrored: bool,
}

impl Character {
    pub fn new(x: f32, y: f32, width: f32, height: f32, speed: f32) -> Self {
        Character {
            x,
            y,
            dy: 0.0,
            width,
            height,
            speed,
            facing: Facing::Left,
            jumping: false,
            mirrored: false,
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    /// Turn around and mirror the sprite with it.
    pub fn turn(&mut self) {
        self.facing = self.facing.flipped();
        self.mirrored = !self.mirrored;
    }
}

pub const PLAYER_SPEED: f32 = 15.0;
pub const CLOAK_MAX: f32 = 100.0;
pub const CLOAK_DRAIN: f32 = 0.5;
pub const CLOAK_PICKUP: f32 = 50.0;

#[derive(Clone, Debug)]
pub struct Player {
    pub body: Character,
    pub visible: bool,
    pub cloak: f32,
}

impl Player {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        let mut body = Character::new(x, y, width, height, PLAYER_SPEED);
        body.facing = Facing::Right;
        Player { body, visible: true, cloak: CLOAK_MAX }
    }

    /// Drain the cloak for one hidden tick.
    pub fn hide(&mut self) {
        self.visible = false;
        self.cloak -= CLOAK_DRAIN;
    }

    pub fn reveal(&mut self) {
        self.visible = true;
    }

    pub fn restore_cloak(&mut self, amount: f32) {
        self.cloak = (self.cloak + amount).min(CLOAK_MAX);
    }
}

pub const ENEMY_SPEED: f32 = 7.0;

/// Which sprite an enemy currently shows.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Sprite {
    Normal,
    Detected,
}

/// Horizontal turnaround limits of a patrol, in world x.
/// `right` already includes the enemy's sprite width.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct PatrolBounds {
    pub left: f32,
    pub right: f32,
}

/// Per-kind enemy behavior.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum EnemyKind {
    /// Walks back and forth between fixed bounds.
    Patrolling { bounds: PatrolBounds },
}

#[derive(Clone, Debug)]
pub struct Enemy {
    pub body: Character,
    pub view_distance: f32,
    pub sprite: Sprite,
    pub kind: EnemyKind,
}

impl Enemy {
    /// A patrolling enemy whose patrol starts at its spawn x and extends
    /// `patrol_distance` to the right.
    pub fn patrolling(
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        view_distance: f32,
        patrol_distance: f32,
    ) -> Self {
        Enemy {
            body: Character::new(x, y, width, height, ENEMY_SPEED),
            view_distance,
            sprite: Sprite::Normal,
            kind: EnemyKind::Patrolling {
                bounds: PatrolBounds { left: x, right: x + patrol_distance + width },
            },
        }
    }
}

/// Axis-aligned solid obstacle.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct StaticRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub color: (u8, u8, u8),
}

impl StaticRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        StaticRect { x, y, width, height, color: (255, 255, 255) }
    }
}

/// Single-use cloak refill.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Pickup {
    pub x: f32,
    pub y: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn player_defaults() {
        let p = Player::new(0.0, 200.0, 40.0, 80.0);
        assert_eq!(p.body.facing, Facing::Right);
        assert_eq!(p.body.speed, 15.0);
        assert!(p.visible);
        assert_eq!(p.cloak, 100.0);
    }

    #[test]
    fn hide_drains_half_point() {
        let mut p = Player::new(0.0, 0.0, 1.0, 1.0);
        p.cloak = 0.4;
        p.hide();
        assert!(!p.visible);
        assert!((p.cloak - (-0.1)).abs() < 1e-6);
        p.reveal();
        assert!(p.visible);
    }

    #[test]
    fn cloak_restore_caps_at_max() {
        let mut p = Player::new(0.0, 0.0, 1.0, 1.0);
        p.cloak = 80.0;
        p.restore_cloak(CLOAK_PICKUP);
        assert_eq!(p.cloak, CLOAK_MAX);
    }

    #[test]
    fn patrol_bounds_include_width() {
        let e = Enemy::patrolling(2000.0, 200.0, 50.0, 90.0, 300.0, 300.0);
        assert_eq!(e.body.facing, Facing::Left);
        assert_eq!(e.body.speed, 7.0);
        assert_eq!(
            e.kind,
            EnemyKind::Patrolling { bounds: PatrolBounds { left: 2000.0, right: 2350.0 } }
        );
    }

    #[test]
    fn turn_mirrors_sprite() {
        let mut c = Character::new(0.0, 0.0, 1.0, 1.0, 1.0);
        c.turn();
        assert_eq!(c.facing, Facing::Right);
        assert!(c.mirrored);
        c.turn();
        assert!(!c.mirrored);
    }
}
