/// Physics layer: pure geometry shared by the step and the camera.
///
/// ## Coordinate system
///
/// World space is y-up: `y = 0` is the bottom edge of the background and
/// `floor` is the walking surface. Every rectangle is `(x, y, width, height)`
/// with `(x, y)` its bottom-left corner.
///
/// ## Clamping
///
/// After any position change the player is clamped into
/// `[0, bg_width - width] x [floor, bg_height - height]`. The camera offset is
/// clamped into `[0, bg_width - viewport_width]`.
///
/// ## Static collision
///
/// `colliding()` checks four contact cases in a fixed order (below, above,
/// left, right) and returns the first corrective position found.

use super::entity::{Character, StaticRect};

/// Extent of the playable background plus the floor line.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
    pub floor: f32,
}

impl Bounds {
    /// Clamp a body into the background. Returns true if anything changed.
    pub fn clamp(&self, body: &mut Character) -> bool {
        let (x0, y0) = (body.x, body.y);

        if body.x < 0.0 {
            body.x = 0.0;
        } else if body.x + body.width > self.width {
            body.x = self.width - body.width;
        }

        if body.y < self.floor {
            body.y = self.floor;
        }
        if body.y + body.height > self.height {
            body.y = self.height - body.height;
        }

        body.x != x0 || body.y != y0
    }

    pub fn is_airborne(&self, body: &Character) -> bool {
        body.y > self.floor
    }

    pub fn is_grounded(&self, body: &Character) -> bool {
        body.y <= self.floor
    }
}

/// Upward jump impulse for a given (negative) gravity.
#[inline]
pub fn jump_impulse(gravity: f32) -> f32 {
    -gravity * 15.0
}

/// New camera x that keeps `[target_x, target_x + target_w]` inside the middle
/// third of a `view_w`-wide viewport, clamped to the background.
pub fn scroll_to_follow(
    camera_x: f32,
    target_x: f32,
    target_w: f32,
    view_w: f32,
    bg_w: f32,
) -> f32 {
    let left_cutoff = view_w / 3.0;
    let right_cutoff = view_w * 2.0 / 3.0;
    let screen_x = target_x - camera_x;

    let mut x = camera_x;
    if screen_x < left_cutoff {
        x = target_x - left_cutoff;
    } else if screen_x + target_w > right_cutoff {
        x = target_x - right_cutoff + target_w;
    }

    clamp_scroll(x, view_w, bg_w)
}

/// Clamp a camera offset into `[0, bg_w - view_w]`.
#[inline]
pub fn clamp_scroll(x: f32, view_w: f32, bg_w: f32) -> f32 {
    let max = (bg_w - view_w).max(0.0);
    x.max(0.0).min(max)
}

// ══════════════════════════════════════════════════════════════
// Static collision
// ══════════════════════════════════════════════════════════════

/// `lo < v < hi`
#[inline]
fn strictly_inside(v: f32, lo: f32, hi: f32) -> bool {
    lo < v && v < hi
}

impl StaticRect {
    /// Corrective `(x, y)` for a body overlapping this rectangle, or None.
    ///
    /// Only the first matching case is used: static below the body,
    /// above it, to its left, to its right. Corner overlaps resolve to
    /// whichever case comes first.
    pub fn colliding(&self, body: &Character) -> Option<(f32, f32)> {
        let (sx, sy, sw, sh) = (self.x, self.y, self.width, self.height);
        let (px, py, pw, ph) = (body.x, body.y, body.width, body.height);

        let x_overlap = strictly_inside(px, sx, sx + sw)
            || strictly_inside(px + pw, sx, sx + sw);
        let y_overlap = strictly_inside(py, sy, sy + sh)
            || strictly_inside(py + ph, sy, sy + sh)
            || strictly_inside(sy, py, py + ph)
            || strictly_inside(sy + sh, py, py + ph);

        // Static is below: body's bottom edge inside (sy, sy + sh]
        if sy < py && py <= sy + sh && x_overlap {
            return Some((px, sy + sh));
        }
        // Static is above: body's top edge inside [sy, sy + sh)
        if sy <= py + ph && py + ph < sy + sh && x_overlap {
            return Some((px, sy - ph));
        }
        // Static is left: body's left edge inside (sx, sx + sw]
        if sx < px && px <= sx + sw && y_overlap {
            return Some((sx + sw, py));
        }
        // Static is right: body's right edge inside [sx, sx + sw)
        if sx <= px + pw && px + pw < sx + sw && y_overlap {
            return Some((sx - pw, py));
        }

        None
    }
}

// ══════════════════════════════════════════════════════════════
// Unit tests
// ══════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn body(x: f32, y: f32, w: f32, h: f32) -> Character {
        Character::new(x, y, w, h, 15.0)
    }

    fn bounds() -> Bounds {
        Bounds { width: 3000.0, height: 720.0, floor: 200.0 }
    }

    // ── clamp ──

    #[test]
    fn clamp_left_edge() {
        let mut b = body(-30.0, 200.0, 40.0, 80.0);
        assert!(bounds().clamp(&mut b));
        assert_eq!(b.x, 0.0);
    }

    #[test]
    fn clamp_right_edge() {
        let mut b = body(2990.0, 200.0, 40.0, 80.0);
        bounds().clamp(&mut b);
        assert_eq!(b.x, 2960.0);
    }

    #[test]
    fn clamp_below_floor() {
        let mut b = body(10.0, 150.0, 40.0, 80.0);
        bounds().clamp(&mut b);
        assert_eq!(b.y, 200.0);
    }

    #[test]
    fn clamp_ceiling() {
        let mut b = body(10.0, 700.0, 40.0, 80.0);
        bounds().clamp(&mut b);
        assert_eq!(b.y, 640.0);
    }

    #[test]
    fn clamp_inside_is_noop() {
        let mut b = body(100.0, 250.0, 40.0, 80.0);
        assert!(!bounds().clamp(&mut b));
    }

    #[test]
    fn jump_impulse_from_default_gravity() {
        assert_eq!(jump_impulse(-2.0), 30.0);
    }

    // ── scroll ──

    #[test]
    fn scroll_stays_put_in_middle_third() {
        assert_eq!(scroll_to_follow(500.0, 1000.0, 40.0, 1280.0, 3000.0), 500.0);
    }

    #[test]
    fn scroll_right_past_two_thirds() {
        // right cutoff = 853.33; player right edge at screen 900
        let x = scroll_to_follow(0.0, 860.0, 40.0, 1280.0, 3000.0);
        assert!((x - (860.0 - 1280.0 * 2.0 / 3.0 + 40.0)).abs() < 1e-3);
    }

    #[test]
    fn scroll_left_below_one_third() {
        let x = scroll_to_follow(1000.0, 1200.0, 40.0, 1280.0, 3000.0);
        assert!((x - (1200.0 - 1280.0 / 3.0)).abs() < 1e-3);
    }

    #[test]
    fn scroll_clamped_at_world_start() {
        assert_eq!(scroll_to_follow(0.0, 0.0, 40.0, 1280.0, 3000.0), 0.0);
    }

    #[test]
    fn scroll_clamped_at_world_end() {
        assert_eq!(scroll_to_follow(0.0, 2960.0, 40.0, 1280.0, 3000.0), 1720.0);
    }

    #[test]
    fn scroll_narrow_world_pins_to_zero() {
        assert_eq!(scroll_to_follow(0.0, 500.0, 40.0, 1280.0, 800.0), 0.0);
    }

    // ── colliding ──

    #[test]
    fn collide_static_below() {
        let s = StaticRect::new(100.0, 200.0, 100.0, 50.0);
        let b = body(120.0, 240.0, 40.0, 80.0);
        assert_eq!(s.colliding(&b), Some((120.0, 250.0)));
    }

    #[test]
    fn collide_static_above() {
        let s = StaticRect::new(100.0, 300.0, 100.0, 50.0);
        let b = body(120.0, 230.0, 40.0, 80.0);
        assert_eq!(s.colliding(&b), Some((120.0, 220.0)));
    }

    #[test]
    fn collide_static_left() {
        // Body taller than the static, so neither vertical case applies.
        let s = StaticRect::new(100.0, 250.0, 100.0, 50.0);
        let b = body(190.0, 200.0, 40.0, 150.0);
        assert_eq!(s.colliding(&b), Some((200.0, 200.0)));
    }

    #[test]
    fn collide_static_right() {
        let s = StaticRect::new(100.0, 250.0, 100.0, 50.0);
        let b = body(70.0, 200.0, 40.0, 150.0);
        assert_eq!(s.colliding(&b), Some((60.0, 200.0)));
    }

    #[test]
    fn body_inside_tall_static_resolves_below_first() {
        let s = StaticRect::new(100.0, 200.0, 100.0, 200.0);
        let b = body(190.0, 250.0, 40.0, 80.0);
        assert_eq!(s.colliding(&b), Some((190.0, 400.0)));
    }

    #[test]
    fn corner_overlap_prefers_below() {
        // Bottom-left corner of the body sits inside the top-right of the static.
        let s = StaticRect::new(100.0, 200.0, 100.0, 100.0);
        let b = body(190.0, 295.0, 40.0, 80.0);
        assert_eq!(s.colliding(&b), Some((190.0, 300.0)));
    }

    #[test]
    fn standing_exactly_on_top_still_reports_below() {
        let s = StaticRect::new(100.0, 200.0, 100.0, 50.0);
        let b = body(120.0, 250.0, 40.0, 80.0);
        assert_eq!(s.colliding(&b), Some((120.0, 250.0)));
    }

    #[test]
    fn no_overlap_is_none() {
        let s = StaticRect::new(100.0, 200.0, 100.0, 50.0);
        let b = body(400.0, 200.0, 40.0, 80.0);
        assert_eq!(s.colliding(&b), None);
    }

    #[test]
    fn touching_right_edge_resolves_left_case() {
        let s = StaticRect::new(100.0, 200.0, 100.0, 50.0);
        let b = body(200.0, 210.0, 40.0, 80.0);
        assert_eq!(s.colliding(&b), Some((200.0, 210.0)));
    }

    proptest! {
        #[test]
        fn clamp_keeps_body_inside(x in -5000.0f32..8000.0, y in -500.0f32..2000.0) {
            let bnd = bounds();
            let mut b = body(x, y, 40.0, 80.0);
            bnd.clamp(&mut b);
            prop_assert!(b.x >= 0.0 && b.x <= bnd.width - b.width);
            prop_assert!(b.y >= bnd.floor && b.y <= bnd.height - b.height);
        }

        #[test]
        fn scroll_always_in_range(cam in -1000.0f32..5000.0, px in 0.0f32..2960.0) {
            let x = scroll_to_follow(cam, px, 40.0, 1280.0, 3000.0);
            prop_assert!(x >= 0.0 && x <= 3000.0 - 1280.0);
        }
    }
}
