/// Pixel canvas the renderer composites a frame into.
///
/// The canvas has the terminal's sub-cell resolution: one column per
/// terminal column and two rows per terminal row (upper/lower half-block).
/// All drawing is clipped; callers may pass rectangles that hang off any edge.
///
/// `Projection` maps world rectangles (y-up, bottom-left origin) into canvas
/// rectangles (y-down, top-left origin), applying the camera scroll.

use super::asset::{rgb, Bitmap, Pixel, BLACK};

/// World → canvas mapping for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    pub camera_x: f32,
    pub camera_y: f32,
    /// Background height; world y is flipped against it.
    pub world_h: f32,
    pub scale_x: f32,
    pub scale_y: f32,
}

impl Projection {
    /// Canvas rectangle `(x, y, w, h)` for a world rectangle.
    pub fn rect(&self, x: f32, y: f32, w: f32, h: f32) -> (i32, i32, i32, i32) {
        let top = self.world_h - (y - self.camera_y) - h;
        let x0 = ((x - self.camera_x) * self.scale_x).round() as i32;
        let y0 = (top * self.scale_y).round() as i32;
        let x1 = ((x + w - self.camera_x) * self.scale_x).round() as i32;
        let y1 = ((top + h) * self.scale_y).round() as i32;
        (x0, y0, (x1 - x0).max(0), (y1 - y0).max(0))
    }

    /// Scaled length of a horizontal world distance.
    pub fn len_x(&self, d: f32) -> i32 {
        (d * self.scale_x).round() as i32
    }
}

pub struct Canvas {
    surface: Bitmap,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Canvas { surface: Bitmap::solid(width, height, BLACK) }
    }

    pub fn width(&self) -> u32 {
        self.surface.width()
    }

    pub fn height(&self) -> u32 {
        self.surface.height()
    }

    /// Reallocate for a new size. Contents are lost.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width != self.width() || height != self.height() {
            self.surface = Bitmap::solid(width, height, BLACK);
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Pixel {
        self.surface.pixel(x, y)
    }

    pub fn fill(&mut self, color: Pixel) {
        let (w, h) = (self.width(), self.height());
        self.surface = Bitmap::solid(w, h, color);
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Pixel) {
        let Some((x0, y0, x1, y1)) = self.clip(x, y, w, h) else { return };
        for py in y0..y1 {
            for px in x0..x1 {
                self.blend(px, py, color, 255);
            }
        }
    }

    /// Rectangle outline `thickness` pixels wide, drawn inward.
    pub fn stroke_rect(&mut self, x: i32, y: i32, w: i32, h: i32, thickness: i32, color: Pixel) {
        let t = thickness.max(1).min(w.max(0)).min(h.max(0));
        if t == 0 {
            return;
        }
        self.fill_rect(x, y, w, t, color);
        self.fill_rect(x, y + h - t, w, t, color);
        self.fill_rect(x, y + t, t, h - 2 * t, color);
        self.fill_rect(x + w - t, y + t, t, h - 2 * t, color);
    }

    /// Draw `bitmap` stretched into the destination rectangle
    /// (nearest neighbor), alpha-blended and multiplied by `opacity`.
    pub fn draw_bitmap(&mut self, bitmap: &Bitmap, x: i32, y: i32, w: i32, h: i32, opacity: u8) {
        let Some((x0, y0, x1, y1)) = self.clip(x, y, w, h) else { return };
        let (bw, bh) = (bitmap.width() as i64, bitmap.height() as i64);
        for py in y0..y1 {
            let sy = ((py as i64 - y as i64) * bh / h as i64) as u32;
            for px in x0..x1 {
                let sx = ((px as i64 - x as i64) * bw / w as i64) as u32;
                self.blend(px, py, bitmap.pixel(sx, sy), opacity);
            }
        }
    }

    // ── Internal ──

    /// Intersect a rectangle with the canvas: `(x0, y0, x1, y1)` half-open.
    fn clip(&self, x: i32, y: i32, w: i32, h: i32) -> Option<(u32, u32, u32, u32)> {
        if w <= 0 || h <= 0 {
            return None;
        }
        let x0 = x.max(0) as i64;
        let y0 = y.max(0) as i64;
        let x1 = (x as i64 + w as i64).min(self.width() as i64);
        let y1 = (y as i64 + h as i64).min(self.height() as i64);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }

    /// Source-over blend onto an opaque surface.
    fn blend(&mut self, x: u32, y: u32, src: Pixel, opacity: u8) {
        let [r, g, b, alpha] = src.0;
        let a = alpha as u32 * opacity as u32 / 255;
        if a == 0 {
            return;
        }
        if a == 255 {
            self.surface.set_pixel(x, y, rgb(r, g, b));
            return;
        }
        let dst = self.surface.pixel(x, y);
        let [dr, dg, db, _] = dst.0;
        let mix = |s: u8, d: u8| ((s as u32 * a + d as u32 * (255 - a) + 127) / 255) as u8;
        self.surface.set_pixel(x, y, rgb(mix(r, dr), mix(g, dg), mix(b, db)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::asset::{TRANSPARENT, WHITE};

    const RED: Pixel = rgb(255, 0, 0);

    #[test]
    fn fill_rect_is_clipped() {
        let mut c = Canvas::new(4, 4);
        c.fill_rect(-2, -2, 4, 4, RED);
        assert_eq!(c.pixel(0, 0), RED);
        assert_eq!(c.pixel(1, 1), RED);
        assert_eq!(c.pixel(2, 2), BLACK);
    }

    #[test]
    fn offscreen_rect_is_ignored() {
        let mut c = Canvas::new(4, 4);
        c.fill_rect(10, 10, 4, 4, RED);
        c.fill_rect(0, 0, 0, 3, RED);
        assert!((0..4).all(|x| (0..4).all(|y| c.pixel(x, y) == BLACK)));
    }

    #[test]
    fn stroke_leaves_interior() {
        let mut c = Canvas::new(6, 6);
        c.stroke_rect(0, 0, 6, 6, 1, RED);
        assert_eq!(c.pixel(0, 3), RED);
        assert_eq!(c.pixel(5, 5), RED);
        assert_eq!(c.pixel(2, 2), BLACK);
    }

    #[test]
    fn bitmap_is_stretched() {
        let mut src = Bitmap::solid(2, 1, RED);
        src.set_pixel(1, 0, WHITE);
        let mut c = Canvas::new(4, 2);
        c.draw_bitmap(&src, 0, 0, 4, 2, 255);
        assert_eq!(c.pixel(1, 1), RED);
        assert_eq!(c.pixel(2, 0), WHITE);
    }

    #[test]
    fn transparent_pixels_are_skipped() {
        let src = Bitmap::solid(2, 2, TRANSPARENT);
        let mut c = Canvas::new(2, 2);
        c.fill(RED);
        c.draw_bitmap(&src, 0, 0, 2, 2, 255);
        assert_eq!(c.pixel(0, 0), RED);
    }

    #[test]
    fn opacity_blends_toward_background() {
        let src = Bitmap::solid(1, 1, WHITE);
        let mut c = Canvas::new(1, 1);
        c.draw_bitmap(&src, 0, 0, 1, 1, 50);
        assert_eq!(c.pixel(0, 0), rgb(50, 50, 50));
    }

    #[test]
    fn projection_flips_y() {
        let p = Projection { camera_x: 100.0, camera_y: 0.0, world_h: 720.0, scale_x: 0.5, scale_y: 0.5 };
        // A 40x80 body standing on y=200 at x=300.
        assert_eq!(p.rect(300.0, 200.0, 40.0, 80.0), (100, 220, 20, 40));
        assert_eq!(p.len_x(300.0), 150);
    }

    #[test]
    fn projection_applies_vertical_scroll() {
        let p = Projection { camera_x: 0.0, camera_y: 100.0, world_h: 720.0, scale_x: 1.0, scale_y: 1.0 };
        // Scrolling up by 100 moves everything down the screen by 100.
        assert_eq!(p.rect(0.0, 200.0, 40.0, 80.0), (0, 540, 40, 80));
    }
}
