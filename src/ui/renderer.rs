/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Composite the world into a pixel `Canvas` (terminal cols x rows*2)
///   2. Fold each pair of canvas rows into one row of `▀` cells
///      (foreground = upper pixel, background = lower pixel)
///   3. Draw text cells (HUD, menu, narration) on top
///   4. Compare each cell with `back` buffer (previous frame) and only emit
///      terminal commands for cells that changed, batched with `queue!`
///   5. Swap front/back
///
/// The game is laid out for a `viewport_w` x `viewport_h` logical screen;
/// the canvas is that screen stretched to the terminal.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::ai;
use crate::domain::entity::Sprite;
use crate::sim::level::Scenery;
use crate::sim::menu::{Menu, TITLE};
use crate::sim::narration::Narration;
use crate::sim::world::WorldState;

use super::asset::{rgb, Bitmap, Pixel, Sprites, BLACK};
use super::canvas::{Canvas, Projection};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit background for all "empty" terminal cells, matching the
    /// color used for `Clear` so inter-row gaps never show a seam.
    const BASE_BG: Color = Color::Rgb { r: 0, g: 0, b: 0 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel cell used to invalidate the back buffer.
    /// Different from any real cell, so every position will be diff'd.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    /// Upper and lower pixel of one terminal cell.
    fn half_block(upper: Pixel, lower: Pixel) -> Self {
        Cell { ch: '▀', fg: term_color(upper), bg: term_color(lower) }
    }
}

fn term_color(c: Pixel) -> Color {
    let [r, g, b, _] = c.0;
    Color::Rgb { r, g, b }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y). Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell { ch, fg, bg });
        }
    }

    /// Write a string keeping each cell's existing background.
    fn put_str_over(&mut self, x: usize, y: usize, s: &str, fg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            let bg = self.get(x + i, y).bg;
            self.set(x + i, y, Cell { ch, fg, bg });
        }
    }

    fn fill_row(&mut self, x: usize, y: usize, w: usize, bg: Color) {
        for cx in x..(x + w).min(self.width) {
            self.set(cx, y, Cell { ch: ' ', fg: Color::White, bg });
        }
    }
}

// ── Art: sprites plus their mirrored copies ──

/// Decoded sprites prepared for drawing. Mirrored variants are built once
/// here; the floor band is painted into the background.
pub struct Art {
    sprites: Sprites,
    player_mirrored: Bitmap,
    enemy_mirrored: Bitmap,
    enemy_detected_mirrored: Bitmap,
}

impl Art {
    pub fn new(mut sprites: Sprites, floor: f32) -> Self {
        let mirrored = |b: &Bitmap| {
            let mut m = b.clone();
            m.flip_horizontal();
            m
        };

        let bg = &mut sprites.background;
        let (w, h) = (bg.width(), bg.height());
        let floor_top = h.saturating_sub(floor.max(0.0) as u32);
        for y in floor_top..h {
            for x in 0..w {
                bg.set_pixel(x, y, BLACK);
            }
        }

        Art {
            player_mirrored: mirrored(&sprites.player),
            enemy_mirrored: mirrored(&sprites.enemy),
            enemy_detected_mirrored: mirrored(&sprites.enemy_detected),
            sprites,
        }
    }

    fn player(&self, mirrored: bool) -> &Bitmap {
        if mirrored { &self.player_mirrored } else { &self.sprites.player }
    }

    fn enemy(&self, sprite: Sprite, mirrored: bool) -> &Bitmap {
        match (sprite, mirrored) {
            (Sprite::Normal, false) => &self.sprites.enemy,
            (Sprite::Normal, true) => &self.enemy_mirrored,
            (Sprite::Detected, false) => &self.sprites.enemy_detected,
            (Sprite::Detected, true) => &self.enemy_detected_mirrored,
        }
    }
}

// ── Renderer ──

/// Which screen was drawn last; a change forces a full repaint.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Screen {
    Menu,
    Game,
    Narration,
}

const MENU_BG: Color = Color::Rgb { r: 51, g: 51, b: 51 };
const MENU_SELECTION: Color = Color::Rgb { r: 0, g: 0, b: 0 };
const VISION: Pixel = rgb(255, 0, 0);
const CLOAK_BAR: Pixel = rgb(0, 0, 255);
/// Opacity of the player sprite while hidden.
const HIDDEN_ALPHA: u8 = 50;
/// Outline width of a vision cone, in logical pixels.
const VISION_STROKE: f32 = 10.0;

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    canvas: Canvas,
    term_w: usize,
    term_h: usize,
    viewport_w: f32,
    viewport_h: f32,
    last_screen: Option<Screen>,
    /// Keyboard enhancement was pushed and must be popped on cleanup.
    pub keyboard_enhanced: bool,
}

impl Renderer {
    pub fn new(viewport_w: u32, viewport_h: u32) -> Self {
        Renderer {
            writer: BufWriter::with_capacity(65536, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            canvas: Canvas::new(1, 1),
            term_w: 0,
            term_h: 0,
            viewport_w: viewport_w as f32,
            viewport_h: viewport_h as f32,
            last_screen: None,
            keyboard_enhanced: false,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        // Release events make held-key tracking exact; without them the
        // input layer falls back to a hold timeout.
        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                self.writer,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            self.keyboard_enhanced = true;
        }
        log::debug!("Terminal initialized, keyboard enhancement: {}", self.keyboard_enhanced);

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.resize(tw as usize, th as usize);
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.keyboard_enhanced {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
        }
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render_menu(&mut self, menu: &Menu) -> io::Result<()> {
        self.begin(Screen::Menu)?;
        self.compose_menu(menu);
        self.finish()
    }

    pub fn render_game(&mut self, world: &WorldState, scenery: &Scenery, art: &Art) -> io::Result<()> {
        self.begin(Screen::Game)?;
        self.compose_game(world, scenery, art);
        self.finish()
    }

    pub fn render_narration(&mut self, narration: Narration) -> io::Result<()> {
        self.begin(Screen::Narration)?;
        self.compose_narration(narration);
        self.finish()
    }

    // ── Frame lifecycle ──

    fn resize(&mut self, tw: usize, th: usize) {
        self.term_w = tw;
        self.term_h = th;
        self.front.resize(tw, th);
        self.back.resize(tw, th);
        self.canvas.resize(tw.max(1) as u32, (th * 2).max(1) as u32);
        // Force full repaint: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);
    }

    fn begin(&mut self, screen: Screen) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        let resized = tw as usize != self.term_w || th as usize != self.term_h;
        if resized {
            self.resize(tw as usize, th as usize);
        }
        if resized || self.last_screen != Some(screen) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_screen = Some(screen);
        }
        self.front.clear();
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colors; ResetColor would fall back to the terminal
        // default, which may differ from BASE_BG.
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.ch))?;
                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn projection(&self, world: &WorldState) -> Projection {
        Projection {
            camera_x: world.camera.x,
            camera_y: world.camera.y,
            world_h: world.bounds.height,
            scale_x: self.canvas.width() as f32 / self.viewport_w,
            scale_y: self.canvas.height() as f32 / self.viewport_h,
        }
    }

    fn compose_game(&mut self, w: &WorldState, scenery: &Scenery, art: &Art) {
        let proj = self.projection(w);
        let canvas = &mut self.canvas;
        canvas.fill(BLACK);

        // Background (floor already painted in)
        let bg = &art.sprites.background;
        draw_sprite(canvas, &proj, bg, 0.0, 0.0, 255);

        let (tx, ty) = scenery.trophy;
        draw_sprite(canvas, &proj, &art.sprites.trophy, tx, ty, 255);

        // Player: translucent while hidden
        let p = &w.player;
        let alpha = if p.visible { 255 } else { HIDDEN_ALPHA };
        draw_sprite(canvas, &proj, art.player(p.body.mirrored), p.body.x, p.body.y, alpha);

        for s in &w.statics {
            let (x, y, cw, ch) = proj.rect(s.x, s.y, s.width, s.height);
            let (r, g, b) = s.color;
            canvas.fill_rect(x, y, cw, ch, rgb(r, g, b));
        }

        let stroke = proj.len_x(VISION_STROKE).max(1);
        for e in &w.enemies {
            let bmp = art.enemy(e.sprite, e.body.mirrored);
            draw_sprite(canvas, &proj, bmp, e.body.x, e.body.y, 255);
            if !p.visible {
                let (vx, vy, vw, vh) = ai::vision_rect(e);
                let (x, y, cw, ch) = proj.rect(vx, vy, vw, vh);
                canvas.stroke_rect(x, y, cw, ch, stroke, VISION);
            }
        }

        for pk in &w.pickups {
            draw_sprite(canvas, &proj, &art.sprites.pickup, pk.x, pk.y, 255);
        }

        // Cloak meter bar, in logical screen pixels from the bottom-left
        let sx = proj.scale_x;
        let sy = proj.scale_y;
        let bar_w = (p.cloak.max(0.0) * 2.0 * sx).round() as i32;
        canvas.fill_rect(
            (30.0 * sx).round() as i32,
            ((self.viewport_h - 80.0) * sy).round() as i32,
            bar_w,
            (50.0 * sy).round().max(1.0) as i32,
            CLOAK_BAR,
        );

        self.present_canvas();

        // HUD label sits just above the bar
        let label_row = ((self.viewport_h - 110.0) * sy / 2.0).max(0.0) as usize;
        let label_col = (30.0 * sx).round() as usize;
        self.front.put_str_over(label_col, label_row, "Cloak Meter", Color::White);
    }

    /// Fold the canvas into half-block cells.
    fn present_canvas(&mut self) {
        for row in 0..self.term_h {
            let y = (row * 2) as u32;
            for col in 0..self.term_w {
                let x = col as u32;
                let cell = Cell::half_block(self.canvas.pixel(x, y), self.canvas.pixel(x, y + 1));
                self.front.set(col, row, cell);
            }
        }
    }

    fn compose_menu(&mut self, menu: &Menu) {
        for y in 0..self.term_h {
            self.front.fill_row(0, y, self.term_w, MENU_BG);
        }

        let left = self.term_w.saturating_sub(menu.width as usize) / 2;
        let top = self.term_h.saturating_sub(menu.height as usize) / 2;

        self.front.put_str(left + menu.title_col as usize, top, TITLE, Color::White, MENU_BG);

        for (i, (item, label)) in menu.items.iter().zip(menu.options()).enumerate() {
            let row = top + item.row as usize;
            let bg = if i == menu.selected() { MENU_SELECTION } else { MENU_BG };
            self.front.fill_row(left + item.bar_col as usize, row, item.bar_width as usize, bg);
            self.front.put_str(left + item.label_col as usize, row, label, Color::White, bg);
        }
    }

    fn compose_narration(&mut self, narration: Narration) {
        let text = narration.text();
        let inner = text.chars().count() + 6;
        let box_w = inner + 2;
        let left = self.term_w.saturating_sub(box_w) / 2;
        let top = (self.term_h / 2).saturating_sub(2);
        let white = Color::White;
        let black = Cell::BASE_BG;

        let bar = "═".repeat(inner);
        let pad = " ".repeat(inner);
        self.front.put_str(left, top, &format!("╔{bar}╗"), white, black);
        self.front.put_str(left, top + 1, &format!("║{pad}║"), white, black);
        self.front.put_str(left, top + 2, &format!("║   {text}   ║"), white, black);
        self.front.put_str(left, top + 3, &format!("║{pad}║"), white, black);
        self.front.put_str(left, top + 4, &format!("╚{bar}╝"), white, black);
    }
}

/// Draw a bitmap at its natural size with its bottom-left corner at world (x, y).
fn draw_sprite(canvas: &mut Canvas, proj: &Projection, bmp: &Bitmap, x: f32, y: f32, alpha: u8) {
    let (cx, cy, cw, ch) = proj.rect(x, y, bmp.width() as f32, bmp.height() as f32);
    canvas.draw_bitmap(bmp, cx, cy, cw, ch, alpha);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::asset::WHITE;

    #[test]
    fn half_block_uses_upper_as_foreground() {
        let c = Cell::half_block(WHITE, BLACK);
        assert_eq!(c.ch, '▀');
        assert_eq!(c.fg, Color::Rgb { r: 255, g: 255, b: 255 });
        assert_eq!(c.bg, Color::Rgb { r: 0, g: 0, b: 0 });
    }

    #[test]
    fn put_str_over_keeps_background() {
        let mut fb = FrameBuffer::new(4, 1);
        fb.fill_row(0, 0, 4, MENU_BG);
        fb.put_str_over(1, 0, "ab", Color::White);
        assert_eq!(fb.get(1, 0).ch, 'a');
        assert_eq!(fb.get(2, 0).bg, MENU_BG);
        assert_eq!(fb.get(0, 0).ch, ' ');
    }

    #[test]
    fn put_str_clips_at_edge() {
        let mut fb = FrameBuffer::new(3, 1);
        fb.put_str(1, 0, "xyz", Color::White, Cell::BASE_BG);
        assert_eq!(fb.get(2, 0).ch, 'y');
    }

    #[test]
    fn art_paints_floor_and_mirrors() {
        let mut player = Bitmap::solid(2, 1, WHITE);
        player.set_pixel(0, 0, rgb(1, 2, 3));
        let sprites = Sprites {
            background: Bitmap::solid(4, 10, WHITE),
            player,
            enemy: Bitmap::solid(1, 1, WHITE),
            enemy_detected: Bitmap::solid(1, 1, WHITE),
            trophy: Bitmap::solid(1, 1, WHITE),
            pickup: Bitmap::solid(1, 1, WHITE),
        };
        let art = Art::new(sprites, 3.0);
        let bg = &art.sprites.background;
        assert_eq!(bg.pixel(0, 6), WHITE);
        assert_eq!(bg.pixel(0, 7), BLACK);
        assert_eq!(bg.pixel(3, 9), BLACK);
        assert_eq!(art.player(true).pixel(1, 0), rgb(1, 2, 3));
        assert_eq!(art.player(false).pixel(0, 0), rgb(1, 2, 3));
    }
}
