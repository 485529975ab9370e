/// Asset loading: decodes sprite files into RGBA bitmaps.
///
/// Raster formats go through the `image` crate. SVG files are rasterized
/// with resvg when the `svg` feature is enabled; without it they are
/// rejected with `AssetError::UnsupportedFormat` and startup aborts.

use std::path::Path;

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use crate::error::AssetError;
use crate::sim::level::LevelSizes;

/// Straight (non-premultiplied) RGBA pixel.
pub type Pixel = Rgba<u8>;

pub const TRANSPARENT: Pixel = Rgba([0, 0, 0, 0]);
pub const BLACK: Pixel = rgb(0, 0, 0);
pub const WHITE: Pixel = rgb(255, 255, 255);

/// Opaque pixel.
pub const fn rgb(r: u8, g: u8, b: u8) -> Pixel {
    Rgba([r, g, b, 255])
}

/// A decoded image held in memory for the lifetime of the process.
#[derive(Clone, Debug)]
pub struct Bitmap {
    image: RgbaImage,
}

impl Bitmap {
    /// Load an image from disk, dispatching on the file extension.
    pub fn load(path: &Path) -> Result<Self, AssetError> {
        let is_svg = path
            .extension()
            .and_then(|e| e.to_str())
            .map_or(false, |e| e.eq_ignore_ascii_case("svg"));

        if is_svg {
            log::debug!("Loading SVG at {}", path.display());
            return load_svg(path);
        }

        log::debug!("Loading raster image at {}", path.display());
        let bytes = std::fs::read(path).map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let image = image::load_from_memory(&bytes)
            .map_err(|source| AssetError::Decode {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();
        Ok(Bitmap { image })
    }

    /// A bitmap filled with one color. Used for placeholder art and tests.
    pub fn solid(width: u32, height: u32, color: Pixel) -> Self {
        Bitmap { image: RgbaImage::from_pixel(width, height, color) }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Pixel at (x, y); transparent outside the image.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Pixel {
        self.image.get_pixel_checked(x, y).copied().unwrap_or(TRANSPARENT)
    }

    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Pixel) {
        if let Some(p) = self.image.get_pixel_mut_checked(x, y) {
            *p = color;
        }
    }

    /// Nearest-neighbor resize to exactly `width` x `height`.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.image = imageops::resize(&self.image, width.max(1), height.max(1), FilterType::Nearest);
    }

    /// Scale both dimensions by `factor` (0.25 = quarter size).
    pub fn scale(&mut self, factor: f32) {
        let w = (self.width() as f32 * factor) as u32;
        let h = (self.height() as f32 * factor) as u32;
        self.resize(w, h);
    }

    /// Mirror the image left-to-right.
    pub fn flip_horizontal(&mut self) {
        imageops::flip_horizontal_in_place(&mut self.image);
    }
}

// ── Sprite set ──

/// Every image the game draws, decoded and scaled once at startup.
pub struct Sprites {
    pub background: Bitmap,
    pub player: Bitmap,
    pub enemy: Bitmap,
    pub enemy_detected: Bitmap,
    pub trophy: Bitmap,
    pub pickup: Bitmap,
}

impl Sprites {
    /// Load from `<assets>/sprites/*.png` and `<assets>/background_images/bkg.png`.
    pub fn load(assets_dir: &Path) -> Result<Self, AssetError> {
        let sprite = |name: &str, factor: f32| -> Result<Bitmap, AssetError> {
            let mut b = Bitmap::load(&assets_dir.join("sprites").join(name))?;
            b.scale(factor);
            Ok(b)
        };

        let sprites = Sprites {
            background: Bitmap::load(&assets_dir.join("background_images").join("bkg.png"))?,
            player: sprite("player.png", 0.25)?,
            enemy: sprite("enemy.png", 0.25)?,
            enemy_detected: sprite("enemy_detected.png", 0.25)?,
            trophy: sprite("trophy.png", 0.5)?,
            pickup: sprite("medkit.png", 0.2)?,
        };
        log::info!(
            "Loaded sprites from {} (background {}x{})",
            assets_dir.display(),
            sprites.background.width(),
            sprites.background.height(),
        );
        Ok(sprites)
    }

    pub fn sizes(&self) -> LevelSizes {
        let dims = |b: &Bitmap| (b.width() as f32, b.height() as f32);
        LevelSizes {
            background: dims(&self.background),
            player: dims(&self.player),
            enemy: dims(&self.enemy),
        }
    }
}

#[cfg(feature = "svg")]
fn load_svg(path: &Path) -> Result<Bitmap, AssetError> {
    use resvg::{tiny_skia, usvg};

    let data = std::fs::read(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let tree = usvg::Tree::from_data(&data, &usvg::Options::default()).map_err(|e| {
        AssetError::Svg { path: path.to_path_buf(), reason: e.to_string() }
    })?;
    let size = tree.size().to_int_size();
    let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height()).ok_or_else(|| {
        AssetError::Svg { path: path.to_path_buf(), reason: "empty canvas".into() }
    })?;
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    let bytes = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    let image = RgbaImage::from_raw(size.width(), size.height(), bytes).ok_or_else(|| {
        AssetError::Svg { path: path.to_path_buf(), reason: "pixel buffer size mismatch".into() }
    })?;
    Ok(Bitmap { image })
}

#[cfg(not(feature = "svg"))]
fn load_svg(path: &Path) -> Result<Bitmap, AssetError> {
    log::warn!("SVG not supported: rebuild with the `svg` feature ({})", path.display());
    Err(AssetError::UnsupportedFormat("SVG"))
}
