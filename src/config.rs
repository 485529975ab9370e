/// External configuration loader.
///
/// Reads the first `config.toml` found in the executable's directory, the
/// CWD, `~/.local/share/incognito` or `/usr/share/incognito`.
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub display: DisplayConfig,
    pub world: WorldConfig,
    pub gamepad: GamepadConfig,
    pub assets_dir: PathBuf,
    pub log_file: PathBuf,
    pub log_level: String,
}

#[derive(Clone, Debug)]
pub struct DisplayConfig {
    /// Logical viewport in world pixels; the terminal is scaled to fit.
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub tick_rate_ms: u64,
    pub narration_pause_ms: u64,
}

#[derive(Clone, Debug)]
pub struct WorldConfig {
    pub floor: f32,
    pub gravity: f32,
    pub enemy_count: usize,
    pub enemy_spacing: f32,
    pub view_distance: f32,
    pub patrol_distance: f32,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
    pub quit: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    display: TomlDisplay,
    #[serde(default)]
    world: TomlWorld,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlDisplay {
    #[serde(default = "default_viewport_width")]
    viewport_width: u32,
    #[serde(default = "default_viewport_height")]
    viewport_height: u32,
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_narration_pause")]
    narration_pause_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlWorld {
    #[serde(default = "default_floor")]
    floor: f32,
    #[serde(default = "default_gravity")]
    gravity: f32,
    #[serde(default = "default_enemy_count")]
    enemy_count: usize,
    #[serde(default = "default_enemy_spacing")]
    enemy_spacing: f32,
    #[serde(default = "default_view_distance")]
    view_distance: f32,
    #[serde(default = "default_patrol_distance")]
    patrol_distance: f32,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_cancel")]
    cancel: Vec<String>,
    #[serde(default = "default_quit")]
    quit: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_assets_dir")]
    assets_dir: String,
    #[serde(default = "default_log_file")]
    log_file: String,
    #[serde(default = "default_log_level")]
    log_level: String,
}

// ── Defaults ──

fn default_viewport_width() -> u32 { 1280 }
fn default_viewport_height() -> u32 { 720 }
fn default_tick_rate() -> u64 { 16 }        // ~60 Hz
fn default_narration_pause() -> u64 { 500 }
fn default_floor() -> f32 { 200.0 }
fn default_gravity() -> f32 { -2.0 }
fn default_enemy_count() -> usize { 4 }
fn default_enemy_spacing() -> f32 { 2000.0 }
fn default_view_distance() -> f32 { 300.0 }
fn default_patrol_distance() -> f32 { 300.0 }

fn default_confirm() -> Vec<String> { vec!["A".into(), "Start".into()] }
fn default_cancel() -> Vec<String> { vec!["B".into()] }
fn default_quit() -> Vec<String> { vec!["Select".into()] }
fn default_assets_dir() -> String { "resources".into() }
fn default_log_file() -> String { "incognito.log".into() }
fn default_log_level() -> String { "warn".into() }

impl Default for TomlDisplay {
    fn default() -> Self {
        TomlDisplay {
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
            tick_rate_ms: default_tick_rate(),
            narration_pause_ms: default_narration_pause(),
        }
    }
}

impl Default for TomlWorld {
    fn default() -> Self {
        TomlWorld {
            floor: default_floor(),
            gravity: default_gravity(),
            enemy_count: default_enemy_count(),
            enemy_spacing: default_enemy_spacing(),
            view_distance: default_view_distance(),
            patrol_distance: default_patrol_distance(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            confirm: default_confirm(),
            cancel: default_cancel(),
            quit: default_quit(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            assets_dir: default_assets_dir(),
            log_file: default_log_file(),
            log_level: default_log_level(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) `~/.local/share/incognito`, (4) `/usr/share/incognito`.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        Self::resolve(toml_cfg, &search_dirs)
    }

    fn resolve(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        // Resolve assets directory against the candidate dirs
        let assets_str = &toml_cfg.general.assets_dir;
        let assets_dir = if PathBuf::from(assets_str).is_absolute() {
            PathBuf::from(assets_str)
        } else {
            search_dirs.iter()
                .map(|d| d.join(assets_str))
                .find(|p| p.is_dir())
                .unwrap_or_else(|| PathBuf::from(assets_str))
        };

        GameConfig {
            display: DisplayConfig {
                viewport_width: toml_cfg.display.viewport_width.max(1),
                viewport_height: toml_cfg.display.viewport_height.max(1),
                tick_rate_ms: toml_cfg.display.tick_rate_ms,
                narration_pause_ms: toml_cfg.display.narration_pause_ms,
            },
            world: WorldConfig {
                floor: toml_cfg.world.floor,
                gravity: toml_cfg.world.gravity,
                enemy_count: toml_cfg.world.enemy_count,
                enemy_spacing: toml_cfg.world.enemy_spacing,
                view_distance: toml_cfg.world.view_distance,
                patrol_distance: toml_cfg.world.patrol_distance,
            },
            gamepad: GamepadConfig {
                confirm: toml_cfg.gamepad.confirm,
                cancel: toml_cfg.gamepad.cancel,
                quit: toml_cfg.gamepad.quit,
            },
            assets_dir,
            log_file: PathBuf::from(toml_cfg.general.log_file),
            log_level: toml_cfg.general.log_level,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::resolve(TomlConfig::default(), &[])
    }
}

/// Candidate directories to search: exe dir + CWD + system paths (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/incognito)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/incognito");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    // 4. System data directory
    let sys = PathBuf::from("/usr/share/incognito");
    if sys.is_dir() && !dirs.iter().any(|d| d == &sys) {
        dirs.push(sys);
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
///
/// Runs before the logger exists, so problems go to stderr.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => return parse_toml(&text),
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}

fn parse_toml(text: &str) -> TomlConfig {
    match toml::from_str::<TomlConfig>(text) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Warning: config.toml parse error: {e}");
            eprintln!("Using default settings.");
            TomlConfig::default()
        }
    }
}
