/// Entry point and game loop.

mod config;
mod domain;
mod error;
mod logging;
mod sim;
mod ui;

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

use config::GameConfig;
use domain::entity::FrameInput;
use error::GameResult;
use sim::event::GameEvent;
use sim::level::{build_world, LevelSizes, Scenery};
use sim::menu::{Menu, MenuCommand, MenuOutcome};
use sim::narration::{check_outcome, Narration};
use sim::step;
use sim::world::WorldState;
use ui::asset::Sprites;
use ui::bindings::{Action, KeyBindings, HIDE_KEY};
use ui::gamepad::GamepadState;
use ui::input::{InputState, KeyRepeat};
use ui::renderer::{Art, Renderer};
use ui::sound::SoundEngine;

const FRAME_SLEEP: Duration = Duration::from_millis(5);

/// Where the loop is. Narration is terminal: it lasts until the player quits.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Phase {
    Menu,
    Playing,
    Narration(Narration),
}

fn main() {
    let config = GameConfig::load();
    logging::init(&config);
    log::info!("Starting Incognito");

    // Assets are loaded before the terminal is taken over so a missing
    // file is reported on a normal screen.
    let (art, sizes) = match load_art(&config) {
        Ok(loaded) => loaded,
        Err(e) => {
            log::error!("{e}");
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let view_w = config.display.viewport_width as f32;
    let (mut world, scenery) = build_world(&sizes, &config.world, view_w);

    let mut renderer = Renderer::new(config.display.viewport_width, config.display.viewport_height);

    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();

    let result = game_loop(&mut world, &scenery, &art, &mut renderer, sound.as_ref(), &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }

    if let Err(e) = result {
        log::error!("{e}");
        eprintln!("Game error: {e}");
    }

    log::info!("Exiting after {} ticks", world.tick);
    println!();
    println!("Thanks for playing Incognito!");
}

fn load_art(config: &GameConfig) -> GameResult<(Art, LevelSizes)> {
    let sprites = Sprites::load(&config.assets_dir)?;
    let sizes = sprites.sizes();
    Ok((Art::new(sprites, config.world.floor), sizes))
}

fn game_loop(
    world: &mut WorldState,
    scenery: &Scenery,
    art: &Art,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
    config: &GameConfig,
) -> GameResult<()> {
    let mut kb = InputState::new();
    kb.honor_release = renderer.keyboard_enhanced;
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);

    let bindings = KeyBindings::standard();
    let mut state = LoopState::new();

    let tick_rate = Duration::from_millis(config.display.tick_rate_ms);
    let narration_pause = Duration::from_millis(config.display.narration_pause_ms);
    let mut last_tick = Instant::now();

    loop {
        kb.drain_events();
        gp.update();
        let (held, pressed) = gp.virtual_keys();
        kb.merge_virtual(&held, &pressed);

        if kb.ctrl_c_pressed() {
            log::info!("Window closed");
            break;
        }

        let now = Instant::now();
        let before = state.phase;
        let tick_due = now.duration_since(last_tick) >= tick_rate;
        let pass = advance(&mut state, world, &bindings, &kb, tick_due, now);
        if pass.quit {
            break;
        }
        process_events(sound, &pass.events);
        if pass.ticked || state.phase != before {
            last_tick = now;
        }

        match state.phase {
            Phase::Menu => renderer.render_menu(&state.menu)?,
            Phase::Playing => {
                if pass.ticked {
                    renderer.render_game(world, scenery, art)?;
                }
            }
            Phase::Narration(outcome) => {
                if before != state.phase {
                    if let Some(sfx) = sound {
                        match outcome {
                            Narration::Win => sfx.play_win(),
                            Narration::Lose => sfx.play_lose(),
                        }
                    }
                }
                renderer.render_narration(outcome)?;
                std::thread::sleep(narration_pause);
                continue;
            }
        }

        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

// ── Phase transitions ──

/// Loop state that survives between passes.
struct LoopState {
    phase: Phase,
    menu: Menu,
    nav: KeyRepeat,
}

impl LoopState {
    fn new() -> Self {
        LoopState { phase: Phase::Menu, menu: Menu::main_menu(), nav: KeyRepeat::new() }
    }
}

/// What one pass over the current phase produced.
#[derive(Debug, Default)]
struct Pass {
    quit: bool,
    /// The world stepped this pass.
    ticked: bool,
    events: Vec<GameEvent>,
}

/// Run one pass of the current phase against this frame's input.
///
/// The world only changes while playing and only when a tick is due.
/// Narration ignores everything except quit.
fn advance(
    state: &mut LoopState,
    world: &mut WorldState,
    bindings: &KeyBindings,
    kb: &InputState,
    tick_due: bool,
    now: Instant,
) -> Pass {
    let mut pass = Pass::default();

    match state.phase {
        Phase::Menu => {
            let cmd = detect_menu_command(kb, &mut state.nav, now);
            match cmd.map(|c| state.menu.apply(c)) {
                Some(MenuOutcome::Start) => {
                    log::info!("Session started");
                    state.phase = Phase::Playing;
                }
                Some(MenuOutcome::Quit) => {
                    log::info!("Quit from menu");
                    pass.quit = true;
                }
                Some(MenuOutcome::Stay) | None => {}
            }
        }
        Phase::Playing => {
            if !tick_due {
                return pass;
            }
            if apply_actions(world, &bindings.dispatch(kb), &mut pass.events) {
                log::info!("Quit during play");
                pass.quit = true;
                return pass;
            }

            let input = FrameInput { hiding: kb.is_held(HIDE_KEY) };
            let events = step::step(world, input);
            pass.ticked = true;

            if let Some(outcome) = check_outcome(world, &events) {
                log::info!("Session over at tick {}: {}", world.tick, outcome.text());
                state.phase = Phase::Narration(outcome);
            }
            pass.events.extend(events);
        }
        Phase::Narration(_) => {
            if kb.any_pressed(KEYS_QUIT) || kb.any_held(KEYS_QUIT) {
                log::info!("Quit from narration");
                pass.quit = true;
            }
        }
    }

    pass
}

// ── Key Constants ──

const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter];
const KEYS_CANCEL: &[KeyCode] = &[KeyCode::Esc];
const KEYS_QUIT: &[KeyCode] = &[KeyCode::Char('q')];
const KEYS_NAV: &[KeyCode] = &[KeyCode::Up, KeyCode::Down];

/// Enter and Escape act on fresh presses; Up/Down auto-repeat while held.
fn detect_menu_command(kb: &InputState, nav: &mut KeyRepeat, now: Instant) -> Option<MenuCommand> {
    if kb.any_pressed(KEYS_CANCEL) {
        return Some(MenuCommand::Cancel);
    }
    if kb.any_pressed(KEYS_CONFIRM) {
        return Some(MenuCommand::Confirm);
    }
    match nav.poll(kb, KEYS_NAV, now) {
        Some(KeyCode::Up) => Some(MenuCommand::Up),
        Some(KeyCode::Down) => Some(MenuCommand::Down),
        _ => None,
    }
}

/// Apply bound actions in order. Returns true when one of them quits;
/// actions after it are dropped.
fn apply_actions(world: &mut WorldState, actions: &[Action], events: &mut Vec<GameEvent>) -> bool {
    for &action in actions {
        match action {
            Action::Quit => return true,
            Action::Jump => events.extend(world.player_jump()),
            Action::Walk(dir) => world.player_walk(dir),
        }
    }
    false
}

fn process_events(sound: Option<&SoundEngine>, events: &[GameEvent]) {
    let sfx = match sound {
        Some(s) => s,
        None => return,
    };
    for event in events {
        match event {
            GameEvent::Jumped => sfx.play_jump(),
            GameEvent::PickupCollected { .. } => sfx.play_pickup(),
            GameEvent::PlayerSpotted { .. } => sfx.play_spotted(),
            _ => {}
        }
    }
}
