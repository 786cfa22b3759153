/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::{Duration, Instant};

use crossterm::event::KeyCode;

use config::GameConfig;
use domain::actor::InputSnapshot;
use sim::event::SimEvent;
use sim::level::{self, LevelDef};
use sim::world::{Phase, World};
use ui::gamepad::GamepadState;
use ui::input::InputState;
use ui::render::{PositionTrail, Renderer};

const FRAME_SLEEP: Duration = Duration::from_millis(3);

fn main() {
    let config = GameConfig::load();
    let levels = level::load_levels(&config);
    if levels.is_empty() {
        eprintln!("No playable levels found.");
        return;
    }

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let result = game_loop(&mut renderer, &levels, &config);

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Box Runner!");
}

fn game_loop(
    renderer: &mut Renderer,
    levels: &[LevelDef],
    config: &GameConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    let mut gp = GamepadState::new();
    gp.load_button_config(&config.gamepad);

    let trail = Rc::new(RefCell::new(PositionTrail::new()));
    let deaths = Rc::new(Cell::new(0u32));

    let mut level_idx = 0usize;
    let mut world = build_world(&levels[level_idx], config, &trail, &deaths)?;

    let tick_rate = Duration::from_millis(config.speed.tick_rate_ms);
    let dt = tick_rate.as_secs_f32();
    let mut last_tick = Instant::now();
    let mut last_event: Option<SimEvent> = None;

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() || kb.any_pressed(&[KeyCode::Esc]) {
            break;
        }

        let restart = kb.any_pressed(KEYS_RESTART) || gp.restart_pressed();
        match world.phase {
            Phase::Title => {
                if kb.any_pressed(KEYS_CONFIRM) || gp.confirm_pressed() {
                    world.start();
                    last_tick = Instant::now();
                }
            }
            Phase::Playing | Phase::Dead => {
                if restart {
                    world = build_world(&levels[level_idx], config, &trail, &deaths)?;
                    world.start();
                    last_event = None;
                    last_tick = Instant::now();
                }
            }
            Phase::Cleared => {
                if kb.any_pressed(KEYS_NEXT) {
                    level_idx = (level_idx + 1) % levels.len();
                    world = build_world(&levels[level_idx], config, &trail, &deaths)?;
                    world.start();
                    last_event = None;
                    last_tick = Instant::now();
                } else if restart {
                    world = build_world(&levels[level_idx], config, &trail, &deaths)?;
                    world.start();
                    last_event = None;
                    last_tick = Instant::now();
                }
            }
        }

        if world.phase == Phase::Playing && last_tick.elapsed() >= tick_rate {
            let input = gather_input(&kb, &gp);
            let events = world.step(dt, &input);
            if let Some(ev) = events.last() {
                last_event = Some(*ev);
            }
            last_tick = Instant::now();
        }

        renderer.render(&world, &trail.borrow(), last_event, deaths.get())?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

/// Build a fresh scene and wire the presentation seams: the position
/// observer feeds the motion trail, the death hook bumps the session
/// counter.
fn build_world(
    def: &LevelDef,
    config: &GameConfig,
    trail: &Rc<RefCell<PositionTrail>>,
    deaths: &Rc<Cell<u32>>,
) -> Result<World, String> {
    let mut world = World::from_level(def, &config.tuning)?;

    trail.borrow_mut().clear();
    let sink = Rc::clone(trail);
    world.player.observe(move |pos| sink.borrow_mut().push(pos));

    let counter = Rc::clone(deaths);
    world.player.set_death_hook(move || counter.set(counter.get() + 1));

    Ok(world)
}

// ── Key Constants ──

const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
const KEYS_JUMP: &[KeyCode] = &[KeyCode::Char(' '), KeyCode::Char('k'), KeyCode::Char('K')];
const KEYS_RESTART: &[KeyCode] = &[KeyCode::Char('r'), KeyCode::Char('R')];
const KEYS_NEXT: &[KeyCode] = &[KeyCode::Char('n'), KeyCode::Char('N')];
const KEYS_CONFIRM: &[KeyCode] = &[KeyCode::Enter];

fn gather_input(kb: &InputState, gp: &GamepadState) -> InputSnapshot {
    InputSnapshot {
        left: kb.any_held(KEYS_LEFT) || gp.left_held(),
        right: kb.any_held(KEYS_RIGHT) || gp.right_held(),
        up: kb.any_held(KEYS_UP) || gp.up_held(),
        down: kb.any_held(KEYS_DOWN) || gp.down_held(),
        jump: kb.any_held(KEYS_JUMP) || gp.jump_held(),
    }
}
